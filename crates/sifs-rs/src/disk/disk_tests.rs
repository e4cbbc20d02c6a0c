use super::*;
use rand::RngCore;
use tempfile::TempDir;

const DISK_LEN: u64 = 16 * 1024;

fn scratch(dir: &TempDir) -> PathBuf {
    dir.path().join("volume")
}

#[test]
fn create_presizes_the_volume_file() {
    let dir = TempDir::new().expect("tmp dir");
    let path = scratch(&dir);

    let d = Disk::create(&path, DISK_LEN).expect("create");
    assert_eq!(d.len(), DISK_LEN);
    assert!(!d.is_empty());
    let on_disk = d.file.metadata().expect("metadata").len();
    assert_eq!(on_disk, DISK_LEN);
    assert_eq!(d.path(), path.as_path());
}

#[test]
fn create_refuses_existing_file() {
    let dir = TempDir::new().expect("tmp dir");
    let path = scratch(&dir);
    std::fs::write(&path, b"keep me").expect("seed file");

    let err = Disk::create(&path, DISK_LEN).err().expect("must fail");
    assert!(matches!(err, SifsError::AlreadyExists));
    assert_eq!(std::fs::read(&path).expect("read"), b"keep me");
}

#[test]
fn open_missing_file_reports_volume_not_found() {
    let dir = TempDir::new().expect("tmp dir");
    let err = Disk::open(&scratch(&dir)).err().expect("must fail");
    assert!(matches!(err, SifsError::VolumeNotFound));
}

#[test]
fn open_surfaces_errors_other_than_not_found() {
    let dir = TempDir::new().expect("tmp dir");
    let plain = dir.path().join("plain");
    std::fs::write(&plain, b"not a directory").expect("seed file");

    let err = Disk::open(&plain.join("volume")).err().expect("must fail");
    assert!(matches!(err, SifsError::Io(_)), "{err}");
}

#[test]
fn open_empty_file_maps_nothing() {
    let dir = TempDir::new().expect("tmp dir");
    let path = scratch(&dir);
    std::fs::write(&path, b"").expect("seed file");

    let d = Disk::open(&path).expect("open");
    assert!(d.is_empty());
    let mut buf = [0xAAu8; 8];
    assert_eq!(d.read_at(0, &mut buf), 0);
    assert_eq!(buf, [0xAAu8; 8]);
}

#[test]
fn fresh_file_reads_back_as_zeros() {
    let dir = TempDir::new().expect("tmp dir");
    let d = Disk::create(&scratch(&dir), DISK_LEN).expect("create");

    let mut tail = [0xFFu8; 64];
    assert_eq!(d.read_at(DISK_LEN - 64, &mut tail), 64);
    assert_eq!(tail, [0u8; 64]);
}

#[test]
fn random_payload_straddling_blocks_reads_back() {
    let dir = TempDir::new().expect("tmp dir");
    let mut d = Disk::create(&scratch(&dir), DISK_LEN).expect("create");

    let mut payload = vec![0u8; 3 * 1024 + 7];
    rand::rng().fill_bytes(&mut payload);
    let at = 1024 - 3;
    assert_eq!(d.write_at(at, &payload), payload.len());

    let mut seen = vec![0u8; payload.len()];
    assert_eq!(d.read_at(at, &mut seen), payload.len());
    assert_eq!(seen, payload);

    let mut before = [0xEEu8; 3];
    d.read_at(at - 3, &mut before);
    assert_eq!(before, [0u8; 3], "bytes ahead of the write stay zero");
}

#[test]
fn flushed_bytes_are_visible_after_reopen() {
    let dir = TempDir::new().expect("tmp dir");
    let path = scratch(&dir);
    let header = *b"sifs-header-0001";

    let mut d = Disk::create(&path, DISK_LEN).expect("create");
    d.write_at(0, &header);
    d.flush().expect("flush");
    drop(d);

    assert_eq!(&std::fs::read(&path).expect("read")[..16], &header);
    let d = Disk::open(&path).expect("reopen");
    assert_eq!(d.len(), DISK_LEN);
    let mut back = [0u8; 16];
    d.read_at(0, &mut back);
    assert_eq!(back, header);
}

#[test]
fn transfers_clip_at_the_end_of_the_file() {
    let dir = TempDir::new().expect("tmp dir");
    let mut d = Disk::create(&scratch(&dir), DISK_LEN).expect("create");

    assert_eq!(d.write_at(DISK_LEN - 10, &[7u8; 40]), 10);
    assert_eq!(d.write_at(DISK_LEN + 1, &[7u8; 4]), 0);

    let mut buf = [1u8; 32];
    assert_eq!(d.read_at(DISK_LEN - 10, &mut buf), 10);
    assert_eq!(&buf[..10], &[7u8; 10]);
    assert_eq!(&buf[10..], &[1u8; 22], "bytes past the end are left alone");
    assert_eq!(d.read_at(u64::MAX, &mut buf), 0);
}
