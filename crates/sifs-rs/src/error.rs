//! Error type shared by every volume operation.

use thiserror::Error;

/// Failure kinds reported by the volume engine.
#[derive(Debug, Error)]
pub enum SifsError {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("out of memory")]
    OutOfMemory,

    #[error("no such volume")]
    VolumeNotFound,

    #[error("not a volume")]
    NotAVolume,

    #[error("no such file or directory entry")]
    NoSuchEntry,

    #[error("not a directory")]
    NotADirectory,

    #[error("not a file")]
    NotAFile,

    #[error("volume, file or directory already exists")]
    AlreadyExists,

    #[error("directory is not empty")]
    DirectoryNotEmpty,

    #[error("too many directory or file entries")]
    TooManyEntries,

    #[error("no space left on volume")]
    OutOfSpace,

    #[error("corrupt volume: {0}")]
    Corrupt(String),

    #[error("volume i/o: {0}")]
    Io(#[from] std::io::Error),
}

pub type SifsResult<T> = Result<T, SifsError>;

impl From<std::collections::TryReserveError> for SifsError {
    fn from(_: std::collections::TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert_into_io_variant() {
        let err: SifsError = std::io::Error::other("boom").into();
        assert!(matches!(err, SifsError::Io(_)));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn reservation_failure_is_out_of_memory() {
        let mut buf: Vec<u8> = Vec::new();
        let err = buf.try_reserve_exact(usize::MAX).unwrap_err();
        assert!(matches!(SifsError::from(err), SifsError::OutOfMemory));
    }

    #[test]
    fn messages_name_the_condition() {
        assert_eq!(
            SifsError::DirectoryNotEmpty.to_string(),
            "directory is not empty"
        );
        assert_eq!(
            SifsError::InvalidArgument("empty name").to_string(),
            "invalid argument: empty name"
        );
    }
}
