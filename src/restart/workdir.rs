//! # Working directory of a replacement.
//!
//! A directory that no longer exists is tolerated: the replacement then starts from the
//! supervisor's own directory. Any other problem (permissions, not a directory) is fatal.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::RestartError;

/// Returns the directory to start a replacement in, or `None` to use the supervisor's.
pub(crate) fn usable_dir(dir: Option<&Path>) -> Result<Option<PathBuf>, RestartError> {
    let Some(dir) = dir else {
        return Ok(None);
    };
    match fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(Some(dir.to_path_buf())),
        Ok(_) => Err(RestartError::WorkingDir {
            path: dir.to_path_buf(),
            source: io::Error::other("not a directory"),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(dir = %dir.display(), "working directory is gone; using the current one");
            Ok(None)
        }
        Err(source) => Err(RestartError::WorkingDir {
            path: dir.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_dir_is_tolerated_file_is_not() {
        let tmp = tempfile::tempdir().unwrap();
        assert_eq!(
            usable_dir(Some(tmp.path())).unwrap().as_deref(),
            Some(tmp.path())
        );
        assert_eq!(usable_dir(Some(&tmp.path().join("gone"))).unwrap(), None);
        assert_eq!(usable_dir(None).unwrap(), None);

        let file = tmp.path().join("file");
        fs::write(&file, b"x").unwrap();
        let err = usable_dir(Some(&file)).unwrap_err();
        assert_eq!(err.as_label(), "restart_working_dir");
    }
}
