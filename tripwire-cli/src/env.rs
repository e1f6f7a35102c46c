//! `.env` loading.

use std::path::PathBuf;

use anyhow::Context;

/// Load `.env` from the working directory or its parents, overriding the
/// process environment.
///
/// Returns the loaded path, or `None` when there is no file.
///
/// # Errors
///
/// Fails if a file exists but cannot be read or parsed.
pub fn load_dotenv() -> anyhow::Result<Option<PathBuf>> {
    tolerate_missing(dotenvy::dotenv_override())
}

fn tolerate_missing(
    loaded: Result<PathBuf, dotenvy::Error>,
) -> anyhow::Result<Option<PathBuf>> {
    match loaded {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e).context("invalid configuration: cannot load .env file"),
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;

    #[test]
    fn test_missing_file_is_not_an_error() {
        let missing = dotenvy::Error::Io(io::Error::from(io::ErrorKind::NotFound));
        assert!(tolerate_missing(Err(missing)).unwrap().is_none());
    }

    #[test]
    fn test_loaded_path_is_returned() {
        let path = PathBuf::from("/srv/app/.env");
        assert_eq!(tolerate_missing(Ok(path.clone())).unwrap(), Some(path));
    }

    #[test]
    fn test_malformed_file_is_reported() {
        let malformed = dotenvy::Error::LineParse("GEMINI_API_KEY abc".into(), 14);
        let err = tolerate_missing(Err(malformed)).unwrap_err();
        assert!(err.to_string().contains(".env"));
    }

    #[test]
    fn test_unreadable_file_is_reported() {
        let denied = dotenvy::Error::Io(io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(tolerate_missing(Err(denied)).is_err());
    }
}
