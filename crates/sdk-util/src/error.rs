use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SdkUtilError {
    #[error("IO error while {action} {path}: {source}")]
    IoWithPath {
        action: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Request file not found: {path}")]
    BatchNotFound { path: PathBuf },

    #[error("TOML parse error in {path}: {message}")]
    TomlParse { path: PathBuf, message: String },

    #[error("JSON parse error: {message}")]
    JsonParse { message: String },

    #[error("Missing replacement value for placeholder '{{{placeholder}}}' ({supplied} supplied)")]
    MissingReplacement { placeholder: String, supplied: usize },

    #[error("Placeholder '{{{name}}}' requires a named replacement set")]
    NamedPlaceholder { name: String },

    #[error("Unmatched brace at position {position} in template")]
    UnmatchedBrace { position: usize },

    #[error("Invalid placeholder '{{{placeholder}}}' in template")]
    InvalidPlaceholder { placeholder: String },

    #[error("Invalid batch entry #{index}: {message}")]
    BatchEntry { index: usize, message: String },
}

pub type Result<T> = std::result::Result<T, SdkUtilError>;

pub trait IoContext<T> {
    fn io_context(self, action: &'static str, path: &Path) -> Result<T>;
}

impl<T> IoContext<T> for std::result::Result<T, std::io::Error> {
    fn io_context(self, action: &'static str, path: &Path) -> Result<T> {
        self.map_err(|source| SdkUtilError::IoWithPath {
            action,
            path: path.to_path_buf(),
            source,
        })
    }
}
