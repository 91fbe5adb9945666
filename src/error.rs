// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimDevError>;

#[derive(Error, Debug)]
pub enum SimDevError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Can not find developer {0} in developers info")]
    UnknownDeveloper(String),

    #[error("Not a GitHub repository URL: {0}")]
    InvalidRepositoryUrl(String),

    #[error("Clone at {path} was made from {found}, not {expected}")]
    CloneMismatch {
        path: PathBuf,
        expected: String,
        found: String,
    },

    #[error("Parser setup failed for {language}: {message}")]
    Parser { language: String, message: String },
}

impl SimDevError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SimDevError::Io {
            path: path.into(),
            source,
        }
    }
}
