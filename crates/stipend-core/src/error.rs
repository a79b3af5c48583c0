//! Error types for Stipend

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A source file could not be read or parsed. Nothing from the load is kept.
    #[error("Error loading {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: Box<Error>,
    },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The caller invoked an operation out of sequence (e.g. before a baseline exists)
    #[error("Precondition failed: {0}")]
    Precondition(String),

    #[error("No scenarios available for comparison")]
    NoScenarios,

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Wrap an error as a load failure for `path`
    pub fn load(path: impl Into<PathBuf>, source: Error) -> Self {
        Self::Load {
            path: path.into(),
            source: Box::new(source),
        }
    }

    /// True for sequencing mistakes made by the caller, as opposed to bad data
    pub fn is_caller_error(&self) -> bool {
        matches!(self, Self::Precondition(_) | Self::NoScenarios)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_error_names_path() {
        let err = Error::load("data/expenses.csv", Error::InvalidData("bad date".into()));
        let msg = err.to_string();
        assert!(msg.contains("data/expenses.csv"));
        assert!(msg.contains("bad date"));
        assert!(!err.is_caller_error());
    }

    #[test]
    fn test_caller_errors() {
        assert!(Error::NoScenarios.is_caller_error());
        assert!(Error::Precondition("baseline".into()).is_caller_error());
        assert!(!Error::Config("x".into()).is_caller_error());
    }
}
