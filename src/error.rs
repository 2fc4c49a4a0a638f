use thiserror::Error;

/// Errors raised while collecting or printing facts
#[derive(Error, Debug)]
pub enum FacterError {
    #[error("{0}")]
    Provider(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("procfs error: {0}")]
    Procfs(#[from] procfs::ProcError),

    #[error("Command execution failed: {0}")]
    CommandExecution(String),

    #[error("Command `{command}` timed out after {timeout_secs:.1}s")]
    CommandTimeout { command: String, timeout_secs: f64 },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Fatal environment error: {0}")]
    FatalEnvironment(String),

    #[error("Facts have already been printed")]
    AlreadyPrinted,
}

impl FacterError {
    /// Fatal errors abort the run before anything is printed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, FacterError::FatalEnvironment(_))
    }
}

impl From<serde_json::Error> for FacterError {
    fn from(err: serde_json::Error) -> Self {
        FacterError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for FacterError {
    fn from(err: serde_yaml::Error) -> Self {
        FacterError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FacterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_environment_errors_are_fatal() {
        assert!(FacterError::FatalEnvironment("no user".into()).is_fatal());
        assert!(!FacterError::Provider("no cpus".into()).is_fatal());
        assert!(!FacterError::Serialization("bad".into()).is_fatal());
    }

    #[test]
    fn test_timeout_message() {
        let err = FacterError::CommandTimeout {
            command: "hostid".to_string(),
            timeout_secs: 5.0,
        };
        assert_eq!(err.to_string(), "Command `hostid` timed out after 5.0s");
    }
}
