use crate::capability::Stage;
use crate::fault::Fault;
use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine exited with a nonzero status.
    #[error("{program} exited with status {status} during {stage}: {fault}")]
    Invocation {
        program: String,
        stage: Stage,
        status: i32,
        fault: Fault,
        output: String,
    },

    /// The engine was killed after exceeding its time budget.
    #[error("{program} timed out after {}s during {stage}", .budget.as_secs_f32())]
    Timeout {
        program: String,
        stage: Stage,
        budget: Duration,
    },

    /// The engine program cannot be located.
    #[error("cannot find {program}: {source}")]
    NotInstalled {
        program: String,
        #[source]
        source: which::Error,
    },

    /// The engine could not be started or waited on.
    #[error("cannot run {program} for {stage}: {source}")]
    Spawn {
        program: String,
        stage: Stage,
        #[source]
        source: std::io::Error,
    },

    /// The environment switch command is unusable.
    #[error("invalid environment command: {0}")]
    Environment(String),

    /// The async runtime driving child processes could not be created.
    #[error("cannot start process runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

impl EngineError {
    pub fn stage(&self) -> Option<Stage> {
        match self {
            EngineError::Invocation { stage, .. }
            | EngineError::Timeout { stage, .. }
            | EngineError::Spawn { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Fault bucket of the failure, if it can be classified.
    pub fn fault(&self) -> Option<Fault> {
        match self {
            EngineError::Invocation { fault, .. } => Some(*fault),
            EngineError::NotInstalled { .. } => Some(Fault::BadInstallation),
            _ => None,
        }
    }

    /// Advice for the user, shown below the error.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            EngineError::Timeout { .. } => {
                Some("The tested grammar might be blocked by forbidden=1.")
            }
            _ => self.fault().and_then(|fault| fault.hint()),
        }
    }

    /// Whatever the engine printed before failing.
    pub fn output(&self) -> Option<&str> {
        match self {
            EngineError::Invocation { output, .. } => Some(output),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_mentions_forbidden_branch() {
        let err = EngineError::Timeout {
            program: "xmlgenerator".to_string(),
            stage: Stage::Generation,
            budget: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "xmlgenerator timed out after 30s during sentence generation");
        assert!(err.hint().unwrap().contains("forbidden=1"));
        assert!(err.fault().is_none());
    }

    #[test]
    fn invocation_hint_follows_fault() {
        let err = EngineError::Invocation {
            program: "xmlgenerator".to_string(),
            stage: Stage::Parsing,
            status: 2,
            fault: Fault::MissingGrammarResource,
            output: "uri x file not found".to_string(),
        };
        assert_eq!(err.stage(), Some(Stage::Parsing));
        assert_eq!(err.hint(), Some("External grammar not found!"));
        assert_eq!(err.output(), Some("uri x file not found"));
    }
}
