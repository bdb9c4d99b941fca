use std::path::PathBuf;

use crate::llm::GenerationError;
use crate::report::Report;
use crate::stage::Stage;

/// User-facing errors. Every variant is terminal for the current run.
#[derive(Debug, thiserror::Error)]
pub enum JobshiftError {
    // -- input --
    #[error("Job title must not be empty.")]
    EmptyJobTitle,

    #[error("No job title entered (input closed).")]
    NoJobTitle,

    // -- configuration --
    #[error("Failed to parse environment variable '{var}': {detail}")]
    ConfigEnvParseError { var: String, detail: String },

    #[error("Failed to read config file {path}: {detail}")]
    ConfigFileReadFailed { path: PathBuf, detail: String },

    #[error("Failed to parse config file {path}: {detail}")]
    ConfigFileParseFailed { path: PathBuf, detail: String },

    #[error("Invalid LLM endpoint URL '{url}': {detail}")]
    InvalidEndpointUrl { url: String, detail: String },

    #[error("Invalid temperature {value} (expected a number between 0.0 and 2.0)")]
    InvalidTemperature { value: f64 },

    #[error("Model name must not be empty.")]
    EmptyModelName,

    // -- generation --
    /// A stage's LLM call failed. `completed` holds the stages that finished
    /// before it, for diagnostics only; it is never a complete report.
    #[error("Stage {position}/5 ({stage}) failed: {source}", position = .stage.position())]
    StageFailed {
        stage: Stage,
        completed: Box<Report>,
        #[source]
        source: GenerationError,
    },

    // -- export --
    #[error("Failed to write report {path}: {detail}")]
    ExportFailed { path: PathBuf, detail: String },
}

impl JobshiftError {
    /// True for errors raised before any stage runs because of bad settings.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            JobshiftError::ConfigEnvParseError { .. }
                | JobshiftError::ConfigFileReadFailed { .. }
                | JobshiftError::ConfigFileParseFailed { .. }
                | JobshiftError::InvalidEndpointUrl { .. }
                | JobshiftError::InvalidTemperature { .. }
                | JobshiftError::EmptyModelName
        )
    }

    /// True for errors caused by the job title input.
    pub fn is_input(&self) -> bool {
        matches!(self, JobshiftError::EmptyJobTitle | JobshiftError::NoJobTitle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_failed_message_names_stage_and_position() {
        let err = JobshiftError::StageFailed {
            stage: Stage::Technologies,
            completed: Box::new(Report::new("Accountant")),
            source: GenerationError::EmptyResponse,
        };
        let msg = err.to_string();
        assert!(msg.contains("3/5"), "got: {msg}");
        assert!(msg.contains("Technologies"), "got: {msg}");
        assert!(msg.contains("empty response"), "got: {msg}");
    }

    #[test]
    fn classification_helpers() {
        assert!(JobshiftError::EmptyJobTitle.is_input());
        assert!(!JobshiftError::EmptyJobTitle.is_configuration());
        assert!(JobshiftError::InvalidTemperature { value: 9.0 }.is_configuration());
        assert!(JobshiftError::EmptyModelName.is_configuration());
    }
}
