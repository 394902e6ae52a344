use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum TrapError {
    #[error("UsageError: [{message}]")]
    UsageError { message: String },
    #[error("ConfigurationError: [{message}]")]
    ConfigurationError { message: String },
    #[error("HostResolutionError: [{message}], hostname: [{hostname}]")]
    HostResolutionError { hostname: String, message: String },
    #[error("ValidationError: [{message}]")]
    ValidationError { message: String },
    #[error("TransportUnavailableError: [{message}]")]
    TransportUnavailableError { message: String },
    #[error("TransportSendError: [{message}]{}", format_command(.command))]
    TransportSendError { message: String, command: Option<String> },
}

fn format_command(command: &Option<String>) -> String {
    command.as_ref().map(|command| format!(", command: [{}]", command)).unwrap_or_default()
}

impl TrapError {
    /// Returns the process exit code linked to this error.
    /// Usage errors follow the common `2` convention of command line tools.
    pub fn exit_code(&self) -> u8 {
        match self {
            TrapError::UsageError { .. } => 2,
            _ => 1,
        }
    }
}
