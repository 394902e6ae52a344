use std::fmt;
use std::str::FromStr;

pub mod error;

pub use error::TrapError;

/// The accepted service states, in the textual form expected on the command line.
pub const ACCEPTED_STATES: [&str; 4] = ["ok", "warning", "critical", "unknown"];

/// The state of a Nagios passive service.
/// The numeric codes are the plugin return codes used by Nagios.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl ServiceState {
    pub fn code(&self) -> u8 {
        match self {
            ServiceState::Ok => 0,
            ServiceState::Warning => 1,
            ServiceState::Critical => 2,
            ServiceState::Unknown => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        ACCEPTED_STATES[self.code() as usize]
    }
}

impl FromStr for ServiceState {
    type Err = TrapError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "ok" => Ok(ServiceState::Ok),
            "warning" => Ok(ServiceState::Warning),
            "critical" => Ok(ServiceState::Critical),
            "unknown" => Ok(ServiceState::Unknown),
            _ => Err(TrapError::ValidationError {
                message: format!(
                    "Unknown state [{}]. Accepted values are: {}",
                    value,
                    ACCEPTED_STATES.join(", ")
                ),
            }),
        }
    }
}

impl fmt::Display for ServiceState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An Event is the single status update relayed to the NNM.
/// It is built once from the raw command line input and is never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub state: ServiceState,
    pub service: String,
    /// The plugin output, without the performance data.
    pub output: String,
    /// Overrides the destination configured in the environment or in the NNM config file.
    pub destination: Option<String>,
}

impl Event {
    pub fn new<S: Into<String>, O: AsRef<str>>(
        state: ServiceState,
        service: S,
        output: O,
        destination: Option<String>,
    ) -> Event {
        Event {
            state,
            service: service.into(),
            output: strip_performance_data(output.as_ref()).to_owned(),
            destination,
        }
    }

    /// Validates the raw input and builds an Event.
    /// Empty values are considered missing.
    pub fn from_raw(
        state: Option<&str>,
        service: Option<&str>,
        output: Option<&str>,
        destination: Option<&str>,
    ) -> Result<Event, TrapError> {
        let state = required_field("state", state)?;
        let service = required_field("service", service)?;
        let output = required_field("output", output)?;
        let state = ServiceState::from_str(state)?;
        Ok(Event::new(
            state,
            service,
            output,
            destination.filter(|destination| !destination.is_empty()).map(str::to_owned),
        ))
    }
}

fn required_field<'a>(name: &str, value: Option<&'a str>) -> Result<&'a str, TrapError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(TrapError::ValidationError {
            message: format!(
                "Missing required field [{}]. The state must be one of: {}",
                name,
                ACCEPTED_STATES.join(", ")
            ),
        }),
    }
}

/// Removes the performance data appended by Nagios plugins to their output.
/// Everything starting from the first '|' is dropped, together with the whitespace before it.
pub fn strip_performance_data(output: &str) -> &str {
    match output.find('|') {
        Some(index) => output[..index].trim_end(),
        None => output,
    }
}
