use clap::Parser;
use config_rs::{Config, ConfigError, File};
use nagtrap_common_api::{Event, TrapError};
use nagtrap_common_logger::LoggerConfig;
use nagtrap_sender::config::SenderConfig;
use serde::{Deserialize, Serialize};

pub const CONFIG_DIR_DEFAULT: Option<&'static str> = option_env!("NAGTRAP_CONFIG_DIR_DEFAULT");
pub const CONFIG_FILE_NAME: &str = "nagtrap.toml";

#[derive(Parser, Debug, Clone)]
#[clap(
    name = "nagtrap",
    about = "Sends Nagios service events to a Network Node Manager as SNMP traps",
    disable_version_flag = true
)]
pub struct Args {
    /// The service state: ok, warning, critical or unknown
    #[clap(short = 's', long = "state")]
    pub state: Option<String>,

    /// The service description
    #[clap(short = 'S', long = "service")]
    pub service: Option<String>,

    /// The plugin output. Performance data after the first '|' is dropped
    #[clap(short = 'o', long = "output")]
    pub output: Option<String>,

    /// The NNM receiving the trap. Overrides NAGTRAP_NNMS and the NNM config file
    #[clap(short = 'd', long = "destination")]
    pub destination: Option<String>,

    /// The host reported in the trap. Overrides NAGTRAP_HOSTNAME and the OS lookup
    #[clap(short = 'H', long = "hostname")]
    pub hostname: Option<String>,

    /// The filesystem folder where the nagtrap configuration is saved
    #[clap(short = 'c', long = "config-dir", default_value = CONFIG_DIR_DEFAULT.unwrap_or("/etc/nagtrap"))]
    pub config_dir: String,

    /// Prints the manual
    #[clap(short = 'm', long = "man")]
    pub man: bool,

    /// Prints the version and the detected environment
    #[clap(short = 'V', long = "version")]
    pub version: bool,
}

impl Args {
    /// Builds the event to send. A missing required option is a usage error.
    pub fn to_event(&self) -> Result<Event, TrapError> {
        let missing: Vec<&str> = [
            ("--state", &self.state),
            ("--service", &self.service),
            ("--output", &self.output),
        ]
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            return Err(TrapError::UsageError {
                message: format!("Missing required option(s): {}", missing.join(", ")),
            });
        }

        Event::from_raw(
            self.state.as_deref(),
            self.service.as_deref(),
            self.output.as_deref(),
            self.destination.as_deref(),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NagtrapConfig {
    /// The logger configuration
    pub logger: LoggerConfig,
    pub sender: SenderConfig,
}

/// Reads `nagtrap.toml` from the config dir. A missing file leaves every value to its default.
pub fn build_config(config_dir: &str) -> Result<NagtrapConfig, ConfigError> {
    let config_file_path = format!("{}/{}", config_dir, CONFIG_FILE_NAME);
    let mut s = Config::new();
    s.merge(File::with_name(&config_file_path).required(false))?;
    s.try_into()
}
