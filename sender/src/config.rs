use serde::{Deserialize, Serialize};

/// Environment variable overriding the NNM destination.
pub const NNMS_ENV_VAR: &str = "NAGTRAP_NNMS";
/// Environment variable overriding the hostname reported in the trap.
pub const HOSTNAME_ENV_VAR: &str = "NAGTRAP_HOSTNAME";

pub const DEFAULT_NNM_CONFIG_PATH: &str = "/etc/nagtrap/nnm.conf";
pub const DEFAULT_COMMUNITY: &str = "public";
pub const DEFAULT_TRAP_PORT: u16 = 162;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_VENDOR_BINARY: &str = "/opt/OV/bin/snmpnotify";
pub const DEFAULT_CUSTOM_SNMPTRAP: &str = "/opt/nagtrap/bin/snmptrap";
pub const DEFAULT_FALLBACK_DIRS: [&str; 5] = ["/usr/bin", "/usr/local/bin", "/bin", "/usr/sbin", "/opt/bin"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    /// The file holding the `NNMS <host>` entry.
    pub nnm_config_path: String,
    pub community: String,
    pub trap_port: u16,
    /// Upper bound for the whole native SNMP session, from address resolution to send.
    pub timeout_secs: u64,
    /// Whether the compiled-in SNMP client can be used.
    pub native_snmp: bool,
    pub transport_paths: TransportPaths,
}

impl Default for SenderConfig {
    fn default() -> Self {
        SenderConfig {
            nnm_config_path: DEFAULT_NNM_CONFIG_PATH.to_owned(),
            community: DEFAULT_COMMUNITY.to_owned(),
            trap_port: DEFAULT_TRAP_PORT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            native_snmp: true,
            transport_paths: TransportPaths::default(),
        }
    }
}

/// Where the external trap binaries are searched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportPaths {
    pub vendor_binary: String,
    pub custom_snmptrap: String,
    /// When not set, the well-known path of the running OS is used.
    pub os_snmptrap: Option<String>,
    pub fallback_dirs: Vec<String>,
}

impl Default for TransportPaths {
    fn default() -> Self {
        TransportPaths {
            vendor_binary: DEFAULT_VENDOR_BINARY.to_owned(),
            custom_snmptrap: DEFAULT_CUSTOM_SNMPTRAP.to_owned(),
            os_snmptrap: None,
            fallback_dirs: DEFAULT_FALLBACK_DIRS.iter().map(|dir| dir.to_string()).collect(),
        }
    }
}

/// The overrides read from the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentOverrides {
    pub destination: Option<String>,
    pub hostname: Option<String>,
}

impl EnvironmentOverrides {
    pub fn from_process_env() -> Self {
        EnvironmentOverrides {
            destination: non_empty_env_var(NNMS_ENV_VAR),
            hostname: non_empty_env_var(HOSTNAME_ENV_VAR),
        }
    }
}

fn non_empty_env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}
