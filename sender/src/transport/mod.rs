use crate::config::{SenderConfig, TransportPaths};
use crate::trap::NagiosTrap;
use nagtrap_common_api::TrapError;
use std::fmt;
use std::path::{Path, PathBuf};

#[cfg(feature = "native-snmp")]
pub mod native;
pub mod net_snmp;
pub mod vendor;

#[cfg(feature = "native-snmp")]
pub use native::NativeSnmpTransport;
pub use net_snmp::NetSnmpTransport;
pub use vendor::VendorBinaryTransport;

pub const SNMPTRAP_BINARY_NAME: &str = "snmptrap";

/// A way of delivering a trap to the NNM.
/// The sender uses the first available transport and never falls back to another one.
#[async_trait::async_trait(?Send)]
pub trait TrapTransport: fmt::Display {
    /// Checks whether the transport can be used on this host.
    fn is_available(&self) -> bool;

    /// Delivers the trap to the destination.
    async fn send(&self, trap: &NagiosTrap, destination: &str) -> Result<(), TrapError>;
}

/// The transports in order of preference: native client, vendor binary, net-snmp snmptrap.
pub fn default_transports(config: &SenderConfig) -> Vec<Box<dyn TrapTransport>> {
    let mut transports: Vec<Box<dyn TrapTransport>> = vec![];
    #[cfg(feature = "native-snmp")]
    transports.push(Box::new(NativeSnmpTransport::new(config)));
    transports.push(Box::new(VendorBinaryTransport::new(&config.transport_paths.vendor_binary)));
    transports.push(Box::new(NetSnmpTransport::new(config.transport_paths.clone(), &config.community)));
    transports
}

/// The well-known snmptrap location of the supported operating systems,
/// keyed by the values of `std::env::consts::OS`.
pub fn os_snmptrap_path(os: &str) -> Option<&'static str> {
    match os {
        "linux" => Some("/usr/bin/snmptrap"),
        "freebsd" | "openbsd" | "netbsd" | "dragonfly" => Some("/usr/local/bin/snmptrap"),
        "macos" => Some("/usr/bin/snmptrap"),
        "solaris" | "illumos" => Some("/usr/sfw/bin/snmptrap"),
        "aix" => Some("/opt/freeware/bin/snmptrap"),
        _ => None,
    }
}

/// Returns the first executable snmptrap: the custom install first, then the OS
/// well-known path, then the fallback directories in order.
pub fn locate_snmptrap(paths: &TransportPaths) -> Option<PathBuf> {
    let os_path = paths
        .os_snmptrap
        .clone()
        .or_else(|| os_snmptrap_path(std::env::consts::OS).map(str::to_owned));

    std::iter::once(PathBuf::from(&paths.custom_snmptrap))
        .chain(os_path.map(PathBuf::from))
        .chain(paths.fallback_dirs.iter().map(|dir| Path::new(dir).join(SNMPTRAP_BINARY_NAME)))
        .find(|candidate| is_executable(candidate))
}

#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|metadata| metadata.is_file() && metadata.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Quotes the value for a POSIX shell, so the command lines in the logs can be pasted as they are.
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r#"'\''"#))
}

#[cfg(test)]
pub(crate) mod test_utils {
    use std::path::{Path, PathBuf};

    /// Writes an executable shell script into the directory.
    #[cfg(unix)]
    pub fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;
        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        path
    }
}
