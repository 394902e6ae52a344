use crate::config::HOSTNAME_ENV_VAR;
use log::*;
use nagtrap_common_api::TrapError;
use std::net::IpAddr;

/// Resolves the name of the local host through the operating system.
pub trait HostnameLookup {
    fn short_hostname(&self) -> String;

    /// Returns the fully qualified name of the host, if the OS knows it.
    fn fqdn(&self, short_hostname: &str) -> Option<String>;
}

#[derive(Default)]
pub struct SystemHostnameLookup {}

impl HostnameLookup for SystemHostnameLookup {
    fn short_hostname(&self) -> String {
        gethostname::gethostname().to_string_lossy().into_owned()
    }

    fn fqdn(&self, short_hostname: &str) -> Option<String> {
        if short_hostname.is_empty() {
            return None;
        }
        if short_hostname.contains('.') {
            return Some(short_hostname.to_owned());
        }

        let addresses = match dns_lookup::lookup_host(short_hostname) {
            Ok(addresses) => addresses,
            Err(err) => {
                debug!("Cannot resolve the address of [{}]: {}", short_hostname, err);
                return None;
            }
        };

        addresses
            .into_iter()
            .filter_map(|address| dns_lookup::lookup_addr(&address).ok())
            .find(|name| !name.is_empty() && name.parse::<IpAddr>().is_err())
    }
}

/// Resolves the host name sent in the trap.
/// The explicit hostname wins over the environment, which wins over the OS lookup.
/// Empty values are ignored.
pub fn resolve_hostname(
    explicit: Option<&str>,
    environment: Option<&str>,
    lookup: &dyn HostnameLookup,
) -> Result<String, TrapError> {
    if let Some(hostname) = explicit.filter(|hostname| !hostname.is_empty()) {
        return Ok(hostname.to_owned());
    }

    if let Some(hostname) = environment.filter(|hostname| !hostname.is_empty()) {
        debug!("Hostname [{}] read from the {} environment variable", hostname, HOSTNAME_ENV_VAR);
        return Ok(hostname.to_owned());
    }

    let short_hostname = lookup.short_hostname();
    match lookup.fqdn(&short_hostname).filter(|fqdn| !fqdn.is_empty()) {
        Some(fqdn) => {
            debug!("Hostname [{}] resolved to [{}]", short_hostname, fqdn);
            Ok(fqdn)
        }
        None => Err(TrapError::HostResolutionError {
            message: format!(
                "Cannot resolve the fully qualified domain name of the host. Use the --hostname option or the {} environment variable",
                HOSTNAME_ENV_VAR
            ),
            hostname: short_hostname,
        }),
    }
}
