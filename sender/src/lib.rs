use crate::config::{EnvironmentOverrides, SenderConfig};
use crate::host::{HostnameLookup, SystemHostnameLookup};
use crate::transport::TrapTransport;
use crate::trap::NagiosTrap;
use log::*;
use nagtrap_common_api::{Event, TrapError};
use std::path::Path;

pub mod config;
pub mod destination;
pub mod host;
pub mod oid;
pub mod transport;
pub mod trap;

/// Relays Nagios service events to the NNM as SNMP traps.
pub struct TrapSender {
    config: SenderConfig,
    environment: EnvironmentOverrides,
    transports: Vec<Box<dyn TrapTransport>>,
    hostname_lookup: Box<dyn HostnameLookup>,
}

impl TrapSender {
    pub fn new(config: SenderConfig, environment: EnvironmentOverrides) -> TrapSender {
        let transports = transport::default_transports(&config);
        TrapSender::with_transports(
            config,
            environment,
            transports,
            Box::new(SystemHostnameLookup::default()),
        )
    }

    pub fn with_transports(
        config: SenderConfig,
        environment: EnvironmentOverrides,
        transports: Vec<Box<dyn TrapTransport>>,
        hostname_lookup: Box<dyn HostnameLookup>,
    ) -> TrapSender {
        TrapSender { config, environment, transports, hostname_lookup }
    }

    /// Resolves the destination and the origin host, then sends the event.
    pub async fn send(&self, event: &Event, hostname: Option<&str>) -> Result<(), TrapError> {
        trace!("TrapSender - received event: {:?}", event);

        let destination = destination::resolve_destination(
            event.destination.as_deref(),
            self.environment.destination.as_deref(),
            Path::new(&self.config.nnm_config_path),
        )?;
        let hostname = host::resolve_hostname(
            hostname,
            self.environment.hostname.as_deref(),
            self.hostname_lookup.as_ref(),
        )?;

        let trap = NagiosTrap::build(
            event,
            &hostname,
            chrono::Utc::now().timestamp(),
            trap::system_uptime_ticks(),
        );

        info!(
            "TrapSender - sending [{}] state for service [{}] of host [{}] to [{}]",
            event.state, event.service, hostname, destination
        );
        self.send_trap(&trap, &destination).await
    }

    /// Sends the trap with the first available transport.
    /// A failure of the selected transport is returned as is: no other transport is tried.
    pub async fn send_trap(&self, trap: &NagiosTrap, destination: &str) -> Result<(), TrapError> {
        let transport = self.select_transport().ok_or_else(|| {
            TrapError::TransportUnavailableError { message: self.unavailable_message() }
        })?;
        info!("TrapSender - using transport [{}]", transport);
        transport.send(trap, destination).await
    }

    pub fn select_transport(&self) -> Option<&dyn TrapTransport> {
        for transport in &self.transports {
            if transport.is_available() {
                return Some(transport.as_ref());
            }
            debug!("TrapSender - transport [{}] is not available", transport);
        }
        None
    }

    /// Describes every transport with its availability, in order of preference.
    pub fn transports_report(&self) -> Vec<(String, bool)> {
        self.transports
            .iter()
            .map(|transport| (transport.to_string(), transport.is_available()))
            .collect()
    }

    fn unavailable_message(&self) -> String {
        format!(
            "No SNMP transport available. Verify that nagtrap is built with the native SNMP client and that it is enabled, \
            or install the vendor trap binary [{}], or install the net-snmp snmptrap binary in [{}] or in the system path",
            self.config.transport_paths.vendor_binary, self.config.transport_paths.custom_snmptrap
        )
    }
}
