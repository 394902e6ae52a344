use crate::oid::SNMP_TRAP_OID;
use crate::transport::{is_executable, TrapTransport};
use crate::trap::NagiosTrap;
use log::*;
use nagtrap_common_api::TrapError;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// The generic trap type passed to the vendor binary: enterpriseSpecific.
pub const VENDOR_GENERIC_TRAP: &str = "6";
/// The specific trap type passed to the vendor binary: nSvcEvent.
pub const VENDOR_SPECIFIC_TRAP: &str = "7";

/// Sends the trap through the trap binary of the NNM agent.
/// The varbinds are written on the binary stdin, one per line.
pub struct VendorBinaryTransport {
    binary: PathBuf,
}

impl VendorBinaryTransport {
    pub fn new<P: Into<PathBuf>>(binary: P) -> VendorBinaryTransport {
        VendorBinaryTransport { binary: binary.into() }
    }

    fn command_line(&self, destination: &str) -> String {
        format!(
            "{} {} {} {}",
            self.binary.display(),
            destination,
            VENDOR_GENERIC_TRAP,
            VENDOR_SPECIFIC_TRAP
        )
    }
}

/// The lines fed to the vendor binary: the trap identity first, then the sorted parameters.
pub fn vendor_input_lines(trap: &NagiosTrap) -> Vec<String> {
    std::iter::once(format!("{} string {}\n", SNMP_TRAP_OID, trap.trap_oid))
        .chain(
            trap.sorted_parameters()
                .into_iter()
                .map(|varbind| format!("{} string {}\n", varbind.oid, varbind.value_as_text())),
        )
        .collect()
}

impl fmt::Display for VendorBinaryTransport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "VendorBinaryTransport [{}]", self.binary.display())
    }
}

#[async_trait::async_trait(?Send)]
impl TrapTransport for VendorBinaryTransport {
    fn is_available(&self) -> bool {
        is_executable(&self.binary)
    }

    async fn send(&self, trap: &NagiosTrap, destination: &str) -> Result<(), TrapError> {
        let command_line = self.command_line(destination);
        debug!("VendorBinaryTransport - executing [{}]", command_line);

        let send_error = |message: String| TrapError::TransportSendError {
            message,
            command: Some(command_line.clone()),
        };

        let mut child = Command::new(&self.binary)
            .arg(destination)
            .arg(VENDOR_GENERIC_TRAP)
            .arg(VENDOR_SPECIFIC_TRAP)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|err| send_error(format!("Cannot execute the vendor trap binary: {}", err)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| send_error("Cannot open the stdin of the vendor trap binary".to_owned()))?;

        for line in vendor_input_lines(trap) {
            trace!("VendorBinaryTransport - writing line: {}", line.trim_end());
            stdin.write_all(line.as_bytes()).await.map_err(|err| {
                send_error(format!("Cannot write to the vendor trap binary: {}", err))
            })?;
        }

        // Closing stdin is the end of input signal for the binary
        stdin.shutdown().await.map_err(|err| {
            send_error(format!("Cannot close the stdin of the vendor trap binary: {}", err))
        })?;
        drop(stdin);

        match child.wait().await {
            Ok(status) if status.success() => {
                debug!("VendorBinaryTransport - [{}] completed", command_line)
            }
            Ok(status) => {
                warn!("VendorBinaryTransport - [{}] returned status: [{}]", command_line, status)
            }
            Err(err) => warn!("VendorBinaryTransport - cannot wait for [{}]: {}", command_line, err),
        }

        Ok(())
    }
}
