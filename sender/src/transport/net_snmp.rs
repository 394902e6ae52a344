use crate::config::TransportPaths;
use crate::transport::{locate_snmptrap, os_snmptrap_path, shell_quote, TrapTransport};
use crate::trap::NagiosTrap;
use log::*;
use nagtrap_common_api::TrapError;
use std::fmt;
use std::path::Path;
use tokio::process::Command;

pub const SNMPTRAP_VERSION: &str = "2c";
/// Empty uptime: snmptrap fills in the uptime of the host.
const SNMPTRAP_UPTIME: &str = "";
const SNMPTRAP_STRING_TYPE: &str = "s";

/// Sends the trap with the net-snmp `snmptrap` command.
pub struct NetSnmpTransport {
    paths: TransportPaths,
    community: String,
}

impl NetSnmpTransport {
    pub fn new(paths: TransportPaths, community: &str) -> NetSnmpTransport {
        NetSnmpTransport { paths, community: community.to_owned() }
    }

    pub fn snmptrap_args(&self, trap: &NagiosTrap, destination: &str) -> Vec<String> {
        let mut args = vec![
            "-v".to_owned(),
            SNMPTRAP_VERSION.to_owned(),
            "-c".to_owned(),
            self.community.clone(),
            destination.to_owned(),
            SNMPTRAP_UPTIME.to_owned(),
            trap.trap_oid.clone(),
        ];
        for varbind in trap.sorted_parameters() {
            args.push(varbind.oid.clone());
            args.push(SNMPTRAP_STRING_TYPE.to_owned());
            args.push(varbind.value_as_text());
        }
        args
    }

    /// The command line as it would be typed in a shell.
    pub fn command_line(&self, binary: &Path, trap: &NagiosTrap, destination: &str) -> String {
        let mut command_line = format!(
            "{} -v {} -c {} {} {} {}",
            binary.display(),
            SNMPTRAP_VERSION,
            shell_quote(&self.community),
            shell_quote(destination),
            shell_quote(SNMPTRAP_UPTIME),
            shell_quote(&trap.trap_oid)
        );
        for varbind in trap.sorted_parameters() {
            command_line.push_str(&format!(
                " {} {} {}",
                shell_quote(&varbind.oid),
                SNMPTRAP_STRING_TYPE,
                shell_quote(&varbind.value_as_text())
            ));
        }
        command_line
    }
}

impl fmt::Display for NetSnmpTransport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let os_snmptrap = self
            .paths
            .os_snmptrap
            .as_deref()
            .or_else(|| os_snmptrap_path(std::env::consts::OS))
            .unwrap_or("-");
        write!(
            f,
            "NetSnmpTransport [custom: {}, os: {}, fallback dirs: {}]",
            self.paths.custom_snmptrap,
            os_snmptrap,
            self.paths.fallback_dirs.join(":")
        )
    }
}

#[async_trait::async_trait(?Send)]
impl TrapTransport for NetSnmpTransport {
    fn is_available(&self) -> bool {
        locate_snmptrap(&self.paths).is_some()
    }

    async fn send(&self, trap: &NagiosTrap, destination: &str) -> Result<(), TrapError> {
        let binary = locate_snmptrap(&self.paths).ok_or_else(|| {
            TrapError::TransportUnavailableError {
                message: "The snmptrap binary is no longer available".to_owned(),
            }
        })?;
        let command_line = self.command_line(&binary, trap, destination);
        debug!("NetSnmpTransport - executing [{}]", command_line);

        let output = Command::new(&binary)
            .args(self.snmptrap_args(trap, destination))
            .output()
            .await
            .map_err(|err| TrapError::TransportSendError {
                message: format!("Cannot execute snmptrap: {}", err),
                command: Some(command_line.clone()),
            })?;

        let mut captured = String::from_utf8_lossy(&output.stdout).into_owned();
        captured.push_str(&String::from_utf8_lossy(&output.stderr));

        // snmptrap is silent on success
        if !captured.is_empty() {
            return Err(TrapError::TransportSendError {
                message: format!("snmptrap returned: {}", captured.trim_end()),
                command: Some(command_line),
            });
        }

        debug!("NetSnmpTransport - snmptrap completed with status [{}]", output.status);
        Ok(())
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::oid::*;
    use nagtrap_common_api::{Event, ServiceState};

    fn trap() -> NagiosTrap {
        let event = Event::new(ServiceState::Critical, "Generic Service", "It's down", None);
        NagiosTrap::build(&event, "host.example.com", 1_600_000_000, 0)
    }

    #[test]
    fn should_build_the_snmptrap_arguments() {
        let transport = NetSnmpTransport::new(TransportPaths::default(), "public");

        let args = transport.snmptrap_args(&trap(), "192.0.2.5");

        assert_eq!(
            vec!["-v", "2c", "-c", "public", "192.0.2.5", "", NAGIOS_SERVICE_EVENT_OID],
            args[..7].to_vec()
        );
        assert_eq!(7 + 3 * 10, args.len());
        assert_eq!(vec![SVC_HOSTNAME_OID, "s", "host.example.com"], args[7..10].to_vec());
        assert_eq!(vec![SVC_OUTPUT_OID, "s", "It's down"], args[34..37].to_vec());
    }

    #[test]
    fn should_quote_the_command_line() {
        let transport = NetSnmpTransport::new(TransportPaths::default(), "public");

        let command_line =
            transport.command_line(Path::new("/usr/bin/snmptrap"), &trap(), "192.0.2.5");

        assert!(command_line.starts_with(
            "/usr/bin/snmptrap -v 2c -c 'public' '192.0.2.5' '' '1.3.6.1.4.1.20006.1.7' '1.3.6.1.4.1.20006.1.3.1.2' s 'host.example.com'"
        ));
        assert!(command_line.ends_with(r#" '1.3.6.1.4.1.20006.1.3.1.17' s 'It'\''s down'"#));
    }

    #[test]
    fn should_display_the_configured_paths_without_touching_the_filesystem() {
        let paths = TransportPaths {
            vendor_binary: "/not/existing/vendor".to_owned(),
            custom_snmptrap: "/not/existing/custom/snmptrap".to_owned(),
            os_snmptrap: Some("/not/existing/os/snmptrap".to_owned()),
            fallback_dirs: vec!["/not/existing/bin".to_owned(), "/not/existing/sbin".to_owned()],
        };
        let transport = NetSnmpTransport::new(paths, "public");

        assert_eq!(
            "NetSnmpTransport [custom: /not/existing/custom/snmptrap, os: /not/existing/os/snmptrap, fallback dirs: /not/existing/bin:/not/existing/sbin]",
            transport.to_string()
        );
    }

    #[cfg(unix)]
    mod unix {
        use super::*;
        use crate::transport::test_utils::write_script;

        fn transport_with(binary: &Path) -> NetSnmpTransport {
            let paths = TransportPaths {
                vendor_binary: "/not/existing/vendor".to_owned(),
                custom_snmptrap: binary.to_str().unwrap().to_owned(),
                os_snmptrap: Some("/not/existing/snmptrap".to_owned()),
                fallback_dirs: vec![],
            };
            NetSnmpTransport::new(paths, "public")
        }

        #[tokio::test]
        async fn should_succeed_if_snmptrap_is_silent() {
            let tempdir = tempfile::tempdir().unwrap();
            let args_file = tempdir.path().join("args.txt");
            let binary = write_script(
                tempdir.path(),
                "snmptrap",
                &format!("for arg in \"$@\"; do echo \"$arg\" >> {}; done", args_file.display()),
            );
            let transport = transport_with(&binary);

            transport.send(&trap(), "192.0.2.5").await.unwrap();

            let received: Vec<String> =
                std::fs::read_to_string(&args_file).unwrap().lines().map(str::to_owned).collect();
            assert_eq!(transport.snmptrap_args(&trap(), "192.0.2.5"), received);
        }

        #[tokio::test]
        async fn should_fail_with_the_output_of_snmptrap() {
            let tempdir = tempfile::tempdir().unwrap();
            let binary = write_script(tempdir.path(), "snmptrap", "echo 'snmptrap: Unknown host (nohost)' >&2");
            let transport = transport_with(&binary);

            match transport.send(&trap(), "nohost").await {
                Err(TrapError::TransportSendError { message, command }) => {
                    assert!(message.contains("snmptrap: Unknown host (nohost)"));
                    let command = command.unwrap();
                    assert!(command.starts_with(&format!("{} -v 2c", binary.display())));
                    assert!(command.contains("'nohost'"));
                }
                other => panic!("Expected TransportSendError, got {:?}", other),
            }
        }

        #[test]
        fn should_be_unavailable_without_snmptrap() {
            let tempdir = tempfile::tempdir().unwrap();
            let transport = transport_with(&tempdir.path().join("missing"));
            assert!(!transport.is_available());
        }
    }
}
