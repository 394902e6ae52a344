use crate::oid::*;
use nagtrap_common_api::Event;

/// Host state reported with every service event: the sending host is up.
const HOST_STATE_UP: &str = "0";
const SERVICE_ATTEMPT: &str = "1";
const SERVICE_DURATION_SEC: &str = "0";
const SERVICE_GROUP_NAME: &str = "";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarbindValue {
    TimeTicks(u32),
    ObjectIdentifier(String),
    OctetString(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Varbind {
    pub oid: String,
    pub value: VarbindValue,
}

impl Varbind {
    pub fn string<O: Into<String>, V: Into<String>>(oid: O, value: V) -> Varbind {
        Varbind { oid: oid.into(), value: VarbindValue::OctetString(value.into()) }
    }

    /// The textual representation of the value, as passed to the external binaries.
    pub fn value_as_text(&self) -> String {
        match &self.value {
            VarbindValue::TimeTicks(ticks) => ticks.to_string(),
            VarbindValue::ObjectIdentifier(oid) => oid.clone(),
            VarbindValue::OctetString(text) => text.clone(),
        }
    }
}

/// A Nagios service event, in the NAGIOS-NOTIFY-MIB object space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NagiosTrap {
    pub uptime_ticks: u32,
    pub trap_oid: String,
    /// The nSvc* objects of the event, in MIB order.
    pub parameters: Vec<Varbind>,
}

impl NagiosTrap {
    pub fn build(event: &Event, hostname: &str, now_secs: i64, uptime_ticks: u32) -> NagiosTrap {
        let now = now_secs.to_string();
        NagiosTrap {
            uptime_ticks,
            trap_oid: NAGIOS_SERVICE_EVENT_OID.to_owned(),
            parameters: vec![
                Varbind::string(SVC_HOSTNAME_OID, hostname),
                Varbind::string(SVC_HOST_STATE_ID_OID, HOST_STATE_UP),
                Varbind::string(SVC_DESC_OID, event.service.as_str()),
                Varbind::string(SVC_STATE_ID_OID, event.state.code().to_string()),
                Varbind::string(SVC_ATTEMPT_OID, SERVICE_ATTEMPT),
                Varbind::string(SVC_DURATION_SEC_OID, SERVICE_DURATION_SEC),
                Varbind::string(SVC_GROUP_NAME_OID, SERVICE_GROUP_NAME),
                Varbind::string(SVC_LAST_CHECK_OID, now.as_str()),
                Varbind::string(SVC_LAST_CHANGE_OID, now.as_str()),
                Varbind::string(SVC_OUTPUT_OID, event.output.as_str()),
            ],
        }
    }

    /// The complete varbind list of the notification: sysUpTime, snmpTrapOID, then the parameters.
    pub fn varbinds(&self) -> Vec<Varbind> {
        let mut varbinds = Vec::with_capacity(self.parameters.len() + 2);
        varbinds.push(Varbind {
            oid: SYS_UPTIME_OID.to_owned(),
            value: VarbindValue::TimeTicks(self.uptime_ticks),
        });
        varbinds.push(Varbind {
            oid: SNMP_TRAP_OID.to_owned(),
            value: VarbindValue::ObjectIdentifier(self.trap_oid.clone()),
        });
        varbinds.extend(self.parameters.iter().cloned());
        varbinds
    }

    /// The parameters, sorted with [`compare_concatenated_oids`]. The sort is stable.
    pub fn sorted_parameters(&self) -> Vec<&Varbind> {
        let mut parameters: Vec<&Varbind> = self.parameters.iter().collect();
        parameters.sort_by(|first, second| compare_concatenated_oids(&first.oid, &second.oid));
        parameters
    }
}

/// The uptime of the host in hundredths of a second, as expected by sysUpTime.
/// Returns 0 where the uptime is not available.
pub fn system_uptime_ticks() -> u32 {
    std::fs::read_to_string("/proc/uptime")
        .ok()
        .and_then(|content| parse_uptime_ticks(&content))
        .unwrap_or(0)
}

fn parse_uptime_ticks(content: &str) -> Option<u32> {
    let seconds: f64 = content.split_whitespace().next()?.parse().ok()?;
    // TimeTicks wrap every ~497 days
    Some(((seconds * 100.0) as u64 % (u32::MAX as u64 + 1)) as u32)
}

#[cfg(test)]
mod test {

    use super::*;
    use nagtrap_common_api::ServiceState;

    fn critical_event() -> Event {
        Event::new(
            ServiceState::Critical,
            "Generic Service",
            "Something bad happened|time=1s",
            None,
        )
    }

    #[test]
    fn should_build_the_service_event_parameters() {
        // Act
        let trap = NagiosTrap::build(&critical_event(), "host.example.com", 1_600_000_000, 42);

        // Assert
        assert_eq!(NAGIOS_SERVICE_EVENT_OID, trap.trap_oid);
        assert_eq!(42, trap.uptime_ticks);
        assert_eq!(
            vec![
                Varbind::string(SVC_HOSTNAME_OID, "host.example.com"),
                Varbind::string(SVC_HOST_STATE_ID_OID, "0"),
                Varbind::string(SVC_DESC_OID, "Generic Service"),
                Varbind::string(SVC_STATE_ID_OID, "2"),
                Varbind::string(SVC_ATTEMPT_OID, "1"),
                Varbind::string(SVC_DURATION_SEC_OID, "0"),
                Varbind::string(SVC_GROUP_NAME_OID, ""),
                Varbind::string(SVC_LAST_CHECK_OID, "1600000000"),
                Varbind::string(SVC_LAST_CHANGE_OID, "1600000000"),
                Varbind::string(SVC_OUTPUT_OID, "Something bad happened"),
            ],
            trap.parameters
        );
    }

    #[test]
    fn varbinds_should_start_with_uptime_and_trap_oid() {
        let trap = NagiosTrap::build(&critical_event(), "host", 0, 1234);

        let varbinds = trap.varbinds();

        assert_eq!(12, varbinds.len());
        assert_eq!(SYS_UPTIME_OID, varbinds[0].oid);
        assert_eq!(VarbindValue::TimeTicks(1234), varbinds[0].value);
        assert_eq!(SNMP_TRAP_OID, varbinds[1].oid);
        assert_eq!(
            VarbindValue::ObjectIdentifier(NAGIOS_SERVICE_EVENT_OID.to_owned()),
            varbinds[1].value
        );
        assert_eq!(trap.parameters, varbinds[2..].to_vec());
    }

    #[test]
    fn should_sort_the_parameters_by_concatenated_oid() {
        let mut trap = NagiosTrap::build(&critical_event(), "host", 0, 0);
        trap.parameters.reverse();

        let oids: Vec<&str> = trap.sorted_parameters().iter().map(|vb| vb.oid.as_str()).collect();

        assert_eq!(
            vec![
                SVC_HOSTNAME_OID,
                SVC_HOST_STATE_ID_OID,
                SVC_DESC_OID,
                SVC_STATE_ID_OID,
                SVC_ATTEMPT_OID,
                SVC_DURATION_SEC_OID,
                SVC_GROUP_NAME_OID,
                SVC_LAST_CHECK_OID,
                SVC_LAST_CHANGE_OID,
                SVC_OUTPUT_OID,
            ],
            oids
        );
    }

    #[test]
    fn should_render_values_as_text() {
        assert_eq!("12", Varbind { oid: "1".to_owned(), value: VarbindValue::TimeTicks(12) }.value_as_text());
        assert_eq!("text", Varbind::string("1", "text").value_as_text());
    }

    #[test]
    fn should_parse_proc_uptime() {
        assert_eq!(Some(1234550), parse_uptime_ticks("12345.50 54321.00\n"));
        assert_eq!(None, parse_uptime_ticks(""));
        assert_eq!(None, parse_uptime_ticks("not-a-number 1.0"));
    }
}
