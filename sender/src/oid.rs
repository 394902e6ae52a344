//! The OIDs of the NAGIOS-NOTIFY-MIB used by the service event trap
//! and the ordering applied to them by the binary transports.

use std::cmp::Ordering;

pub const SYS_UPTIME_OID: &str = "1.3.6.1.2.1.1.3.0";
pub const SNMP_TRAP_OID: &str = "1.3.6.1.6.3.1.1.4.1.0";

/// nSvcEvent, the notification sent for a passive service result.
pub const NAGIOS_SERVICE_EVENT_OID: &str = "1.3.6.1.4.1.20006.1.7";

pub const SVC_HOSTNAME_OID: &str = "1.3.6.1.4.1.20006.1.3.1.2";
pub const SVC_HOST_STATE_ID_OID: &str = "1.3.6.1.4.1.20006.1.3.1.4";
pub const SVC_DESC_OID: &str = "1.3.6.1.4.1.20006.1.3.1.6";
pub const SVC_STATE_ID_OID: &str = "1.3.6.1.4.1.20006.1.3.1.7";
pub const SVC_ATTEMPT_OID: &str = "1.3.6.1.4.1.20006.1.3.1.8";
pub const SVC_DURATION_SEC_OID: &str = "1.3.6.1.4.1.20006.1.3.1.9";
pub const SVC_GROUP_NAME_OID: &str = "1.3.6.1.4.1.20006.1.3.1.10";
pub const SVC_LAST_CHECK_OID: &str = "1.3.6.1.4.1.20006.1.3.1.11";
pub const SVC_LAST_CHANGE_OID: &str = "1.3.6.1.4.1.20006.1.3.1.12";
pub const SVC_OUTPUT_OID: &str = "1.3.6.1.4.1.20006.1.3.1.17";

/// Compares two dotted OIDs as the integers obtained by removing all the dots.
///
/// This is NOT the per-arc OID ordering: `1.30.1` (1301) comes before `1.3.10` (1310).
/// The digits are compared as strings, so OIDs of any length are supported.
pub fn compare_concatenated_oids(first: &str, second: &str) -> Ordering {
    let first = concatenated_digits(first);
    let second = concatenated_digits(second);
    first.len().cmp(&second.len()).then_with(|| first.cmp(&second))
}

fn concatenated_digits(oid: &str) -> String {
    let digits: String = oid.chars().filter(|c| *c != '.').collect();
    digits.trim_start_matches('0').to_owned()
}
