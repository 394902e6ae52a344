use crate::config::SenderConfig;
use crate::transport::TrapTransport;
use crate::trap::{NagiosTrap, Varbind, VarbindValue};
use async_snmp::message::CommunityMessage;
use async_snmp::{Oid, Pdu, PduType, Value, VarBind};
use log::*;
use nagtrap_common_api::TrapError;
use std::fmt;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::UdpSocket;

/// Builds a new, not yet opened, session for every trap.
pub type SessionFactory = Box<dyn Fn() -> Box<dyn SnmpSession>>;

/// A SNMP v2c session towards a trap receiver.
#[async_trait::async_trait(?Send)]
pub trait SnmpSession {
    async fn open(&mut self, destination: &str, port: u16) -> io::Result<()>;

    /// Sends one encoded SNMP message.
    async fn notify(&mut self, message: &[u8]) -> io::Result<()>;

    /// Releases the session. Called after every send, whether it succeeded or not.
    fn close(&mut self);
}

/// Sends the trap with the SNMP v2c client compiled into nagtrap.
pub struct NativeSnmpTransport {
    enabled: bool,
    community: String,
    port: u16,
    timeout: Duration,
    new_session: SessionFactory,
}

impl NativeSnmpTransport {
    pub fn new(config: &SenderConfig) -> NativeSnmpTransport {
        NativeSnmpTransport::with_session_factory(
            config,
            Box::new(|| Box::new(UdpSnmpSession::default())),
        )
    }

    pub fn with_session_factory(
        config: &SenderConfig,
        new_session: SessionFactory,
    ) -> NativeSnmpTransport {
        NativeSnmpTransport {
            enabled: config.native_snmp,
            community: config.community.clone(),
            port: config.trap_port,
            timeout: Duration::from_secs(config.timeout_secs),
            new_session,
        }
    }

    async fn open_and_notify(
        &self,
        session: &mut dyn SnmpSession,
        destination: &str,
        message: &[u8],
    ) -> io::Result<()> {
        session.open(destination, self.port).await?;
        session.notify(message).await
    }
}

impl fmt::Display for NativeSnmpTransport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NativeSnmpTransport [SNMP v2c, port {}]", self.port)
    }
}

#[async_trait::async_trait(?Send)]
impl TrapTransport for NativeSnmpTransport {
    fn is_available(&self) -> bool {
        self.enabled
    }

    async fn send(&self, trap: &NagiosTrap, destination: &str) -> Result<(), TrapError> {
        let varbinds = trap.varbinds();
        trace!("NativeSnmpTransport - sending varbinds to [{}]: {:?}", destination, varbinds);

        let request_id = rand::random::<i32>() & i32::MAX;
        let message = encode_trap_message(&self.community, request_id, &varbinds)?;

        let mut session = (self.new_session)();
        let result = tokio::time::timeout(
            self.timeout,
            self.open_and_notify(session.as_mut(), destination, &message),
        )
        .await;
        session.close();

        match result {
            Ok(Ok(())) => {
                debug!("NativeSnmpTransport - trap sent to [{}:{}]", destination, self.port);
                Ok(())
            }
            Ok(Err(err)) => Err(TrapError::TransportSendError {
                message: format!(
                    "Cannot send the SNMP trap to [{}:{}]: {}",
                    destination, self.port, err
                ),
                command: None,
            }),
            Err(_) => Err(TrapError::TransportSendError {
                message: format!(
                    "Timeout after {:?} sending the SNMP trap to [{}:{}]",
                    self.timeout, destination, self.port
                ),
                command: None,
            }),
        }
    }
}

/// Encodes a SNMPv2c message carrying a SNMPv2-Trap-PDU with the varbinds in the given order.
pub fn encode_trap_message(
    community: &str,
    request_id: i32,
    varbinds: &[Varbind],
) -> Result<Vec<u8>, TrapError> {
    let varbinds = varbinds.iter().map(to_snmp_varbind).collect::<Result<Vec<_>, _>>()?;
    let pdu = Pdu {
        pdu_type: PduType::TrapV2,
        request_id,
        error_status: 0,
        error_index: 0,
        varbinds,
    };
    Ok(CommunityMessage::v2c(community.to_owned(), pdu).encode().to_vec())
}

fn to_snmp_varbind(varbind: &Varbind) -> Result<VarBind, TrapError> {
    let value = match &varbind.value {
        VarbindValue::TimeTicks(ticks) => Value::TimeTicks(*ticks),
        VarbindValue::ObjectIdentifier(oid) => Value::ObjectIdentifier(parse_oid(oid)?),
        VarbindValue::OctetString(text) => Value::OctetString(text.clone().into()),
    };
    Ok(VarBind::new(parse_oid(&varbind.oid)?, value))
}

fn parse_oid(oid: &str) -> Result<Oid, TrapError> {
    let invalid_oid = |reason: String| TrapError::TransportSendError {
        message: format!("Invalid OID [{}]: {}", oid, reason),
        command: None,
    };
    let parsed = Oid::parse(oid).map_err(|err| invalid_oid(err.to_string()))?;
    if parsed.len() < 2 {
        return Err(invalid_oid("at least two arcs are required".to_owned()));
    }
    parsed.validate().map_err(|err| invalid_oid(err.to_string()))?;
    Ok(parsed)
}

/// A session over a UDP socket connected to the receiver.
#[derive(Default)]
pub struct UdpSnmpSession {
    socket: Option<UdpSocket>,
    target: Option<SocketAddr>,
}

#[async_trait::async_trait(?Send)]
impl SnmpSession for UdpSnmpSession {
    async fn open(&mut self, destination: &str, port: u16) -> io::Result<()> {
        let target = tokio::net::lookup_host((destination, port)).await?.next().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("No address found for [{}]", destination),
            )
        })?;
        let local_address = if target.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local_address).await?;
        socket.connect(target).await?;
        debug!("UdpSnmpSession - opened session towards [{}]", target);
        self.socket = Some(socket);
        self.target = Some(target);
        Ok(())
    }

    async fn notify(&mut self, message: &[u8]) -> io::Result<()> {
        let socket = self.socket.as_ref().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "The SNMP session is not open")
        })?;
        let sent = socket.send(message).await?;
        if sent != message.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                format!("Only {} of {} bytes sent", sent, message.len()),
            ));
        }
        Ok(())
    }

    fn close(&mut self) {
        if let Some(target) = self.target.take() {
            debug!("UdpSnmpSession - closing session towards [{}]", target);
        }
        self.socket = None;
    }
}

#[cfg(test)]
mod test {

    use super::*;
    use crate::oid::*;
    use async_snmp::Version;
    use nagtrap_common_api::{Event, ServiceState};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn trap() -> NagiosTrap {
        let event = Event::new(ServiceState::Warning, "Generic Service", "Something happened", None);
        NagiosTrap::build(&event, "host.example.com", 1_600_000_000, 100)
    }

    fn config(port: u16, native_snmp: bool) -> SenderConfig {
        SenderConfig { trap_port: port, native_snmp, timeout_secs: 2, ..Default::default() }
    }

    fn decode(datagram: Vec<u8>) -> CommunityMessage {
        CommunityMessage::decode(datagram.into()).unwrap()
    }

    #[derive(Default)]
    struct SessionCalls {
        opened: Vec<(String, u16)>,
        notified: usize,
        closed: usize,
    }

    struct FakeSession {
        fail_notify: bool,
        calls: Rc<RefCell<SessionCalls>>,
    }

    #[async_trait::async_trait(?Send)]
    impl SnmpSession for FakeSession {
        async fn open(&mut self, destination: &str, port: u16) -> io::Result<()> {
            self.calls.borrow_mut().opened.push((destination.to_owned(), port));
            Ok(())
        }

        async fn notify(&mut self, _message: &[u8]) -> io::Result<()> {
            self.calls.borrow_mut().notified += 1;
            if self.fail_notify {
                Err(io::Error::new(io::ErrorKind::ConnectionRefused, "receiver refused the trap"))
            } else {
                Ok(())
            }
        }

        fn close(&mut self) {
            self.calls.borrow_mut().closed += 1;
        }
    }

    fn fake_transport(fail_notify: bool, calls: &Rc<RefCell<SessionCalls>>) -> NativeSnmpTransport {
        let calls = calls.clone();
        NativeSnmpTransport::with_session_factory(
            &config(162, true),
            Box::new(move || Box::new(FakeSession { fail_notify, calls: calls.clone() })),
        )
    }

    #[test]
    fn should_be_unavailable_if_disabled() {
        let transport = NativeSnmpTransport::new(&config(162, false));
        assert!(!transport.is_available());
    }

    #[test]
    fn should_be_available_if_enabled() {
        let transport = NativeSnmpTransport::new(&config(162, true));
        assert!(transport.is_available());
    }

    #[test]
    fn should_encode_a_v2c_trap_message() {
        // Act
        let datagram = encode_trap_message("public", 42, &trap().varbinds()).unwrap();

        // Assert
        let message = decode(datagram);
        assert_eq!(Version::V2c, message.version);
        assert_eq!(&b"public"[..], &message.community[..]);

        let pdu = message.into_pdu();
        assert_eq!(PduType::TrapV2, pdu.pdu_type);
        assert_eq!(42, pdu.request_id);
        assert_eq!(0, pdu.error_status);
        assert_eq!(0, pdu.error_index);
        assert_eq!(12, pdu.varbinds.len());

        assert_eq!(Oid::parse(SYS_UPTIME_OID).unwrap(), pdu.varbinds[0].oid);
        assert_eq!(Value::TimeTicks(100), pdu.varbinds[0].value);
        assert_eq!(Oid::parse(SNMP_TRAP_OID).unwrap(), pdu.varbinds[1].oid);
        assert_eq!(
            Value::ObjectIdentifier(Oid::parse(NAGIOS_SERVICE_EVENT_OID).unwrap()),
            pdu.varbinds[1].value
        );
        assert_eq!(Oid::parse(SVC_HOSTNAME_OID).unwrap(), pdu.varbinds[2].oid);
        assert_eq!(Some("host.example.com"), pdu.varbinds[2].value.as_str());
        assert_eq!(Some("1"), pdu.varbinds[5].value.as_str());
        assert_eq!(Oid::parse(SVC_OUTPUT_OID).unwrap(), pdu.varbinds[11].oid);
        assert_eq!(Some("Something happened"), pdu.varbinds[11].value.as_str());
    }

    #[test]
    fn should_reject_invalid_oids() {
        for oid in &["", "1", "1.3.six", "3.1", "1.40"] {
            let varbinds = vec![Varbind::string(*oid, "value")];
            assert!(
                matches!(
                    encode_trap_message("public", 1, &varbinds),
                    Err(TrapError::TransportSendError { .. })
                ),
                "OID [{}] should be rejected",
                oid
            );
        }
    }

    #[tokio::test]
    async fn should_close_the_session_after_a_successful_send() {
        let calls = Rc::new(RefCell::new(SessionCalls::default()));
        let transport = fake_transport(false, &calls);

        transport.send(&trap(), "192.0.2.5").await.unwrap();

        let calls = calls.borrow();
        assert_eq!(vec![("192.0.2.5".to_owned(), 162)], calls.opened);
        assert_eq!(1, calls.notified);
        assert_eq!(1, calls.closed);
    }

    #[tokio::test]
    async fn should_close_the_session_and_fail_if_notify_fails() {
        // Arrange
        let calls = Rc::new(RefCell::new(SessionCalls::default()));
        let transport = fake_transport(true, &calls);

        // Act
        let result = transport.send(&trap(), "192.0.2.5").await;

        // Assert
        match result {
            Err(TrapError::TransportSendError { message, command }) => {
                assert!(message.contains("192.0.2.5:162"));
                assert!(message.contains("receiver refused the trap"));
                assert!(command.is_none());
            }
            other => panic!("Expected TransportSendError, got {:?}", other),
        }
        assert_eq!(1, calls.borrow().closed);
    }

    #[tokio::test]
    async fn should_send_a_single_trap_datagram() {
        // Arrange
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let port = receiver.local_addr().unwrap().port();
        let transport = NativeSnmpTransport::new(&config(port, true));

        // Act
        transport.send(&trap(), "127.0.0.1").await.unwrap();

        // Assert
        let mut buffer = vec![0u8; 65535];
        let (received, _) = receiver.recv_from(&mut buffer).await.unwrap();
        let pdu = decode(buffer[..received].to_vec()).into_pdu();
        assert_eq!(PduType::TrapV2, pdu.pdu_type);
        assert_eq!(Some("Generic Service"), pdu.varbinds[4].value.as_str());
    }

    #[tokio::test]
    async fn should_fail_if_the_destination_cannot_be_resolved() {
        let transport = NativeSnmpTransport::new(&config(162, true));

        let result = transport.send(&trap(), "not a valid host name..invalid").await;

        match result {
            Err(TrapError::TransportSendError { message, command }) => {
                assert!(message.contains("not a valid host name..invalid"));
                assert!(command.is_none());
            }
            other => panic!("Expected TransportSendError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn udp_session_should_refuse_to_notify_before_open() {
        let mut session = UdpSnmpSession::default();

        let result = session.notify(&[0x30, 0x00]).await;

        assert_eq!(io::ErrorKind::NotConnected, result.unwrap_err().kind());
    }
}
