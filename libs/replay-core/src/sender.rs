use std::io::Write;
use std::net::{TcpStream, UdpSocket};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ReplayError;
use crate::record::Record;
use crate::wire::{self, CrlxEncoder};

// ═══════════════════════════════════════════════════════════════
//  Protocol
// ═══════════════════════════════════════════════════════════════

/// Протокол доставки. Закрытый набор — по одной стратегии
/// encode+send на вариант, общий pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    Tcp,
    UdpBroadcast,
    UdpUnicast,
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "tcp"),
            Protocol::UdpBroadcast => write!(f, "udp_broadcast"),
            Protocol::UdpUnicast => write!(f, "udp_unicast"),
        }
    }
}

impl std::str::FromStr for Protocol {
    type Err = ReplayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tcp" => Ok(Protocol::Tcp),
            "udp_broadcast" => Ok(Protocol::UdpBroadcast),
            "udp_unicast" => Ok(Protocol::UdpUnicast),
            other => Err(ReplayError::validation(format!(
                "unsupported protocol: {other}"
            ))),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Pacing
// ═══════════════════════════════════════════════════════════════

/// Пауза между записями; `interval <= 0` — без задержки, записи
/// уходят подряд. Блокирует только поток своего job'а.
fn pace(interval: f64) {
    if interval > 0.0 {
        std::thread::sleep(Duration::from_secs_f64(interval));
    }
}

// ═══════════════════════════════════════════════════════════════
//  Reliable-stream sender (tcp)
// ═══════════════════════════════════════════════════════════════

/// Send every record as a JSON line over one TCP connection.
///
/// A single failed write aborts the whole job; records sent so far are
/// lost (partial send is not resumed). The connection is dropped on every
/// exit path.
pub fn send_tcp(
    host: &str,
    port: u16,
    records: &[Record],
    interval: f64,
) -> Result<u64, ReplayError> {
    let target = format!("{host}:{port}");
    let mut stream =
        TcpStream::connect(&target).map_err(|e| ReplayError::connection(&target, e))?;
    tracing::debug!(%target, "tcp connected");

    for record in records {
        let line = wire::json_line(record)?;
        stream
            .write_all(&line)
            .map_err(|e| ReplayError::connection(&target, e))?;
        pace(interval);
    }

    Ok(records.len() as u64)
}

// ═══════════════════════════════════════════════════════════════
//  Connectionless senders (udp_broadcast / udp_unicast)
// ═══════════════════════════════════════════════════════════════

/// Send every record as one CRLX-format datagram to `(addr, port)`.
///
/// One unbound socket per job; broadcast capability is enabled only for
/// the broadcast variant. Missing address or port fails fast before any
/// I/O; any send error aborts the job.
pub fn send_udp(
    addr: &str,
    port: u16,
    broadcast: bool,
    records: &[Record],
    encoder: &CrlxEncoder<'_>,
    interval: f64,
) -> Result<u64, ReplayError> {
    if addr.is_empty() {
        return Err(ReplayError::validation(if broadcast {
            "broadcast_addr is required for udp_broadcast"
        } else {
            "unicast_addr is required for udp_unicast"
        }));
    }
    if port == 0 {
        return Err(ReplayError::validation("port is required"));
    }

    let target = format!("{addr}:{port}");
    let socket =
        UdpSocket::bind(("0.0.0.0", 0)).map_err(|e| ReplayError::connection(&target, e))?;
    if broadcast {
        socket
            .set_broadcast(true)
            .map_err(|e| ReplayError::connection(&target, e))?;
    }

    for record in records {
        let line = encoder.encode(record)?;
        socket
            .send_to(line.as_bytes(), &target)
            .map_err(|e| ReplayError::connection(&target, e))?;
        pace(interval);
    }

    Ok(records.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn protocol_parses_known_names_only() {
        assert_eq!(Protocol::from_str("tcp").unwrap(), Protocol::Tcp);
        assert_eq!(Protocol::from_str("udp_broadcast").unwrap(), Protocol::UdpBroadcast);
        assert_eq!(Protocol::from_str("udp_unicast").unwrap(), Protocol::UdpUnicast);

        let err = Protocol::from_str("sctp").unwrap_err();
        assert!(matches!(err, ReplayError::Validation(_)));
        assert!(err.to_string().contains("sctp"));
    }

    #[test]
    fn protocol_display_round_trips() {
        for p in [Protocol::Tcp, Protocol::UdpBroadcast, Protocol::UdpUnicast] {
            assert_eq!(Protocol::from_str(&p.to_string()).unwrap(), p);
        }
    }

    #[test]
    fn tcp_connect_refused_is_a_connection_error() {
        // Reserved port with nothing listening
        let err = send_tcp("127.0.0.1", 1, &[], 0.0).unwrap_err();
        match err {
            ReplayError::Connection { target, .. } => assert_eq!(target, "127.0.0.1:1"),
            other => panic!("expected Connection, got {other:?}"),
        }
    }
}
