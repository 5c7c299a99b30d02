use serde::{Deserialize, Serialize};

/// Sentinel ping time reported when the backend has no measurement yet.
pub const PING_TIME_UNKNOWN: &str = "-1";

/// A remote node connection reported by the active backend.
///
/// Counters are kept as the decimal strings the backend returned so very large values survive
/// untouched; the `*_u128` helpers parse them on demand.
///
/// # Examples
///
/// ```
/// use ln_facade::Peer;
///
/// let peer: Peer = serde_json::from_str(
///     r#"{"pub_key":"03ab","address":"10.0.0.1:9735","ping_time":"-1","sat_sent":"42"}"#,
/// )
/// .unwrap();
/// assert_eq!(peer.ping_time_micros(), None);
/// assert_eq!(peer.sat_sent_u128(), Some(42));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Peer {
    /// Node public key, unique per node.
    pub pub_key: String,
    /// Network address, usually `host:port`.
    pub address: String,
    pub bytes_sent: String,
    pub bytes_recv: String,
    pub sat_sent: String,
    pub sat_recv: String,
    /// `true` when the remote side opened the connection.
    pub inbound: bool,
    /// Round-trip ping time in microseconds, or [`PING_TIME_UNKNOWN`].
    pub ping_time: String,
    /// Gossip sync type code.
    pub sync_type: String,
}

impl Peer {
    /// Peer record carrying only a public key.
    pub fn with_pub_key(pub_key: impl Into<String>) -> Self {
        Self {
            pub_key: pub_key.into(),
            ping_time: PING_TIME_UNKNOWN.to_string(),
            ..Self::default()
        }
    }

    /// Ping time, or `None` when unknown.
    #[must_use]
    pub fn ping_time_micros(&self) -> Option<i64> {
        match self.ping_time.trim().parse::<i64>() {
            Ok(v) if v >= 0 => Some(v),
            _ => None,
        }
    }

    #[must_use]
    pub fn bytes_sent_u128(&self) -> Option<u128> {
        parse_counter(&self.bytes_sent)
    }

    #[must_use]
    pub fn bytes_recv_u128(&self) -> Option<u128> {
        parse_counter(&self.bytes_recv)
    }

    #[must_use]
    pub fn sat_sent_u128(&self) -> Option<u128> {
        parse_counter(&self.sat_sent)
    }

    #[must_use]
    pub fn sat_recv_u128(&self) -> Option<u128> {
        parse_counter(&self.sat_recv)
    }
}

fn parse_counter(raw: &str) -> Option<u128> {
    raw.trim().parse().ok()
}
