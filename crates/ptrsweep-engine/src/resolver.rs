//! Resolver client contract and its plain-UDP implementation.
//!
//! The engine never touches DNS wire format; it hands a query name and
//! a nameserver address to a [`ResolverClient`] and classifies whatever
//! comes back. [`UdpResolver`] is the production implementation; tests
//! substitute scripted ones.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use hickory_proto::op::{Message, MessageType, OpCode, Query, ResponseCode};
use hickory_proto::rr::{Name, RData, RecordType};
use hickory_proto::serialize::binary::{BinDecodable, BinEncodable};
use tokio::net::UdpSocket;

use ptrsweep_core::{PtrRecord, PtrResponse, ResponseStatus};

pub use ptrsweep_core::TransportError;

/// Default deadline for one exchange attempt.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Receive buffer size; standard UDP DNS answers fit comfortably.
const RECV_BUF_LEN: usize = 4096;

/// One query/response exchange against a chosen nameserver.
///
/// Implementations own message encoding, decoding and transport; the
/// engine only consumes the classified [`PtrResponse`]. A transport
/// error means "no usable response", never "the name does not exist".
#[async_trait]
pub trait ResolverClient: Send + Sync {
    /// Send a PTR query for `query` to `nameserver` and return the
    /// parsed response.
    async fn exchange(
        &self,
        query: &str,
        nameserver: SocketAddr,
    ) -> Result<PtrResponse, TransportError>;
}

/// Plain UDP resolver client built on hickory-proto.
///
/// One ephemeral socket per exchange; responses are matched on message
/// ID and stray datagrams are ignored until the deadline expires.
#[derive(Debug, Clone)]
pub struct UdpResolver {
    timeout: Duration,
}

impl Default for UdpResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl UdpResolver {
    /// Create a resolver with the default exchange deadline.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Create a resolver with a custom per-exchange deadline.
    #[must_use]
    pub const fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl ResolverClient for UdpResolver {
    async fn exchange(
        &self,
        query: &str,
        nameserver: SocketAddr,
    ) -> Result<PtrResponse, TransportError> {
        let name =
            Name::from_ascii(query).map_err(|e| TransportError::Proto(e.to_string()))?;

        let id: u16 = rand::random();
        let mut message = Message::new();
        message
            .set_id(id)
            .set_message_type(MessageType::Query)
            .set_op_code(OpCode::Query)
            .set_recursion_desired(true)
            .add_query(Query::query(name, RecordType::PTR));
        let bytes = message
            .to_bytes()
            .map_err(|e| TransportError::Proto(e.to_string()))?;

        let bind_addr: SocketAddr = if nameserver.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(bind_addr).await?;
        socket.connect(nameserver).await?;
        socket.send(&bytes).await?;

        let response = tokio::time::timeout(self.timeout, async {
            let mut buf = [0u8; RECV_BUF_LEN];
            loop {
                let len = socket.recv(&mut buf).await?;
                match Message::from_bytes(&buf[..len]) {
                    Ok(m) if m.id() == id => return Ok::<Message, TransportError>(m),
                    // Stray or unparseable datagram: keep waiting for ours.
                    _ => {}
                }
            }
        })
        .await
        .map_err(|_| TransportError::Timeout(self.timeout))??;

        classify(&response)
    }
}

/// Map a wire message onto the engine's response contract.
///
/// A truncated answer is unusable: its answer section is incomplete, so
/// passing it on would misclassify the level. It fails the attempt
/// instead (a later attempt may reach a server that fits the answer).
fn classify(message: &Message) -> Result<PtrResponse, TransportError> {
    if message.truncated() {
        return Err(TransportError::Proto("response truncated".into()));
    }

    let status = match message.response_code() {
        ResponseCode::NoError => ResponseStatus::Success,
        ResponseCode::NXDomain => ResponseStatus::NameError,
        other => ResponseStatus::Other(u16::from(other)),
    };

    let records = message
        .answers()
        .iter()
        .filter_map(|record| match record.data() {
            RData::PTR(ptr) => Some(PtrRecord {
                name: record.name().to_string(),
                hostname: ptr.0.to_string(),
                ttl: record.ttl(),
            }),
            _ => None,
        })
        .collect();

    Ok(PtrResponse { status, records })
}
