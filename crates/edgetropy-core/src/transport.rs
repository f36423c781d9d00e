//! Datagram distribution of raw timing deltas.
//!
//! A producer reads edges from an [`EdgeSource`], emits the delta to the
//! previous edge on its output sink, and optionally broadcasts each
//! observation as a 20-byte [`TimingPacket`] over a [`DatagramChannel`]. A
//! receiver does the reverse: decode incoming datagrams and emit their
//! deltas. Three operating modes, selected at start and never switched at
//! runtime: produce locally, produce + broadcast, or receive.
//!
//! Both loops are single-threaded and cooperative. Cancellation is a shared
//! flag ([`CancelToken`]) checked once per iteration at the event-wait
//! boundary. An in-flight blocking wait is drained, never preempted, so
//! callers must tolerate up to one wait interval of latency on shutdown.

use std::io::{self, ErrorKind, Write};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::error::TransportError;
use crate::packet::TimingPacket;
use crate::source::{EdgeSource, EdgeWait};

/// Receive buffer size. Larger than [`WIRE_SIZE`](crate::packet::WIRE_SIZE)
/// so oversized datagrams are observed at their real length (up to this
/// bound) and rejected, instead of being truncated into a valid-looking
/// packet.
const RECV_BUFFER_SIZE: usize = 64;

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

/// Shared cancellation flag for the distribution loops.
///
/// Clones observe the same flag. Setting it is advisory: loops notice at
/// their next iteration boundary.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Run context
// ---------------------------------------------------------------------------

/// How deltas are written to the output sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One decimal delta per line.
    #[default]
    Lines,
    /// One JSON object per line with timestamp, delta, and sequence.
    Json,
}

/// Explicit per-run state handed to the loop functions; there is no
/// process-wide configuration.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub cancel: CancelToken,
    /// Upper bound on one edge wait; also the cancellation check interval.
    pub edge_timeout: Duration,
    pub format: OutputFormat,
}

impl RunContext {
    pub fn new(cancel: CancelToken) -> Self {
        Self {
            cancel,
            edge_timeout: Duration::from_secs(1),
            format: OutputFormat::Lines,
        }
    }
}

// ---------------------------------------------------------------------------
// Datagram channel
// ---------------------------------------------------------------------------

/// Outcome of one receive call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recv {
    /// A datagram of `len` bytes landed in the buffer.
    Datagram {
        len: usize,
        from: Option<SocketAddr>,
    },
    /// The wait elapsed or was interrupted; re-enter the wait.
    TimedOut,
}

/// Minimal datagram capability the loops need: fire a record at the
/// configured peer, or pull the next record from anyone.
///
/// Socket creation, binding, and address-family selection belong to the
/// setup layer that constructs the channel.
pub trait DatagramChannel {
    fn send(&mut self, payload: &[u8]) -> Result<usize, TransportError>;
    fn recv(&mut self, buf: &mut [u8]) -> Result<Recv, TransportError>;
}

/// UDP-backed [`DatagramChannel`].
pub struct UdpChannel {
    socket: UdpSocket,
    peer: Option<SocketAddr>,
}

impl UdpChannel {
    /// Channel for a producer: bind an ephemeral local port matching the
    /// destination's address family. IPv4 destinations get `SO_BROADCAST`
    /// so subnet broadcast addresses work; IPv6 reaches groups via
    /// multicast addresses and needs no flag.
    pub fn producer(dest: SocketAddr) -> io::Result<Self> {
        let bind = match dest {
            SocketAddr::V4(_) => SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            SocketAddr::V6(_) => SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), 0),
        };
        let socket = UdpSocket::bind(bind)?;
        if dest.is_ipv4() {
            socket.set_broadcast(true)?;
        }
        Ok(Self {
            socket,
            peer: Some(dest),
        })
    }

    /// Channel for a receiver: bind `addr` and apply an optional read
    /// timeout so the receive loop can observe cancellation while idle.
    pub fn receiver(addr: SocketAddr, read_timeout: Option<Duration>) -> io::Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        socket.set_read_timeout(read_timeout)?;
        Ok(Self { socket, peer: None })
    }

    /// Local address the socket actually bound to.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl DatagramChannel for UdpChannel {
    fn send(&mut self, payload: &[u8]) -> Result<usize, TransportError> {
        let Some(peer) = self.peer else {
            return Err(TransportError::Channel(io::Error::new(
                ErrorKind::NotConnected,
                "channel has no destination configured",
            )));
        };
        Ok(self.socket.send_to(payload, peer)?)
    }

    fn recv(&mut self, buf: &mut [u8]) -> Result<Recv, TransportError> {
        match self.socket.recv_from(buf) {
            Ok((len, from)) => Ok(Recv::Datagram {
                len,
                from: Some(from),
            }),
            Err(e)
                if matches!(
                    e.kind(),
                    ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
                ) =>
            {
                Ok(Recv::TimedOut)
            }
            Err(e) => Err(TransportError::Channel(e)),
        }
    }
}

// ---------------------------------------------------------------------------
// Loop statistics
// ---------------------------------------------------------------------------

/// Counters reported by a finished producer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProducerStats {
    /// Edges observed, including the baseline edge.
    pub edges: u64,
    /// Deltas written to the output sink.
    pub deltas_emitted: u64,
    /// Packets handed to the channel successfully.
    pub packets_sent: u64,
    /// Sends that failed and were skipped.
    pub send_failures: u64,
}

/// Counters reported by a finished receiver run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReceiverStats {
    /// Valid packets decoded and emitted.
    pub packets: u64,
    /// Datagrams discarded for having the wrong size.
    pub dropped: u64,
}

// ---------------------------------------------------------------------------
// Producer loop
// ---------------------------------------------------------------------------

/// Read edges from `source` until cancelled, writing each inter-arrival
/// delta to `out` and, when `channel` is present, broadcasting it as a
/// [`TimingPacket`].
///
/// The first edge only establishes the baseline and emits nothing. The
/// sequence counter starts at 0, increments per observation, and wraps.
/// Send failures are logged and counted but never stop the loop; delta
/// output continues regardless of network health. Source failures and sink
/// failures end the run.
pub fn run_producer(
    ctx: &RunContext,
    source: &mut dyn EdgeSource,
    mut channel: Option<&mut dyn DatagramChannel>,
    out: &mut dyn Write,
) -> Result<ProducerStats, TransportError> {
    let mut stats = ProducerStats::default();
    let mut last_ts: Option<u64> = None;
    let mut sequence: u32 = 0;

    while !ctx.cancel.is_cancelled() {
        let ts = match source.wait_next_edge(ctx.edge_timeout)? {
            EdgeWait::Edge(ts) => ts,
            EdgeWait::Timeout => continue,
        };
        stats.edges += 1;

        let Some(prev) = last_ts.replace(ts) else {
            continue;
        };

        let packet = TimingPacket {
            timestamp_ns: ts,
            delta_ns: ts.saturating_sub(prev),
            sequence,
        };
        sequence = sequence.wrapping_add(1);

        write_observation(out, ctx.format, &packet).map_err(TransportError::Sink)?;
        stats.deltas_emitted += 1;

        if let Some(channel) = channel.as_mut() {
            match channel.send(&packet.encode()) {
                Ok(_) => {
                    stats.packets_sent += 1;
                    log::debug!(
                        "sent packet {}: delta={} ns",
                        packet.sequence,
                        packet.delta_ns
                    );
                }
                Err(e) => {
                    stats.send_failures += 1;
                    log::warn!("failed to send packet {}: {e}", packet.sequence);
                }
            }
        }
    }

    Ok(stats)
}

// ---------------------------------------------------------------------------
// Receiver loop
// ---------------------------------------------------------------------------

/// Pull datagrams from `channel` until cancelled, writing each decoded delta
/// to `out`.
///
/// A datagram whose length is not exactly
/// [`WIRE_SIZE`](crate::packet::WIRE_SIZE) is logged, counted, and
/// discarded; the loop continues. Timed-out and interrupted waits
/// re-enter the wait. Any other channel failure ends the run.
pub fn run_receiver(
    ctx: &RunContext,
    channel: &mut dyn DatagramChannel,
    out: &mut dyn Write,
) -> Result<ReceiverStats, TransportError> {
    let mut stats = ReceiverStats::default();
    let mut buf = [0u8; RECV_BUFFER_SIZE];

    while !ctx.cancel.is_cancelled() {
        let (len, from) = match channel.recv(&mut buf)? {
            Recv::Datagram { len, from } => (len, from),
            Recv::TimedOut => continue,
        };

        let packet = match TimingPacket::decode(&buf[..len]) {
            Ok(packet) => packet,
            Err(e) => {
                stats.dropped += 1;
                log::warn!("dropping datagram: {e}");
                continue;
            }
        };

        write_observation(out, ctx.format, &packet).map_err(TransportError::Sink)?;
        stats.packets += 1;

        if let Some(addr) = from {
            log::debug!(
                "received packet {} from {addr}: delta={} ns",
                packet.sequence,
                packet.delta_ns
            );
        }
    }

    Ok(stats)
}

fn write_observation(
    out: &mut dyn Write,
    format: OutputFormat,
    packet: &TimingPacket,
) -> io::Result<()> {
    match format {
        OutputFormat::Lines => writeln!(out, "{}", packet.delta_ns)?,
        OutputFormat::Json => {
            let line = serde_json::to_string(packet).map_err(io::Error::other)?;
            writeln!(out, "{line}")?;
        }
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::WIRE_SIZE;
    use crate::sources::SyntheticEdgeSource;
    use std::collections::VecDeque;

    /// In-memory channel: records sends, replays scripted datagrams, and
    /// cancels a token once the script drains.
    struct ScriptedChannel {
        incoming: VecDeque<Vec<u8>>,
        sent: Vec<Vec<u8>>,
        fail_sends: bool,
        on_drained: Option<CancelToken>,
    }

    impl ScriptedChannel {
        fn sender(fail_sends: bool) -> Self {
            Self {
                incoming: VecDeque::new(),
                sent: Vec::new(),
                fail_sends,
                on_drained: None,
            }
        }

        fn replaying<I: IntoIterator<Item = Vec<u8>>>(datagrams: I, token: CancelToken) -> Self {
            Self {
                incoming: datagrams.into_iter().collect(),
                sent: Vec::new(),
                fail_sends: false,
                on_drained: Some(token),
            }
        }
    }

    impl DatagramChannel for ScriptedChannel {
        fn send(&mut self, payload: &[u8]) -> Result<usize, TransportError> {
            if self.fail_sends {
                return Err(TransportError::Channel(io::Error::new(
                    ErrorKind::NetworkUnreachable,
                    "scripted failure",
                )));
            }
            self.sent.push(payload.to_vec());
            Ok(payload.len())
        }

        fn recv(&mut self, buf: &mut [u8]) -> Result<Recv, TransportError> {
            match self.incoming.pop_front() {
                Some(datagram) => {
                    let len = datagram.len().min(buf.len());
                    buf[..len].copy_from_slice(&datagram[..len]);
                    Ok(Recv::Datagram { len, from: None })
                }
                None => {
                    if let Some(token) = &self.on_drained {
                        token.cancel();
                    }
                    Ok(Recv::TimedOut)
                }
            }
        }
    }

    fn ctx_with_token() -> (RunContext, CancelToken) {
        let token = CancelToken::new();
        (RunContext::new(token.clone()), token)
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn producer_first_edge_emits_nothing() {
        let (ctx, token) = ctx_with_token();
        let mut source =
            SyntheticEdgeSource::from_timestamps([1000]).cancel_when_exhausted(token);
        let mut out = Vec::new();

        let stats = run_producer(&ctx, &mut source, None, &mut out).unwrap();
        assert_eq!(stats.edges, 1);
        assert_eq!(stats.deltas_emitted, 0);
        assert!(out.is_empty());
    }

    #[test]
    fn producer_emits_deltas_after_baseline() {
        let (ctx, token) = ctx_with_token();
        let mut source =
            SyntheticEdgeSource::from_timestamps([100, 150, 375]).cancel_when_exhausted(token);
        let mut out = Vec::new();

        let stats = run_producer(&ctx, &mut source, None, &mut out).unwrap();
        assert_eq!(stats.edges, 3);
        assert_eq!(stats.deltas_emitted, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "50\n225\n");
    }

    #[test]
    fn producer_broadcasts_sequenced_packets() {
        let (ctx, token) = ctx_with_token();
        let mut source =
            SyntheticEdgeSource::from_timestamps([100, 150, 375]).cancel_when_exhausted(token);
        let mut channel = ScriptedChannel::sender(false);
        let mut out = Vec::new();

        let stats = run_producer(&ctx, &mut source, Some(&mut channel), &mut out).unwrap();
        assert_eq!(stats.packets_sent, 2);
        assert_eq!(stats.send_failures, 0);

        let first = TimingPacket::decode(&channel.sent[0]).unwrap();
        let second = TimingPacket::decode(&channel.sent[1]).unwrap();
        assert_eq!(
            first,
            TimingPacket {
                timestamp_ns: 150,
                delta_ns: 50,
                sequence: 0,
            }
        );
        assert_eq!(
            second,
            TimingPacket {
                timestamp_ns: 375,
                delta_ns: 225,
                sequence: 1,
            }
        );
    }

    #[test]
    fn producer_survives_send_failures() {
        let (ctx, token) = ctx_with_token();
        let mut source =
            SyntheticEdgeSource::from_timestamps([10, 20, 30, 40]).cancel_when_exhausted(token);
        let mut channel = ScriptedChannel::sender(true);
        let mut out = Vec::new();

        let stats = run_producer(&ctx, &mut source, Some(&mut channel), &mut out).unwrap();
        assert_eq!(stats.send_failures, 3);
        assert_eq!(stats.packets_sent, 0);
        // Delta output keeps flowing regardless of network health.
        assert_eq!(String::from_utf8(out).unwrap(), "10\n10\n10\n");
    }

    #[test]
    fn producer_json_output_lines() {
        let (mut ctx, token) = ctx_with_token();
        ctx.format = OutputFormat::Json;
        let mut source =
            SyntheticEdgeSource::from_timestamps([5, 12]).cancel_when_exhausted(token);
        let mut out = Vec::new();

        run_producer(&ctx, &mut source, None, &mut out).unwrap();
        let line = String::from_utf8(out).unwrap();
        let parsed: TimingPacket = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(
            parsed,
            TimingPacket {
                timestamp_ns: 12,
                delta_ns: 7,
                sequence: 0,
            }
        );
    }

    #[test]
    fn producer_cancelled_before_start_does_nothing() {
        let (ctx, token) = ctx_with_token();
        token.cancel();
        let mut source = SyntheticEdgeSource::from_timestamps([1, 2, 3]);
        let mut out = Vec::new();

        let stats = run_producer(&ctx, &mut source, None, &mut out).unwrap();
        assert_eq!(stats, ProducerStats::default());
        assert_eq!(source.remaining(), 3);
    }

    #[test]
    fn receiver_decodes_valid_packets() {
        let (ctx, token) = ctx_with_token();
        let packets = [
            TimingPacket {
                timestamp_ns: 1000,
                delta_ns: 111,
                sequence: 0,
            },
            TimingPacket {
                timestamp_ns: 2000,
                delta_ns: 222,
                sequence: 1,
            },
        ];
        let datagrams = packets.iter().map(|p| p.encode().to_vec());
        let mut channel = ScriptedChannel::replaying(datagrams, token);
        let mut out = Vec::new();

        let stats = run_receiver(&ctx, &mut channel, &mut out).unwrap();
        assert_eq!(stats.packets, 2);
        assert_eq!(stats.dropped, 0);
        assert_eq!(String::from_utf8(out).unwrap(), "111\n222\n");
    }

    #[test]
    fn receiver_drops_wrong_size_datagrams() {
        let (ctx, token) = ctx_with_token();
        let valid = TimingPacket {
            timestamp_ns: 500,
            delta_ns: 77,
            sequence: 9,
        };
        let datagrams = vec![
            vec![0u8; 5],
            valid.encode().to_vec(),
            vec![0u8; WIRE_SIZE + 1],
        ];
        let mut channel = ScriptedChannel::replaying(datagrams, token);
        let mut out = Vec::new();

        let stats = run_receiver(&ctx, &mut channel, &mut out).unwrap();
        assert_eq!(stats.packets, 1);
        assert_eq!(stats.dropped, 2);
        assert_eq!(String::from_utf8(out).unwrap(), "77\n");
    }

    #[test]
    fn udp_producer_channel_requires_destination_for_send() {
        let mut channel = UdpChannel::receiver(
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
            Some(Duration::from_millis(10)),
        )
        .unwrap();
        assert!(channel.send(&[0u8; WIRE_SIZE]).is_err());
    }

    #[test]
    fn udp_receiver_times_out_when_idle() {
        let mut channel = UdpChannel::receiver(
            SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 0),
            Some(Duration::from_millis(10)),
        )
        .unwrap();
        let mut buf = [0u8; RECV_BUFFER_SIZE];
        assert_eq!(channel.recv(&mut buf).unwrap(), Recv::TimedOut);
    }
}
