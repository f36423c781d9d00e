//! Wire codec for the fixed-size timing packet.
//!
//! A packet carries one edge observation from a producer to any number of
//! consumers: the absolute event timestamp, the delta to the previous event,
//! and a per-producer sequence counter. The wire image is exactly
//! [`WIRE_SIZE`] bytes, big-endian, fields in declaration order. Any
//! datagram of a different length is a framing error.

use serde::{Deserialize, Serialize};

use crate::error::PacketError;

/// Fixed wire size of an encoded [`TimingPacket`]: 8 + 8 + 4 bytes.
pub const WIRE_SIZE: usize = 20;

/// One edge-timing observation as sent over the datagram channel.
///
/// `sequence` starts at 0 for each producer, increments per packet, and
/// wraps at `u32::MAX`. Consumers do not deduplicate or reorder; delivery
/// order is whatever the transport provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingPacket {
    pub timestamp_ns: u64,
    pub delta_ns: u64,
    pub sequence: u32,
}

impl TimingPacket {
    /// Serialize to the 20-byte big-endian wire image.
    pub fn encode(&self) -> [u8; WIRE_SIZE] {
        let mut buf = [0u8; WIRE_SIZE];
        buf[0..8].copy_from_slice(&self.timestamp_ns.to_be_bytes());
        buf[8..16].copy_from_slice(&self.delta_ns.to_be_bytes());
        buf[16..20].copy_from_slice(&self.sequence.to_be_bytes());
        buf
    }

    /// Deserialize from a buffer that must be exactly [`WIRE_SIZE`] bytes.
    pub fn decode(bytes: &[u8]) -> Result<Self, PacketError> {
        if bytes.len() != WIRE_SIZE {
            return Err(PacketError::InvalidSize {
                actual: bytes.len(),
                expected: WIRE_SIZE,
            });
        }

        let mut timestamp = [0u8; 8];
        let mut delta = [0u8; 8];
        let mut sequence = [0u8; 4];
        timestamp.copy_from_slice(&bytes[0..8]);
        delta.copy_from_slice(&bytes[8..16]);
        sequence.copy_from_slice(&bytes[16..20]);

        Ok(Self {
            timestamp_ns: u64::from_be_bytes(timestamp),
            delta_ns: u64::from_be_bytes(delta),
            sequence: u32::from_be_bytes(sequence),
        })
    }
}
