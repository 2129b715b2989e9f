//! PES (Packetized Elementary Stream) reassembly.
//!
//! IGS segments are carried as bounded PES packets: the header declares the
//! payload length, and the payload's first byte is the segment tag. A
//! segment may span many transport packets; the assembler accumulates
//! fragments and releases the previous payload when a new payload unit
//! starts, after verifying it consumed exactly the declared length.

use tracing::warn;

use crate::error::{Result, TsError};

/// PES start code prefix value (0x00 0x00 0x01).
pub const PES_START_CODE_PREFIX: u32 = 0x000001;

/// Fixed PES header bytes before the optional header: start code (3),
/// stream id (1), packet length (2), flags (2), header data length (1).
const PES_FIXED_HEADER: usize = 9;

/// Reassembles one elementary stream's PES payloads from transport packet
/// fragments.
#[derive(Debug, Default)]
pub struct PesAssembler {
    /// Accumulated payload, segment tag byte first.
    buffer: Vec<u8>,
    /// Payload length declared by the in-flight packet's header.
    declared: usize,
    /// Whether a payload unit is in flight.
    started: bool,
}

impl PesAssembler {
    /// Create a new assembler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard any in-flight payload.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.declared = 0;
        self.started = false;
    }

    /// Feed one transport packet payload.
    ///
    /// When `pusi` is set, the previous payload (if any) is validated
    /// against its declared length and returned complete; the new packet's
    /// PES header is then consumed so the buffer starts at the segment tag
    /// byte.
    pub fn add(&mut self, payload: &[u8], pusi: bool) -> Result<Option<Vec<u8>>> {
        if !pusi {
            if self.started {
                self.buffer.extend_from_slice(payload);
            }
            return Ok(None);
        }

        let completed = self.take_completed()?;

        if payload.len() < PES_FIXED_HEADER {
            return Err(TsError::invalid_pes("Payload too short for PES header"));
        }

        let prefix = ((payload[0] as u32) << 16) | ((payload[1] as u32) << 8) | (payload[2] as u32);
        if prefix != PES_START_CODE_PREFIX {
            return Err(TsError::InvalidStartCode(prefix));
        }

        let packet_length = (((payload[4] as usize) << 8) | (payload[5] as usize)) as usize;
        let header_data_length = payload[8] as usize;

        // Declared payload length: packet_length counts everything after the
        // 6-byte prefix, minus the 3 flag bytes and the optional header.
        self.declared = packet_length
            .checked_sub(3 + header_data_length)
            .ok_or_else(|| TsError::invalid_pes("PES packet length smaller than its header"))?;

        let data_start = PES_FIXED_HEADER + header_data_length;
        if data_start > payload.len() {
            return Err(TsError::invalid_pes("PES header data exceeds payload"));
        }

        self.buffer.clear();
        self.buffer.extend_from_slice(&payload[data_start..]);
        self.started = true;

        Ok(completed)
    }

    /// Release the in-flight payload at end of stream.
    ///
    /// A payload matching its declared length is returned; a partial one is
    /// dropped with a warning since nothing further can complete it.
    pub fn flush(&mut self) -> Option<Vec<u8>> {
        if !self.started {
            return None;
        }
        self.started = false;
        if self.buffer.len() == self.declared {
            Some(std::mem::take(&mut self.buffer))
        } else {
            warn!(
                declared = self.declared,
                assembled = self.buffer.len(),
                "Dropping incomplete PES payload at end of stream"
            );
            self.buffer.clear();
            None
        }
    }

    /// Whether a payload unit is currently being assembled.
    pub fn is_started(&self) -> bool {
        self.started
    }

    fn take_completed(&mut self) -> Result<Option<Vec<u8>>> {
        if !self.started {
            return Ok(None);
        }
        if self.buffer.len() != self.declared {
            return Err(TsError::PesLengthMismatch {
                declared: self.declared,
                actual: self.buffer.len(),
            });
        }
        self.started = false;
        Ok(Some(std::mem::take(&mut self.buffer)))
    }
}

/// Build a bounded PES payload around segment bytes (tag byte included in
/// `segment`). Used by tests and synthetic stream tooling.
pub fn build_pes(segment: &[u8]) -> Vec<u8> {
    let packet_length = segment.len() + 3; // flags (2) + header data length (1)
    let mut pes = Vec::with_capacity(PES_FIXED_HEADER + segment.len());
    pes.extend_from_slice(&[0x00, 0x00, 0x01]);
    pes.push(0xBD); // private stream 1
    pes.extend_from_slice(&(packet_length as u16).to_be_bytes());
    pes.push(0x80); // marker bits
    pes.push(0x00); // no PTS/DTS
    pes.push(0x00); // header data length
    pes.extend_from_slice(segment);
    pes
}
