//! Transport packet parsing.
//!
//! A transport packet is 188 bytes: a 4-byte header, an optional adaptation
//! field, and payload. Blu-ray `.m2ts` files prepend a 4-byte copy
//! permission header to every packet, so on disc each unit is 192 bytes;
//! the demuxer's sync scan absorbs those extra bytes.

use crate::error::{Result, TsError};

/// Transport packet size in bytes.
pub const TS_PACKET_SIZE: usize = 188;

/// Largest framed packet size the sync scan tolerates (204-byte variants
/// carry trailing FEC data).
pub const MAX_PACKET_SIZE: usize = 204;

/// Transport packet sync byte.
pub const SYNC_BYTE: u8 = 0x47;

/// PAT (Program Association Table) PID.
pub const PID_PAT: u16 = 0x0000;

/// Null/stuffing packet PID.
pub const PID_NULL: u16 = 0x1FFF;

/// Adaptation field control values (2 bits in the packet header).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdaptationFieldControl {
    /// Reserved for future use.
    Reserved,
    /// Payload only.
    PayloadOnly,
    /// Adaptation field only, no payload.
    AdaptationFieldOnly,
    /// Adaptation field followed by payload.
    AdaptationFieldAndPayload,
}

impl AdaptationFieldControl {
    /// Parse from the 2-bit header field.
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0x03 {
            0 => AdaptationFieldControl::Reserved,
            1 => AdaptationFieldControl::PayloadOnly,
            2 => AdaptationFieldControl::AdaptationFieldOnly,
            3 => AdaptationFieldControl::AdaptationFieldAndPayload,
            _ => unreachable!(),
        }
    }

    /// Check if the packet carries payload bytes.
    pub fn has_payload(self) -> bool {
        matches!(
            self,
            AdaptationFieldControl::PayloadOnly | AdaptationFieldControl::AdaptationFieldAndPayload
        )
    }
}

/// Borrowed view over a single 188-byte transport packet.
#[derive(Debug, Clone, Copy)]
pub struct TsPacket<'a> {
    data: &'a [u8],
}

impl<'a> TsPacket<'a> {
    /// Create a packet view, validating size and sync byte.
    pub fn from_slice(data: &'a [u8]) -> Result<Self> {
        if data.len() < TS_PACKET_SIZE {
            return Err(TsError::PacketTooShort {
                expected: TS_PACKET_SIZE,
                actual: data.len(),
            });
        }
        if data[0] != SYNC_BYTE {
            return Err(TsError::SyncByteNotFound(0));
        }
        Ok(Self {
            data: &data[..TS_PACKET_SIZE],
        })
    }

    /// Raw packet bytes.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// 13-bit packet identifier.
    pub fn pid(&self) -> u16 {
        (((self.data[1] & 0x1F) as u16) << 8) | (self.data[2] as u16)
    }

    /// Payload unit start indicator: a new PES packet or PSI section begins
    /// in this packet.
    pub fn payload_unit_start(&self) -> bool {
        (self.data[1] & 0x40) != 0
    }

    /// Transport error indicator.
    pub fn transport_error(&self) -> bool {
        (self.data[1] & 0x80) != 0
    }

    /// Adaptation field control bits.
    pub fn adaptation_field_control(&self) -> AdaptationFieldControl {
        AdaptationFieldControl::from_bits((self.data[3] >> 4) & 0x03)
    }

    /// 4-bit continuity counter.
    pub fn continuity_counter(&self) -> u8 {
        self.data[3] & 0x0F
    }

    /// Payload bytes, skipping the adaptation field when present.
    ///
    /// Returns `None` for packets that carry no payload, including packets
    /// whose adaptation field length leaves no room for one.
    pub fn payload(&self) -> Option<&'a [u8]> {
        match self.adaptation_field_control() {
            AdaptationFieldControl::PayloadOnly => Some(&self.data[4..]),
            AdaptationFieldControl::AdaptationFieldAndPayload => {
                let af_len = self.data[4] as usize;
                let start = 4 + 1 + af_len;
                if start < TS_PACKET_SIZE {
                    Some(&self.data[start..])
                } else {
                    None
                }
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_packet(pid: u16, pusi: bool, afc: u8) -> [u8; TS_PACKET_SIZE] {
        let mut packet = [0xFFu8; TS_PACKET_SIZE];
        packet[0] = SYNC_BYTE;
        packet[1] = (if pusi { 0x40 } else { 0x00 }) | ((pid >> 8) as u8 & 0x1F);
        packet[2] = (pid & 0xFF) as u8;
        packet[3] = (afc << 4) | 0x01;
        packet
    }

    #[test]
    fn test_header_fields() {
        let data = make_packet(0x1011, true, 0b01);
        let packet = TsPacket::from_slice(&data).unwrap();

        assert_eq!(packet.pid(), 0x1011);
        assert!(packet.payload_unit_start());
        assert!(!packet.transport_error());
        assert_eq!(packet.continuity_counter(), 1);
        assert_eq!(
            packet.adaptation_field_control(),
            AdaptationFieldControl::PayloadOnly
        );
    }

    #[test]
    fn test_payload_only() {
        let data = make_packet(0x100, false, 0b01);
        let packet = TsPacket::from_slice(&data).unwrap();
        assert_eq!(packet.payload().unwrap().len(), 184);
    }

    #[test]
    fn test_adaptation_field_and_payload() {
        let mut data = make_packet(0x100, false, 0b11);
        data[4] = 10; // adaptation field length
        let packet = TsPacket::from_slice(&data).unwrap();
        assert_eq!(packet.payload().unwrap().len(), 188 - 4 - 1 - 10);
    }

    #[test]
    fn test_adaptation_field_only() {
        let data = make_packet(0x100, false, 0b10);
        let packet = TsPacket::from_slice(&data).unwrap();
        assert!(packet.payload().is_none());
    }

    #[test]
    fn test_oversized_adaptation_field() {
        let mut data = make_packet(0x100, false, 0b11);
        data[4] = 200;
        let packet = TsPacket::from_slice(&data).unwrap();
        assert!(packet.payload().is_none());
    }

    #[test]
    fn test_bad_sync_byte() {
        let mut data = make_packet(0x100, false, 0b01);
        data[0] = 0x48;
        assert!(TsPacket::from_slice(&data).is_err());
    }

    #[test]
    fn test_too_short() {
        let data = [SYNC_BYTE; 100];
        let err = TsPacket::from_slice(&data).unwrap_err();
        assert_eq!(
            err,
            TsError::PacketTooShort {
                expected: 188,
                actual: 100
            }
        );
    }
}
