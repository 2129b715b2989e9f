//! Program Specific Information (PSI) tables.
//!
//! Menu clips carry a single program: the PAT (PID 0) names the PMT PID,
//! and the PMT names the elementary streams. The one stream type menu
//! extraction cares about is HDMV Interactive Graphics (`0x91`).
//!
//! `serialize()` counterparts are provided so synthetic streams can be
//! built in tests and tooling.

use bdmenu_core::ByteReader;

use crate::error::{Result, TsError};

/// HDMV Interactive Graphics stream type, as signaled in the PMT.
pub const STREAM_TYPE_HDMV_IGS: u8 = 0x91;

/// CRC-32 polynomial used for PSI sections (ISO/IEC 13818-1).
const CRC32_POLY: u32 = 0x04C11DB7;

/// Pre-computed CRC-32 table.
static CRC32_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut j = 0;
        while j < 8 {
            if crc & 0x8000_0000 != 0 {
                crc = (crc << 1) ^ CRC32_POLY;
            } else {
                crc <<= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

/// Calculate the CRC-32 of a PSI section body.
pub fn calculate_crc32(data: &[u8]) -> u32 {
    let mut crc = 0xFFFF_FFFF;
    for &byte in data {
        let index = ((crc >> 24) ^ (byte as u32)) as usize;
        crc = (crc << 8) ^ CRC32_TABLE[index];
    }
    crc
}

/// Strip the pointer field from a payload-unit-start PSI payload and return
/// the section bytes.
pub fn section_bytes(payload: &[u8]) -> Result<&[u8]> {
    if payload.is_empty() {
        return Err(TsError::invalid_psi("Empty PSI payload"));
    }
    let pointer = payload[0] as usize;
    if 1 + pointer >= payload.len() {
        return Err(TsError::invalid_psi("Pointer field exceeds payload"));
    }
    Ok(&payload[1 + pointer..])
}

/// Validate the section framing shared by PAT and PMT and return the body
/// span (after the 8-byte extended header, before the CRC) plus the table
/// id extension.
fn checked_section(data: &[u8], table_id: u8) -> Result<(usize, usize, u16)> {
    let mut reader = ByteReader::new(data);

    let id = reader.read_u8()?;
    if id != table_id {
        return Err(TsError::invalid_psi(format!(
            "Expected table ID 0x{:02X}, got 0x{:02X}",
            table_id, id
        )));
    }

    let flags_len = reader.read_u16()?;
    if flags_len & 0x8000 == 0 {
        return Err(TsError::invalid_psi("Section syntax indicator not set"));
    }
    let section_length = (flags_len & 0x0FFF) as usize;
    let section_end = 3 + section_length;
    if data.len() < section_end || section_length < 9 {
        return Err(TsError::invalid_psi("Section truncated"));
    }

    let table_id_extension = reader.read_u16()?;

    let crc_offset = section_end - 4;
    let stored = u32::from_be_bytes([
        data[crc_offset],
        data[crc_offset + 1],
        data[crc_offset + 2],
        data[crc_offset + 3],
    ]);
    let calculated = calculate_crc32(&data[..crc_offset]);
    if stored != calculated {
        return Err(TsError::CrcMismatch { stored, calculated });
    }

    // Body starts after version/section-number bytes (offset 8).
    Ok((8, crc_offset, table_id_extension))
}

/// Program entry in the PAT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatEntry {
    /// Program number (0 designates the network PID).
    pub program_number: u16,
    /// PID of the program's PMT.
    pub pid: u16,
}

/// Program Association Table.
#[derive(Debug, Clone, Default)]
pub struct Pat {
    /// Transport stream id.
    pub transport_stream_id: u16,
    /// Program entries.
    pub programs: Vec<PatEntry>,
}

impl Pat {
    /// PAT table id.
    pub const TABLE_ID: u8 = 0x00;

    /// Create an empty PAT.
    pub fn new(transport_stream_id: u16) -> Self {
        Self {
            transport_stream_id,
            programs: Vec::new(),
        }
    }

    /// Add a program entry.
    pub fn add_program(&mut self, program_number: u16, pmt_pid: u16) {
        self.programs.push(PatEntry {
            program_number,
            pid: pmt_pid,
        });
    }

    /// Parse a PAT from section bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let (body_start, body_end, transport_stream_id) =
            checked_section(data, Self::TABLE_ID).map_err(|e| match e {
                TsError::InvalidPsi(msg) => TsError::invalid_pat(msg),
                other => other,
            })?;

        let mut reader = ByteReader::new(&data[body_start..body_end]);
        let mut programs = Vec::new();
        while reader.remaining() >= 4 {
            let program_number = reader.read_u16()?;
            let pid = reader.read_u16()? & 0x1FFF;
            programs.push(PatEntry {
                program_number,
                pid,
            });
        }

        Ok(Self {
            transport_stream_id,
            programs,
        })
    }

    /// PMT PIDs of all real programs (program number != 0).
    pub fn pmt_pids(&self) -> impl Iterator<Item = u16> + '_ {
        self.programs
            .iter()
            .filter(|p| p.program_number != 0)
            .map(|p| p.pid)
    }

    /// Serialize to section bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let section_length = 5 + self.programs.len() * 4 + 4;
        let mut data = Vec::with_capacity(3 + section_length);

        data.push(Self::TABLE_ID);
        data.push(0xB0 | ((section_length >> 8) as u8 & 0x0F));
        data.push((section_length & 0xFF) as u8);
        data.extend_from_slice(&self.transport_stream_id.to_be_bytes());
        data.push(0xC1); // version 0, current
        data.push(0); // section number
        data.push(0); // last section number

        for entry in &self.programs {
            data.extend_from_slice(&entry.program_number.to_be_bytes());
            data.push(0xE0 | ((entry.pid >> 8) as u8 & 0x1F));
            data.push((entry.pid & 0xFF) as u8);
        }

        let crc = calculate_crc32(&data);
        data.extend_from_slice(&crc.to_be_bytes());
        data
    }
}

/// Elementary stream entry in the PMT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PmtStream {
    /// Stream type tag.
    pub stream_type: u8,
    /// Elementary stream PID.
    pub pid: u16,
}

impl PmtStream {
    /// Check whether this stream carries HDMV interactive graphics.
    pub fn is_igs(&self) -> bool {
        self.stream_type == STREAM_TYPE_HDMV_IGS
    }
}

/// Program Map Table.
#[derive(Debug, Clone, Default)]
pub struct Pmt {
    /// Program number.
    pub program_number: u16,
    /// PCR PID.
    pub pcr_pid: u16,
    /// Elementary streams.
    pub streams: Vec<PmtStream>,
}

impl Pmt {
    /// PMT table id.
    pub const TABLE_ID: u8 = 0x02;

    /// Create an empty PMT.
    pub fn new(program_number: u16, pcr_pid: u16) -> Self {
        Self {
            program_number,
            pcr_pid,
            streams: Vec::new(),
        }
    }

    /// Add an elementary stream.
    pub fn add_stream(&mut self, stream_type: u8, pid: u16) {
        self.streams.push(PmtStream { stream_type, pid });
    }

    /// Parse a PMT from section bytes.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let (body_start, body_end, program_number) =
            checked_section(data, Self::TABLE_ID).map_err(|e| match e {
                TsError::InvalidPsi(msg) => TsError::invalid_pmt(msg),
                other => other,
            })?;

        let mut reader = ByteReader::new(&data[body_start..body_end]);

        let pcr_pid = reader.read_u16()? & 0x1FFF;
        let program_info_length = (reader.read_u16()? & 0x0FFF) as usize;
        reader
            .skip(program_info_length)
            .map_err(|_| TsError::invalid_pmt("Program info exceeds section"))?;

        let mut streams = Vec::new();
        while reader.remaining() >= 5 {
            let stream_type = reader.read_u8()?;
            let pid = reader.read_u16()? & 0x1FFF;
            let es_info_length = (reader.read_u16()? & 0x0FFF) as usize;
            reader
                .skip(es_info_length)
                .map_err(|_| TsError::invalid_pmt("ES info exceeds section"))?;
            streams.push(PmtStream { stream_type, pid });
        }

        Ok(Self {
            program_number,
            pcr_pid,
            streams,
        })
    }

    /// PID of the interactive graphics stream, if the program carries one.
    pub fn igs_pid(&self) -> Option<u16> {
        self.streams.iter().find(|s| s.is_igs()).map(|s| s.pid)
    }

    /// Serialize to section bytes (no descriptors).
    pub fn serialize(&self) -> Vec<u8> {
        let section_length = 9 + self.streams.len() * 5 + 4;
        let mut data = Vec::with_capacity(3 + section_length);

        data.push(Self::TABLE_ID);
        data.push(0xB0 | ((section_length >> 8) as u8 & 0x0F));
        data.push((section_length & 0xFF) as u8);
        data.extend_from_slice(&self.program_number.to_be_bytes());
        data.push(0xC1);
        data.push(0);
        data.push(0);
        data.push(0xE0 | ((self.pcr_pid >> 8) as u8 & 0x1F));
        data.push((self.pcr_pid & 0xFF) as u8);
        data.push(0xF0); // program info length = 0
        data.push(0x00);

        for stream in &self.streams {
            data.push(stream.stream_type);
            data.push(0xE0 | ((stream.pid >> 8) as u8 & 0x1F));
            data.push((stream.pid & 0xFF) as u8);
            data.push(0xF0); // es info length = 0
            data.push(0x00);
        }

        let crc = calculate_crc32(&data);
        data.extend_from_slice(&crc.to_be_bytes());
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc32_stable() {
        let data = [0x00, 0xB0, 0x0D, 0x00, 0x01, 0xC1, 0x00, 0x00];
        assert_eq!(calculate_crc32(&data), calculate_crc32(&data));
    }

    #[test]
    fn test_pat_round_trip() {
        let mut pat = Pat::new(1);
        pat.add_program(1, 0x0100);
        pat.add_program(2, 0x0200);

        let parsed = Pat::parse(&pat.serialize()).unwrap();
        assert_eq!(parsed.transport_stream_id, 1);
        assert_eq!(parsed.programs.len(), 2);
        assert_eq!(parsed.programs[0].pid, 0x0100);
        assert_eq!(parsed.pmt_pids().collect::<Vec<_>>(), vec![0x0100, 0x0200]);
    }

    #[test]
    fn test_pmt_round_trip_igs() {
        let mut pmt = Pmt::new(1, 0x1011);
        pmt.add_stream(0x1B, 0x1011); // H.264 video
        pmt.add_stream(STREAM_TYPE_HDMV_IGS, 0x1400);

        let parsed = Pmt::parse(&pmt.serialize()).unwrap();
        assert_eq!(parsed.program_number, 1);
        assert_eq!(parsed.streams.len(), 2);
        assert!(!parsed.streams[0].is_igs());
        assert_eq!(parsed.igs_pid(), Some(0x1400));
    }

    #[test]
    fn test_pat_bad_crc() {
        let mut pat = Pat::new(1);
        pat.add_program(1, 0x0100);
        let mut data = pat.serialize();
        let last = data.len() - 1;
        data[last] ^= 0xFF;

        assert!(matches!(
            Pat::parse(&data),
            Err(TsError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn test_pat_wrong_table_id() {
        let pmt = Pmt::new(1, 0x100);
        assert!(matches!(
            Pat::parse(&pmt.serialize()),
            Err(TsError::InvalidPat(_))
        ));
    }

    #[test]
    fn test_section_bytes_pointer_field() {
        let payload = [0x02, 0xAA, 0xBB, 0x00, 0x01, 0x02];
        assert_eq!(section_bytes(&payload).unwrap(), &[0x00, 0x01, 0x02]);
        assert!(section_bytes(&[]).is_err());
        assert!(section_bytes(&[0x10, 0x00]).is_err());
    }
}
