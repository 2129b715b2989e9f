//! Single-pass demuxer isolating the IGS elementary stream.
//!
//! The demuxer walks a transport stream once, resolving PAT then PMT until
//! it finds the elementary PID signaled with stream type `0x91`, and from
//! then on reassembles that PID's PES payloads into segment buffers. It
//! never seeks; `.m2ts` menu clips are read front to back.

use std::collections::BTreeSet;
use std::io::Read;

use tracing::debug;

use crate::error::{Result, TsError};
use crate::packet::{TsPacket, MAX_PACKET_SIZE, PID_NULL, PID_PAT, SYNC_BYTE, TS_PACKET_SIZE};
use crate::pes::PesAssembler;
use crate::psi::{section_bytes, Pat, Pmt};

/// A reassembled PES payload from the IGS elementary stream.
///
/// `data[0]` is the segment tag byte; the segment decoders interpret the
/// buffer with the tag at offset 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Segment tag byte (copied from `data[0]`).
    pub segment_type: u8,
    /// Full segment buffer, tag byte first.
    pub data: Vec<u8>,
}

impl Segment {
    fn new(data: Vec<u8>) -> Option<Self> {
        let segment_type = *data.first()?;
        Some(Self { segment_type, data })
    }
}

/// Pull-based transport stream demuxer for one IGS elementary stream.
pub struct IgsDemuxer<R: Read> {
    reader: R,
    packet_buf: [u8; TS_PACKET_SIZE],
    /// PMT PIDs announced by the PAT.
    pmt_pids: BTreeSet<u16>,
    /// Elementary PIDs announced by a PMT with a non-IGS stream type.
    ignored_pids: BTreeSet<u16>,
    /// The IGS elementary PID, once discovered.
    igs_pid: Option<u16>,
    assembler: PesAssembler,
    eof: bool,
}

impl<R: Read> IgsDemuxer<R> {
    /// Create a demuxer over a byte stream.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            packet_buf: [0u8; TS_PACKET_SIZE],
            pmt_pids: BTreeSet::new(),
            ignored_pids: BTreeSet::new(),
            igs_pid: None,
            assembler: PesAssembler::new(),
            eof: false,
        }
    }

    /// The discovered IGS elementary PID, if any.
    pub fn igs_pid(&self) -> Option<u16> {
        self.igs_pid
    }

    /// Pull the next complete segment.
    ///
    /// Returns `Ok(None)` at end of stream. A [`TsError::UnknownPid`] error
    /// is recoverable: the offending packet has been consumed and the next
    /// call resumes with the following packet. All other errors indicate
    /// the stream cannot be parsed further.
    pub fn next_segment(&mut self) -> Result<Option<Segment>> {
        loop {
            if self.eof {
                return Ok(None);
            }

            if !self.read_packet()? {
                self.eof = true;
                if let Some(segment) = self.assembler.flush().and_then(Segment::new) {
                    return Ok(Some(segment));
                }
                return Ok(None);
            }

            let packet = TsPacket::from_slice(&self.packet_buf)?;
            let pid = packet.pid();

            if pid == PID_NULL {
                continue;
            }

            let payload = match packet.payload() {
                Some(p) => p,
                None => continue,
            };
            let pusi = packet.payload_unit_start();

            if self.igs_pid == Some(pid) {
                if let Some(segment) = self.assembler.add(payload, pusi)?.and_then(Segment::new) {
                    return Ok(Some(segment));
                }
                continue;
            }

            if pid == PID_PAT {
                if pusi {
                    let pat = Pat::parse(section_bytes(payload)?)?;
                    for pmt_pid in pat.pmt_pids() {
                        self.pmt_pids.insert(pmt_pid);
                    }
                }
                continue;
            }

            if self.pmt_pids.contains(&pid) {
                if pusi {
                    let pmt = Pmt::parse(section_bytes(payload)?)?;
                    for stream in &pmt.streams {
                        if stream.is_igs() {
                            if self.igs_pid.is_none() {
                                debug!(pid = stream.pid, "Found IGS elementary stream");
                            }
                            self.igs_pid = Some(stream.pid);
                        } else {
                            self.ignored_pids.insert(stream.pid);
                        }
                    }
                }
                continue;
            }

            if self.ignored_pids.contains(&pid) {
                continue;
            }

            return Err(TsError::UnknownPid(pid));
        }
    }

    /// Frame the next packet into `packet_buf`.
    ///
    /// Scans forward for the sync byte, absorbing the 4-byte copy
    /// permission header of `.m2ts` files (and up to `MAX_PACKET_SIZE - 1`
    /// bytes of other inter-packet garbage). Returns `false` at end of
    /// stream.
    fn read_packet(&mut self) -> Result<bool> {
        let mut skipped = 0usize;
        loop {
            let mut byte = [0u8; 1];
            let n = self.reader.read(&mut byte)?;
            if n == 0 {
                return Ok(false);
            }
            if byte[0] == SYNC_BYTE {
                break;
            }
            skipped += 1;
            if skipped >= MAX_PACKET_SIZE - 1 {
                return Err(TsError::SyncByteNotFound(MAX_PACKET_SIZE - 1));
            }
        }

        self.packet_buf[0] = SYNC_BYTE;
        match self.reader.read_exact(&mut self.packet_buf[1..]) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!("Truncated packet at end of stream");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
