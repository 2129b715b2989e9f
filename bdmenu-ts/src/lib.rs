//! # bdmenu TS
//!
//! MPEG Transport Stream demultiplexing for Blu-ray IGS menu extraction.
//!
//! Blu-ray discs carry their interactive menus as an HDMV Interactive
//! Graphics Stream (stream type `0x91`) multiplexed into `.m2ts` transport
//! streams. This crate isolates that one elementary stream:
//!
//! - **Packet framing**: sync-byte scanning tolerant of the 192-byte
//!   BDAV/m2ts packet layout (4-byte copy-permission header before each
//!   188-byte packet)
//! - **PSI resolution**: PAT discovery of PMT PIDs, PMT discovery of the
//!   IGS elementary PID
//! - **PES reassembly**: strict declared-length reassembly of segment
//!   buffers spanning multiple transport packets
//!
//! General-purpose audio/video demultiplexing is out of scope; PIDs that do
//! not participate in menu extraction are skipped or surfaced as a
//! recoverable [`TsError::UnknownPid`].
//!
//! ## Example
//!
//! ```no_run
//! use bdmenu_ts::IgsDemuxer;
//! use std::fs::File;
//! use std::io::BufReader;
//!
//! let file = File::open("00000.m2ts").unwrap();
//! let mut demuxer = IgsDemuxer::new(BufReader::new(file));
//!
//! while let Some(segment) = demuxer.next_segment().unwrap() {
//!     println!("segment 0x{:02X}, {} bytes", segment.segment_type, segment.data.len());
//! }
//! ```

pub mod demuxer;
pub mod error;
pub mod packet;
pub mod pes;
pub mod psi;

pub use demuxer::{IgsDemuxer, Segment};
pub use error::{Result, TsError};
pub use packet::{
    AdaptationFieldControl, TsPacket, MAX_PACKET_SIZE, PID_NULL, PID_PAT, SYNC_BYTE,
    TS_PACKET_SIZE,
};
pub use pes::PesAssembler;
pub use psi::{Pat, Pmt, STREAM_TYPE_HDMV_IGS};
