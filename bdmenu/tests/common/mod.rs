//! Builders for synthetic menu transport streams.
#![allow(dead_code)]

use bdmenu_ts::pes::build_pes;
use bdmenu_ts::{Pat, Pmt, STREAM_TYPE_HDMV_IGS, SYNC_BYTE, TS_PACKET_SIZE};

pub const PMT_PID: u16 = 0x0100;
pub const IGS_PID: u16 = 0x1400;

/// Wrap a PSI section into one transport packet.
pub fn psi_packet(pid: u16, section: &[u8]) -> Vec<u8> {
    let mut packet = vec![0xFFu8; TS_PACKET_SIZE];
    packet[0] = SYNC_BYTE;
    packet[1] = 0x40 | ((pid >> 8) as u8 & 0x1F);
    packet[2] = (pid & 0xFF) as u8;
    packet[3] = 0x10;
    packet[4] = 0x00; // pointer field
    packet[5..5 + section.len()].copy_from_slice(section);
    packet
}

/// Split a PES payload across transport packets. A short final packet is
/// stuffed with an adaptation field so the payload carries exactly the
/// PES bytes.
pub fn pes_packets(pid: u16, pes: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut cc = 0u8;
    for (i, chunk) in pes.chunks(TS_PACKET_SIZE - 4).enumerate() {
        out.push(SYNC_BYTE);
        out.push((if i == 0 { 0x40 } else { 0x00 }) | ((pid >> 8) as u8 & 0x1F));
        out.push((pid & 0xFF) as u8);
        if chunk.len() == TS_PACKET_SIZE - 4 {
            out.push(0x10 | (cc & 0x0F));
        } else {
            out.push(0x30 | (cc & 0x0F));
            let af_len = TS_PACKET_SIZE - 5 - chunk.len();
            out.push(af_len as u8);
            if af_len > 0 {
                out.push(0x00); // adaptation field flags
                out.resize(out.len() + af_len - 1, 0xFF);
            }
        }
        out.extend_from_slice(chunk);
        cc = cc.wrapping_add(1);
    }
    out
}

/// A menu segment with one page, one BOG, and one button whose three
/// states all show `picture_id`.
pub fn menu_segment(width: u16, height: u16, palette_id: u8, picture_id: u16) -> Vec<u8> {
    let mut out = vec![0x18, 0x00, 0x00];
    out.extend_from_slice(&width.to_be_bytes());
    out.extend_from_slice(&height.to_be_bytes());

    // Short composition header: stream model bit set at byte 15.
    let mut header = [0u8; 9];
    header[8] = 0x80;
    out.extend_from_slice(&header);
    out.extend_from_slice(&[0x00, 0x00, 0x00]);
    out.push(1); // page count at byte 19

    out.push(0); // page id
    out.push(0);
    out.extend_from_slice(&0u64.to_be_bytes()); // uo mask
    out.extend_from_slice(&[0, 0]); // empty in effects
    out.extend_from_slice(&[0, 0]); // empty out effects
    out.push(1); // framerate divider
    out.extend_from_slice(&0xFFFFu16.to_be_bytes()); // default button
    out.extend_from_slice(&0xFFFFu16.to_be_bytes()); // default activated
    out.push(palette_id);
    out.push(1); // bog count

    out.extend_from_slice(&0xFFFFu16.to_be_bytes()); // bog default button
    out.push(1); // button count

    // 35-byte button.
    out.extend_from_slice(&1u16.to_be_bytes()); // button id
    out.extend_from_slice(&0u16.to_be_bytes()); // value
    out.push(0); // flags
    out.extend_from_slice(&0u16.to_be_bytes()); // x
    out.extend_from_slice(&0u16.to_be_bytes()); // y
    for _ in 0..4 {
        out.extend_from_slice(&1u16.to_be_bytes()); // navigation
    }
    out.extend_from_slice(&picture_id.to_be_bytes()); // normal start
    out.extend_from_slice(&picture_id.to_be_bytes()); // normal stop
    out.extend_from_slice(&0u16.to_be_bytes()); // normal flags
    out.extend_from_slice(&picture_id.to_be_bytes()); // selected start
    out.extend_from_slice(&picture_id.to_be_bytes()); // selected stop
    out.extend_from_slice(&0u16.to_be_bytes()); // selected flags
    out.extend_from_slice(&picture_id.to_be_bytes()); // activated start
    out.extend_from_slice(&picture_id.to_be_bytes()); // activated stop
    out.extend_from_slice(&0u16.to_be_bytes()); // command count
    out
}

/// A palette segment where color id 1 is opaque video-range white.
pub fn palette_segment() -> Vec<u8> {
    vec![0x14, 0, 0, 0, 0, 1, 235, 128, 128, 255]
}

/// Picture segments for an all-literal RLE bitmap (no zero pixels).
pub fn picture_segments(id: u16, width: u16, height: u16, pixels: &[u8], pieces: usize) -> Vec<Vec<u8>> {
    assert!(pixels.iter().all(|&p| p != 0));
    assert_eq!(pixels.len(), width as usize * height as usize);

    let mut buffer = Vec::new();
    buffer.extend_from_slice(&width.to_be_bytes());
    buffer.extend_from_slice(&height.to_be_bytes());
    buffer.extend_from_slice(pixels);

    let rlen = buffer.len() as u32;
    let chunk = buffer.len().div_ceil(pieces).max(1);
    buffer
        .chunks(chunk)
        .enumerate()
        .map(|(i, data)| {
            let mut segment = vec![0x15, 0x00, 0x00];
            segment.extend_from_slice(&id.to_be_bytes());
            segment.push(0x00);
            if i == 0 {
                segment.push(0x80);
                segment.extend_from_slice(&rlen.to_be_bytes()[1..]);
            } else {
                segment.push(0x00);
            }
            segment.extend_from_slice(data);
            segment
        })
        .collect()
}

/// A complete menu transport stream: PAT, PMT, then the given segments as
/// PES payloads on the IGS PID.
pub fn menu_stream(segments: &[Vec<u8>]) -> Vec<u8> {
    let mut pat = Pat::new(1);
    pat.add_program(1, PMT_PID);
    let mut pmt = Pmt::new(1, IGS_PID);
    pmt.add_stream(STREAM_TYPE_HDMV_IGS, IGS_PID);

    let mut out = psi_packet(0x0000, &pat.serialize());
    out.extend_from_slice(&psi_packet(PMT_PID, &pmt.serialize()));
    for segment in segments {
        out.extend_from_slice(&pes_packets(IGS_PID, &build_pes(segment)));
    }
    out
}

/// Frame a plain transport stream as `.m2ts` (4-byte copy permission
/// header before each packet).
pub fn to_m2ts(ts: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(ts.len() / TS_PACKET_SIZE * (TS_PACKET_SIZE + 4));
    for packet in ts.chunks(TS_PACKET_SIZE) {
        out.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
        out.extend_from_slice(packet);
    }
    out
}
