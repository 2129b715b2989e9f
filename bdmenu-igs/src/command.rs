//! HDMV navigation commands.
//!
//! Button activations and movie objects carry lists of 12-byte virtual
//! machine instructions. Extraction only transports them: the fields are
//! unpacked so hosts can inspect or execute the program, but nothing here
//! runs it.

use bdmenu_core::ByteReader;
use serde::Serialize;

/// One 12-byte HDMV virtual machine instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HdmvInstruction {
    /// Number of operands (bits 7..5 of byte 0).
    pub operand_count: u8,
    /// Instruction group (bits 4..3 of byte 0).
    pub group: u8,
    /// Instruction sub-group (bits 2..0 of byte 0).
    pub sub_group: u8,
    /// First operand is immediate.
    pub imm_op1: bool,
    /// Second operand is immediate.
    pub imm_op2: bool,
    /// Branch option (bits 3..0 of byte 1).
    pub branch_option: u8,
    /// Compare option (bits 3..0 of byte 2).
    pub compare_option: u8,
    /// Set option (bits 4..0 of byte 3).
    pub set_option: u8,
    /// Destination operand.
    pub destination: u32,
    /// Source operand.
    pub source: u32,
}

impl HdmvInstruction {
    /// Encoded instruction size in bytes.
    pub const SIZE: usize = 12;

    /// Parse one instruction from the cursor.
    pub fn parse(reader: &mut ByteReader<'_>) -> bdmenu_core::Result<Self> {
        let b0 = reader.read_u8()?;
        let b1 = reader.read_u8()?;
        let b2 = reader.read_u8()?;
        let b3 = reader.read_u8()?;
        let destination = reader.read_u32()?;
        let source = reader.read_u32()?;

        Ok(Self {
            operand_count: (b0 & 0xE0) >> 5,
            group: (b0 & 0x18) >> 3,
            sub_group: b0 & 0x07,
            imm_op1: b1 & 0x80 != 0,
            imm_op2: b1 & 0x40 != 0,
            branch_option: b1 & 0x0F,
            compare_option: b2 & 0x0F,
            set_option: b3 & 0x1F,
            destination,
            source,
        })
    }

    /// Serialize back to the 12-byte wire form.
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut out = [0u8; Self::SIZE];
        out[0] = (self.operand_count << 5) | ((self.group & 0x03) << 3) | (self.sub_group & 0x07);
        out[1] = ((self.imm_op1 as u8) << 7) | ((self.imm_op2 as u8) << 6) | (self.branch_option & 0x0F);
        out[2] = self.compare_option & 0x0F;
        out[3] = self.set_option & 0x1F;
        out[4..8].copy_from_slice(&self.destination.to_be_bytes());
        out[8..12].copy_from_slice(&self.source.to_be_bytes());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bit_fields() {
        // op_count=2, group=1, sub_group=2; imm_op1, branch_option=5.
        let data = [
            0x4A, 0x85, 0x03, 0x11, 0x00, 0x00, 0x00, 0x07, 0xDE, 0xAD, 0xBE, 0xEF,
        ];
        let mut reader = ByteReader::new(&data);
        let insn = HdmvInstruction::parse(&mut reader).unwrap();

        assert_eq!(insn.operand_count, 2);
        assert_eq!(insn.group, 1);
        assert_eq!(insn.sub_group, 2);
        assert!(insn.imm_op1);
        assert!(!insn.imm_op2);
        assert_eq!(insn.branch_option, 5);
        assert_eq!(insn.compare_option, 3);
        assert_eq!(insn.set_option, 0x11);
        assert_eq!(insn.destination, 7);
        assert_eq!(insn.source, 0xDEADBEEF);
        assert_eq!(reader.position(), HdmvInstruction::SIZE);
        assert_eq!(insn.encode(), data);
    }

    #[test]
    fn test_parse_truncated() {
        let data = [0x00; 11];
        let mut reader = ByteReader::new(&data);
        assert!(HdmvInstruction::parse(&mut reader).is_err());
    }
}
