//! Builds instruction words from their fields, one function per encoding format.
//! Handy for writing programs in tests and benchmarks without an assembler.

use super::bits::RawInstruction;
use super::constants::*;

macro_rules! encode_inner {
    ($i:ident) => {};
    ($i:ident, ) => {};
    ($i:ident, opcode: $val:expr; $($props:tt)*) => {
        $i.set_opcode($val as u32);
        encode_inner!($i, $($props)*);
    };
    ($i:ident, rd: $val:expr; $($props:tt)*) => {
        $i.set_rd($val as u32);
        encode_inner!($i, $($props)*);
    };
    ($i:ident, funct3: $val:expr; $($props:tt)*) => {
        $i.set_funct3($val as u32);
        encode_inner!($i, $($props)*);
    };
    ($i:ident, funct7: $val:expr; $($props:tt)*) => {
        $i.set_funct7($val as u32);
        encode_inner!($i, $($props)*);
    };
    ($i:ident, rs1: $val:expr; $($props:tt)*) => {
        $i.set_rs1($val as u32);
        encode_inner!($i, $($props)*);
    };
    ($i:ident, rs2: $val:expr; $($props:tt)*) => {
        $i.set_rs2($val as u32);
        encode_inner!($i, $($props)*);
    };
    ($i:ident, imm_i: $val:expr; $($props:tt)*) => {
        $i.set_imm_i($val as i32);
        encode_inner!($i, $($props)*);
    };
    ($i:ident, imm_s: $val:expr; $($props:tt)*) => {
        $i.set_imm_s($val as i32);
        encode_inner!($i, $($props)*);
    };
    ($i:ident, imm_b: $val:expr; $($props:tt)*) => {
        $i.set_imm_b($val as i32);
        encode_inner!($i, $($props)*);
    };
    ($i:ident, imm_u: $val:expr; $($props:tt)*) => {
        $i.set_imm_u($val as u32);
        encode_inner!($i, $($props)*);
    };
    ($i:ident, imm_j: $val:expr; $($props:tt)*) => {
        $i.set_imm_j($val as i32);
        encode_inner!($i, $($props)*);
    };
}

macro_rules! encode {
    ($($props:tt)*) => {
        {
            let mut instruction = RawInstruction(0);
            encode_inner!(instruction, $($props)*);
            instruction.0
        }
    };
}

pub fn r(funct7: u32, funct3: u32, rd: u8, rs1: u8, rs2: u8) -> u32 {
    encode! { opcode: OPCODE_TYPE_R; funct7: funct7; funct3: funct3; rd: rd; rs1: rs1; rs2: rs2; }
}

/// Any I-type word: loads, immediates, jalr and system instructions
pub fn i(opcode: u32, funct3: u32, rd: u8, rs1: u8, imm: i32) -> u32 {
    encode! { opcode: opcode; funct3: funct3; rd: rd; rs1: rs1; imm_i: imm; }
}

pub fn s(funct3: u32, rs1: u8, rs2: u8, imm: i32) -> u32 {
    encode! { opcode: OPCODE_TYPE_S; funct3: funct3; rs1: rs1; rs2: rs2; imm_s: imm; }
}

/// `imm` is a byte offset and should be even
pub fn b(funct3: u32, rs1: u8, rs2: u8, imm: i32) -> u32 {
    encode! { opcode: OPCODE_TYPE_B; funct3: funct3; rs1: rs1; rs2: rs2; imm_b: imm; }
}

/// `imm` is the full 32-bit value, only its upper 20 bits are kept
pub fn u(opcode: u32, rd: u8, imm: u32) -> u32 {
    encode! { opcode: opcode; rd: rd; imm_u: imm; }
}

/// `imm` is a byte offset and should be even
pub fn j(rd: u8, imm: i32) -> u32 {
    encode! { opcode: OPCODE_TYPE_J; rd: rd; imm_j: imm; }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_words() {
        assert_eq!(r(add::F7, add::F3, 3, 1, 2), 0x0020_81b3);
        assert_eq!(i(OPCODE_TYPE_I_LOAD, lw::F3, 2, 0, 0x11c), 0x11c0_2103);
        assert_eq!(i(OPCODE_TYPE_I_SYSTEM, ebreak::F3, 0, 0, 1), 0x0010_0073);
        assert_eq!(s(sw::F3, 9, 8, -4), 0xfe84_ae23);
        assert_eq!(b(beq::F3, 1, 1, 8), 0x0010_8463);
        assert_eq!(u(OPCODE_TYPE_U_LUI, 12, 0x0030_9000), 0x0030_9637);
        assert_eq!(j(1, -8), 0xff9f_f0ef);
    }
}
