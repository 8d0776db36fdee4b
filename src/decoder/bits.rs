use bitfield::bitfield;
use std::ops::Range;

/// Bitmask with ones in `range` and zeros everywhere else
pub const fn mask(range: Range<u32>) -> u32 {
    let len = range.end - range.start;
    if len >= 32 {
        u32::MAX
    } else {
        ((1u32 << len) - 1) << range.start
    }
}

/// Sign-extends the low `bits` bits of `x`
#[inline]
pub const fn sign_extend(x: u32, bits: u32) -> i32 {
    let shift = 32 - bits;
    ((x << shift) as i32) >> shift
}

bitfield! {
    /// Raw view of a 32-bit instruction word
    #[derive(Default, Clone, Copy, PartialEq, Eq)]
    pub struct RawInstruction(u32);
    impl Debug;
    u32;

    pub opcode, set_opcode: 6, 0;
    pub rd, set_rd: 11, 7;
    pub funct3, set_funct3: 14, 12;
    pub rs1, set_rs1: 19, 15;
    pub rs2, set_rs2: 24, 20;
    pub funct7, set_funct7: 31, 25;
    // unsigned I-type immediate, which is also the CSR index
    pub csr, set_csr: 31, 20;
}

impl RawInstruction {
    pub fn imm_i(self) -> i32 {
        sign_extend(self.0 >> 20, 12)
    }

    pub fn set_imm_i(&mut self, imm: i32) {
        self.0 = (self.0 & !mask(20..32)) | ((imm as u32) << 20);
    }

    pub fn imm_s(self) -> i32 {
        let imm = ((self.0 & mask(25..32)) >> 20) | ((self.0 >> 7) & mask(0..5));
        sign_extend(imm, 12)
    }

    pub fn set_imm_s(&mut self, imm: i32) {
        let imm = imm as u32;

        // clear
        self.0 = self.0 & !mask(7..12) & !mask(25..32);

        // set self[11:7] = imm[4:0]
        self.0 |= (imm & mask(0..5)) << 7;

        // set self[31:25] = imm[11:5]
        self.0 |= (imm & mask(5..12)) << 20;
    }

    /// Byte offset of a branch, always even
    pub fn imm_b(self) -> i32 {
        let x = self.0;
        let imm = ((x >> 31) & 1) << 12
            | ((x >> 7) & 1) << 11
            | ((x >> 25) & mask(0..6)) << 5
            | ((x >> 8) & mask(0..4)) << 1;
        sign_extend(imm, 13)
    }

    pub fn set_imm_b(&mut self, imm: i32) {
        let imm = imm as u32;
        self.0 &= !mask(7..12) & !mask(25..32);
        self.0 |= ((imm >> 12) & 1) << 31
            | ((imm >> 11) & 1) << 7
            | ((imm >> 5) & mask(0..6)) << 25
            | ((imm >> 1) & mask(0..4)) << 8;
    }

    /// Upper immediate, already in place: bits 31:12 of the word, low 12 bits cleared
    pub fn imm_u(self) -> u32 {
        self.0 & mask(12..32)
    }

    pub fn set_imm_u(&mut self, imm: u32) {
        self.0 = (self.0 & !mask(12..32)) | (imm & mask(12..32));
    }

    /// Byte offset of a jump, always even
    pub fn imm_j(self) -> i32 {
        let x = self.0;
        let imm = ((x >> 31) & 1) << 20
            | ((x >> 12) & mask(0..8)) << 12
            | ((x >> 20) & 1) << 11
            | ((x >> 21) & mask(0..10)) << 1;
        sign_extend(imm, 21)
    }

    pub fn set_imm_j(&mut self, imm: i32) {
        let imm = imm as u32;
        self.0 &= !mask(12..32);
        self.0 |= ((imm >> 20) & 1) << 31
            | ((imm >> 12) & mask(0..8)) << 12
            | ((imm >> 11) & 1) << 20
            | ((imm >> 1) & mask(0..10)) << 21;
    }

    /// Shift amount of `slli`/`srli`/`srai`. Never sign-extended.
    pub fn shamt(self) -> u32 {
        self.rs2()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask(0..5), 0x1f);
        assert_eq!(mask(12..32), 0xffff_f000);
        assert_eq!(mask(0..32), u32::MAX);
        assert_eq!(mask(7..12), 0xf80);
        assert_eq!(mask(5..12), 0xfe0);
        assert_eq!(mask(25..32), 0xfe00_0000);
        assert_eq!(mask(3..3), 0);
    }

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0xfff, 12), -1);
        assert_eq!(sign_extend(0x7ff, 12), 0x7ff);
        assert_eq!(sign_extend(0x1000, 13), -4096);
    }

    #[test]
    fn test_fields() {
        // add x3, x1, x2
        let i = RawInstruction(0x0020_81b3);
        assert_eq!(i.opcode(), 0x33);
        assert_eq!(i.rd(), 3);
        assert_eq!(i.rs1(), 1);
        assert_eq!(i.rs2(), 2);
        assert_eq!(i.funct3(), 0);
        assert_eq!(i.funct7(), 0);
    }

    #[test]
    fn test_imm_i() {
        assert_eq!(RawInstruction(0x07b14093).imm_i(), 123);
        assert_eq!(RawInstruction(0xffc4c413).imm_i(), -4);
        assert_eq!(RawInstruction(0x000f8f13).imm_i(), 0);

        let tests = [0, -4, 123, -123, 0x7f, 0b11111111111, -2048];
        for imm in tests {
            let mut i = RawInstruction(0x12345678);
            i.set_imm_i(imm);
            assert_eq!(i.imm_i(), imm);
        }
    }

    #[test]
    fn test_imm_s() {
        assert_eq!(RawInstruction(0x0684ada3).imm_s(), 123);
        assert_eq!(RawInstruction(0xfe84ae23).imm_s(), -4);
        assert_eq!(RawInstruction(0x0000a023).imm_s(), 0);

        let tests = [0, -4, 123, -123, 0x7f, 0b11111111111, -2048];
        for imm in tests {
            let mut i = RawInstruction(0x12345678);
            i.set_imm_s(imm);
            assert_eq!(i.imm_s(), imm);
            assert_eq!(i.opcode(), 0x78);
            assert_eq!(i.funct3(), 0b101);
            assert_eq!(i.rs1(), 0x08);
            assert_eq!(i.rs2(), 0x03);
        }
    }

    #[test]
    fn test_imm_b() {
        // beq x1, x1, 8
        assert_eq!(RawInstruction(0x0010_8463).imm_b(), 8);
        // bne x0, x0, -4
        assert_eq!(RawInstruction(0xfe00_1ee3).imm_b(), -4);

        let tests = [0, -4, 8, 4094, -4096, 2048, -2];
        for imm in tests {
            let mut i = RawInstruction(0x12345678);
            i.set_imm_b(imm);
            assert_eq!(i.imm_b(), imm);
            assert_eq!(i.opcode(), 0x78);
            assert_eq!(i.funct3(), 0b101);
            assert_eq!(i.rs1(), 0x08);
            assert_eq!(i.rs2(), 0x03);
        }
    }

    #[test]
    fn test_imm_j() {
        // jal x0, 16
        assert_eq!(RawInstruction(0x0100_006f).imm_j(), 16);
        // jal ra, -8
        assert_eq!(RawInstruction(0xff9f_f0ef).imm_j(), -8);

        let tests = [0, -8, 16, 2048, 0xffffe, -0x100000];
        for imm in tests {
            let mut i = RawInstruction(0x12345678);
            i.set_imm_j(imm);
            assert_eq!(i.imm_j(), imm);
        }
    }

    #[test]
    fn test_imm_u() {
        // lui x12, 0x309
        assert_eq!(RawInstruction(0x0030_9637).imm_u(), 0x0030_9000);
    }
}
