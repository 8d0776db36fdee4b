mod disasm;

/// Register-register operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ROp {
    Add,
    Sub,
    Sll,
    Slt,
    Sltu,
    Xor,
    Srl,
    Sra,
    Or,
    And,
}

/// Register-immediate operations. For the shifts, the immediate is the 5-bit shift amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImmOp {
    Addi,
    Slti,
    Sltiu,
    Xori,
    Ori,
    Andi,
    Slli,
    Srli,
    Srai,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOp {
    Lb,
    Lh,
    Lw,
    Lbu,
    Lhu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Sb,
    Sh,
    Sw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchOp {
    Beq,
    Bne,
    Blt,
    Bge,
    Bltu,
    Bgeu,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpperOp {
    Lui,
    Auipc,
}

/// Read-modify-write flavour of a CSR instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrOp {
    /// csrrw, csrrwi
    Write,
    /// csrrs, csrrsi
    Set,
    /// csrrc, csrrci
    Clear,
}

/// Where a CSR instruction takes its new value from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrSource {
    Reg(u8),
    /// 5-bit zero-extended immediate
    Imm(u32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemOp {
    Ecall,
    Ebreak,
    /// rd, csr, source
    Csr {
        op: CsrOp,
        rd: u8,
        csr: u16,
        src: CsrSource,
    },
}

/// A decoded RV32I instruction, one variant per encoding format. Every variant carries only the
/// operands its format has, with immediates already sign- or zero-extended. Branch and jump
/// immediates are byte offsets, with their implicit low zero bit included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    // Type R
    /// rd, rs1, rs2
    R { op: ROp, rd: u8, rs1: u8, rs2: u8 },

    // Type I
    /// rd, rs1, imm
    Load { op: LoadOp, rd: u8, rs1: u8, imm: i32 },
    Imm { op: ImmOp, rd: u8, rs1: u8, imm: i32 },
    Jalr { rd: u8, rs1: u8, imm: i32 },
    System(SystemOp),

    // Type S
    /// rs1, rs2, imm
    Store { op: StoreOp, rs1: u8, rs2: u8, imm: i32 },

    // Type B
    /// rs1, rs2, offset
    Branch { op: BranchOp, rs1: u8, rs2: u8, imm: i32 },

    // Type U
    /// rd, upper immediate (low 12 bits are zero)
    Upper { op: UpperOp, rd: u8, imm: u32 },

    // Type J
    /// rd, offset
    Jal { rd: u8, imm: i32 },

    /// A word the decoder didn't recognize, either because of its opcode or its funct fields.
    /// Executing it does nothing.
    Unknown(u32),
}

impl Instruction {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Instruction::Unknown(_))
    }
}
