//! Human-readable rendering of decoded instructions, used by `--print-instructions` and logs

use super::*;
use crate::register_names::reg_name;
use std::fmt;

impl ROp {
    pub fn mnemonic(self) -> &'static str {
        use ROp::*;
        match self {
            Add => "add",
            Sub => "sub",
            Sll => "sll",
            Slt => "slt",
            Sltu => "sltu",
            Xor => "xor",
            Srl => "srl",
            Sra => "sra",
            Or => "or",
            And => "and",
        }
    }
}

impl ImmOp {
    pub fn mnemonic(self) -> &'static str {
        use ImmOp::*;
        match self {
            Addi => "addi",
            Slti => "slti",
            Sltiu => "sltiu",
            Xori => "xori",
            Ori => "ori",
            Andi => "andi",
            Slli => "slli",
            Srli => "srli",
            Srai => "srai",
        }
    }
}

impl LoadOp {
    pub fn mnemonic(self) -> &'static str {
        use LoadOp::*;
        match self {
            Lb => "lb",
            Lh => "lh",
            Lw => "lw",
            Lbu => "lbu",
            Lhu => "lhu",
        }
    }
}

impl StoreOp {
    pub fn mnemonic(self) -> &'static str {
        use StoreOp::*;
        match self {
            Sb => "sb",
            Sh => "sh",
            Sw => "sw",
        }
    }
}

impl BranchOp {
    pub fn mnemonic(self) -> &'static str {
        use BranchOp::*;
        match self {
            Beq => "beq",
            Bne => "bne",
            Blt => "blt",
            Bge => "bge",
            Bltu => "bltu",
            Bgeu => "bgeu",
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        let r = reg_name;

        match *self {
            R { op, rd, rs1, rs2 } => {
                write!(f, "{} {}, {}, {}", op.mnemonic(), r(rd), r(rs1), r(rs2))
            }
            Load { op, rd, rs1, imm } => {
                write!(f, "{} {}, {}({})", op.mnemonic(), r(rd), imm, r(rs1))
            }
            Imm { op, rd, rs1, imm } => {
                write!(f, "{} {}, {}, {}", op.mnemonic(), r(rd), r(rs1), imm)
            }
            Jalr { rd, rs1, imm } => write!(f, "jalr {}, {}({})", r(rd), imm, r(rs1)),
            System(SystemOp::Ecall) => write!(f, "ecall"),
            System(SystemOp::Ebreak) => write!(f, "ebreak"),
            System(SystemOp::Csr { op, rd, csr, src }) => {
                let name = match (op, src) {
                    (CsrOp::Write, CsrSource::Reg(_)) => "csrrw",
                    (CsrOp::Set, CsrSource::Reg(_)) => "csrrs",
                    (CsrOp::Clear, CsrSource::Reg(_)) => "csrrc",
                    (CsrOp::Write, CsrSource::Imm(_)) => "csrrwi",
                    (CsrOp::Set, CsrSource::Imm(_)) => "csrrsi",
                    (CsrOp::Clear, CsrSource::Imm(_)) => "csrrci",
                };
                match src {
                    CsrSource::Reg(rs1) => write!(f, "{} {}, {:#x}, {}", name, r(rd), csr, r(rs1)),
                    CsrSource::Imm(imm) => write!(f, "{} {}, {:#x}, {}", name, r(rd), csr, imm),
                }
            }
            Store { op, rs1, rs2, imm } => {
                write!(f, "{} {}, {}({})", op.mnemonic(), r(rs2), imm, r(rs1))
            }
            Branch { op, rs1, rs2, imm } => {
                write!(f, "{} {}, {}, {}", op.mnemonic(), r(rs1), r(rs2), imm)
            }
            Upper { op, rd, imm } => {
                let name = match op {
                    UpperOp::Lui => "lui",
                    UpperOp::Auipc => "auipc",
                };
                write!(f, "{} {}, {:#x}", name, r(rd), imm >> 12)
            }
            Jal { rd, imm } => write!(f, "jal {}, {}", r(rd), imm),
            Unknown(word) => write!(f, "unknown ({:#010x})", word),
        }
    }
}
