//!
//! Turns 32-bit instruction words into [Instructions](../instruction/enum.Instruction.html).
//!
//! [`decode`] is total: every word decodes to exactly one variant. Words with an opcode or funct
//! fields outside of RV32I become [`Instruction::Unknown`], and it's up to the caller to decide
//! what to do with them.
//!

pub mod bits;
pub mod constants;
pub mod encode;

use crate::instruction::*;
use bits::RawInstruction;
use constants::*;

pub fn decode(word: u32) -> Instruction {
    let raw = RawInstruction(word);

    match raw.opcode() {
        OPCODE_TYPE_R => decode_r(raw),
        OPCODE_TYPE_I_JALR => decode_jalr(raw),
        OPCODE_TYPE_I_LOAD => decode_load(raw),
        OPCODE_TYPE_I_IMM => decode_imm(raw),
        OPCODE_TYPE_I_SYSTEM => decode_system(raw),
        OPCODE_TYPE_S => decode_store(raw),
        OPCODE_TYPE_B => decode_branch(raw),
        OPCODE_TYPE_U_LUI => Instruction::Upper {
            op: UpperOp::Lui,
            rd: raw.rd() as u8,
            imm: raw.imm_u(),
        },
        OPCODE_TYPE_U_AUIPC => Instruction::Upper {
            op: UpperOp::Auipc,
            rd: raw.rd() as u8,
            imm: raw.imm_u(),
        },
        OPCODE_TYPE_J => Instruction::Jal {
            rd: raw.rd() as u8,
            imm: raw.imm_j(),
        },
        _ => Instruction::Unknown(word),
    }
}

fn decode_r(raw: RawInstruction) -> Instruction {
    let alternate = raw.funct7() != 0;
    let op = match raw.funct3() {
        add::F3 if !alternate => ROp::Add,
        sub::F3 => ROp::Sub,
        sll::F3 => ROp::Sll,
        slt::F3 => ROp::Slt,
        sltu::F3 => ROp::Sltu,
        xor::F3 => ROp::Xor,
        srl::F3 if !alternate => ROp::Srl,
        sra::F3 => ROp::Sra,
        or::F3 => ROp::Or,
        and::F3 => ROp::And,
        _ => unreachable!("funct3 should only be 3 bits"),
    };

    Instruction::R {
        op,
        rd: raw.rd() as u8,
        rs1: raw.rs1() as u8,
        rs2: raw.rs2() as u8,
    }
}

fn decode_jalr(raw: RawInstruction) -> Instruction {
    if raw.funct3() != jalr::F3 {
        return Instruction::Unknown(raw.0);
    }
    Instruction::Jalr {
        rd: raw.rd() as u8,
        rs1: raw.rs1() as u8,
        imm: raw.imm_i(),
    }
}

fn decode_load(raw: RawInstruction) -> Instruction {
    let op = match raw.funct3() {
        lb::F3 => LoadOp::Lb,
        lh::F3 => LoadOp::Lh,
        lw::F3 => LoadOp::Lw,
        lbu::F3 => LoadOp::Lbu,
        lhu::F3 => LoadOp::Lhu,
        _ => return Instruction::Unknown(raw.0),
    };

    Instruction::Load {
        op,
        rd: raw.rd() as u8,
        rs1: raw.rs1() as u8,
        imm: raw.imm_i(),
    }
}

fn decode_imm(raw: RawInstruction) -> Instruction {
    // bit 30 of the word tells srli and srai apart
    let arithmetic = raw.funct7() & srai::F7 != 0;

    let (op, imm) = match raw.funct3() {
        addi::F3 => (ImmOp::Addi, raw.imm_i()),
        slti::F3 => (ImmOp::Slti, raw.imm_i()),
        sltiu::F3 => (ImmOp::Sltiu, raw.imm_i()),
        xori::F3 => (ImmOp::Xori, raw.imm_i()),
        ori::F3 => (ImmOp::Ori, raw.imm_i()),
        andi::F3 => (ImmOp::Andi, raw.imm_i()),
        slli::F3 => (ImmOp::Slli, raw.shamt() as i32),
        srai::F3 if arithmetic => (ImmOp::Srai, raw.shamt() as i32),
        srli::F3 => (ImmOp::Srli, raw.shamt() as i32),
        _ => unreachable!("funct3 should only be 3 bits"),
    };

    Instruction::Imm {
        op,
        rd: raw.rd() as u8,
        rs1: raw.rs1() as u8,
        imm,
    }
}

fn decode_system(raw: RawInstruction) -> Instruction {
    let rd = raw.rd() as u8;
    let csr = raw.csr() as u16;
    let reg = CsrSource::Reg(raw.rs1() as u8);
    let zimm = CsrSource::Imm(raw.rs1());

    let (op, src) = match raw.funct3() {
        ecall::F3 if csr == 0 => return Instruction::System(SystemOp::Ecall),
        ebreak::F3 => return Instruction::System(SystemOp::Ebreak),
        csrrw::F3 => (CsrOp::Write, reg),
        csrrs::F3 => (CsrOp::Set, reg),
        csrrc::F3 => (CsrOp::Clear, reg),
        csrrwi::F3 => (CsrOp::Write, zimm),
        csrrsi::F3 => (CsrOp::Set, zimm),
        csrrci::F3 => (CsrOp::Clear, zimm),
        _ => return Instruction::Unknown(raw.0),
    };

    Instruction::System(SystemOp::Csr { op, rd, csr, src })
}

fn decode_store(raw: RawInstruction) -> Instruction {
    let op = match raw.funct3() {
        sb::F3 => StoreOp::Sb,
        sh::F3 => StoreOp::Sh,
        sw::F3 => StoreOp::Sw,
        _ => return Instruction::Unknown(raw.0),
    };

    Instruction::Store {
        op,
        rs1: raw.rs1() as u8,
        rs2: raw.rs2() as u8,
        imm: raw.imm_s(),
    }
}

fn decode_branch(raw: RawInstruction) -> Instruction {
    let op = match raw.funct3() {
        beq::F3 => BranchOp::Beq,
        bne::F3 => BranchOp::Bne,
        blt::F3 => BranchOp::Blt,
        bge::F3 => BranchOp::Bge,
        bltu::F3 => BranchOp::Bltu,
        bgeu::F3 => BranchOp::Bgeu,
        _ => return Instruction::Unknown(raw.0),
    };

    Instruction::Branch {
        op,
        rs1: raw.rs1() as u8,
        rs2: raw.rs2() as u8,
        imm: raw.imm_b(),
    }
}
