//!
//! Runs a RISC-V program instruction by instruction.
//!
//! The [Simulator] fetches a word from main memory through the [Bus], decodes it with
//! [decode](crate::decoder::decode) and executes it. It stays [Running](State::Running) until an
//! `ecall`/`ebreak`, a stop request or an addressing error moves it to
//! [Halted](State::Halted), after which it never fetches again.
//!

use crate::decoder::decode;
use crate::error::MemoryError;
use crate::instruction::*;
use crate::register_names::REGVEC;
use crate::stop::Stop;
use owo_colors::OwoColorize;
use std::fmt;

pub mod bus;
pub mod memory;
pub mod registers;

use bus::Bus;
use registers::*;

/// Why the simulator stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    Ecall,
    Ebreak,
    /// Someone called [Stop::request]
    Stopped,
    /// A fetch, load or store touched an invalid address
    Fault { pc: u32, error: MemoryError },
}

impl Halt {
    pub fn is_fault(&self) -> bool {
        matches!(self, Halt::Fault { .. })
    }
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Halt::Ecall => write!(f, "halted by ecall"),
            Halt::Ebreak => write!(f, "halted by ebreak"),
            Halt::Stopped => write!(f, "stopped"),
            Halt::Fault { pc, error } => write!(f, "fault at pc {:#010x}: {}", pc, error),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum State {
    Running,
    Halted(Halt),
}

/// What to do with the program counter after executing an instruction
enum Flow {
    Next,
    Jump(u32),
    Halt(Halt),
}

/// Simulates an RV32I CPU. Built around a [Bus] that already holds the program, and ran by
/// calling [run](Simulator::run) or [step](Simulator::step).
#[derive(Debug)]
pub struct Simulator {
    registers: Registers,
    csrs: CsrFile,
    pc: u32,
    state: State,
    pub bus: Bus,
}

impl Simulator {
    pub fn new(bus: Bus) -> Self {
        Self {
            registers: Registers::default(),
            csrs: CsrFile::default(),
            pc: 0,
            state: State::Running,
            bus,
        }
    }

    /// Clears the registers, the CSRs and the program counter. Memory is left untouched.
    pub fn reset(&mut self) {
        self.registers = Registers::default();
        self.csrs = CsrFile::default();
        self.pc = 0;
        self.state = State::Running;
    }

    pub fn reg<T: FromRegister>(&self, i: u8) -> T {
        self.registers.get(i)
    }

    pub fn set_reg<T: IntoRegister>(&mut self, i: u8, x: T) {
        self.registers.set(i, x);
    }

    pub fn csr(&self, i: u16) -> u32 {
        self.csrs.get(i)
    }

    pub fn set_csr(&mut self, i: u16, x: u32) {
        self.csrs.set(i, x);
    }

    pub fn pc(&self) -> u32 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u32) {
        self.pc = pc;
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn is_halted(&self) -> bool {
        matches!(self.state, State::Halted(_))
    }

    fn halt(&mut self, halt: Halt) -> Halt {
        tracing::debug!(pc = self.pc, %halt, "simulator halted");
        self.state = State::Halted(halt.clone());
        halt
    }

    /// Runs until the program halts or `stop` is requested
    pub fn run(&mut self, stop: &Stop) -> Halt {
        loop {
            if stop.is_requested() {
                if let State::Halted(halt) = &self.state {
                    return halt.clone();
                }
                return self.halt(Halt::Stopped);
            }

            if let Some(halt) = self.step() {
                return halt;
            }
        }
    }

    /// Executes a single instruction. Returns why the simulator halted, if it did.
    pub fn step(&mut self) -> Option<Halt> {
        if let State::Halted(halt) = &self.state {
            return Some(halt.clone());
        }

        let pc = self.pc;
        let flow = self
            .bus
            .fetch(pc)
            .map(decode)
            .and_then(|instruction| self.execute(instruction));

        match flow {
            Ok(Flow::Next) => self.pc = pc.wrapping_add(4),
            Ok(Flow::Jump(target)) => self.pc = target,
            Ok(Flow::Halt(halt)) => return Some(self.halt(halt)),
            Err(error) => return Some(self.halt(Halt::Fault { pc, error })),
        }

        None
    }

    fn execute(&mut self, instruction: Instruction) -> Result<Flow, MemoryError> {
        use Instruction::*;

        let pc = self.pc;
        tracing::trace!(pc, "{}", instruction);

        macro_rules! get {
            ($reg:ident $type:ty) => {
                self.reg::<$type>($reg)
            };
        }

        let flow = match instruction {
            // Type R
            R { op, rd, rs1, rs2 } => {
                self.set_reg(rd, alu(op, get!(rs1 u32), get!(rs2 u32)));
                Flow::Next
            }

            // Type I
            Imm { op, rd, rs1, imm } => {
                self.set_reg(rd, alu_imm(op, get!(rs1 u32), imm));
                Flow::Next
            }
            Load { op, rd, rs1, imm } => {
                let address = get!(rs1 u32).wrapping_add(imm as u32);
                match op {
                    LoadOp::Lb => self.set_reg(rd, self.bus.load_byte(address)? as i8),
                    LoadOp::Lh => self.set_reg(rd, self.bus.load_half(address)? as i16),
                    LoadOp::Lw => self.set_reg(rd, self.bus.load_word(address)?),
                    LoadOp::Lbu => self.set_reg(rd, self.bus.load_byte(address)?),
                    LoadOp::Lhu => self.set_reg(rd, self.bus.load_half(address)?),
                }
                Flow::Next
            }
            Jalr { rd, rs1, imm } => {
                let target = get!(rs1 u32).wrapping_add(imm as u32) & !1;
                self.set_reg(rd, pc.wrapping_add(4));
                Flow::Jump(target)
            }
            System(SystemOp::Ecall) => Flow::Halt(Halt::Ecall),
            System(SystemOp::Ebreak) => Flow::Halt(Halt::Ebreak),
            System(SystemOp::Csr { op, rd, csr, src }) => {
                let src = match src {
                    CsrSource::Reg(rs1) => get!(rs1 u32),
                    CsrSource::Imm(imm) => imm,
                };
                let old = match op {
                    CsrOp::Write => self.csrs.update(csr, |_| src),
                    CsrOp::Set => self.csrs.update(csr, |x| x | src),
                    CsrOp::Clear => self.csrs.update(csr, |x| x & !src),
                };
                self.set_reg(rd, old);
                Flow::Next
            }

            // Type S
            Store { op, rs1, rs2, imm } => {
                let address = get!(rs1 u32).wrapping_add(imm as u32);
                match op {
                    StoreOp::Sb => self.bus.store_byte(address, get!(rs2 u8))?,
                    StoreOp::Sh => self.bus.store_half(address, get!(rs2 u16))?,
                    StoreOp::Sw => self.bus.store_word(address, get!(rs2 u32))?,
                }
                Flow::Next
            }

            // Type SB + jumps
            Branch { op, rs1, rs2, imm } => {
                let (a, b) = (get!(rs1 u32), get!(rs2 u32));
                let taken = match op {
                    BranchOp::Beq => a == b,
                    BranchOp::Bne => a != b,
                    BranchOp::Blt => (a as i32) < (b as i32),
                    BranchOp::Bge => (a as i32) >= (b as i32),
                    BranchOp::Bltu => a < b,
                    BranchOp::Bgeu => a >= b,
                };
                if taken {
                    Flow::Jump(pc.wrapping_add(imm as u32))
                } else {
                    Flow::Next
                }
            }
            Jal { rd, imm } => {
                self.set_reg(rd, pc.wrapping_add(4));
                Flow::Jump(pc.wrapping_add(imm as u32))
            }

            // Type U
            Upper { op, rd, imm } => {
                match op {
                    UpperOp::Lui => self.set_reg(rd, imm),
                    UpperOp::Auipc => self.set_reg(rd, pc.wrapping_add(imm)),
                }
                Flow::Next
            }

            Unknown(word) => {
                tracing::warn!(
                    pc = format_args!("{:#010x}", pc),
                    word = format_args!("{:#010x}", word),
                    "unknown instruction, skipping"
                );
                Flow::Next
            }
        };

        Ok(flow)
    }

    pub fn print_state(&self) {
        eprintln!("{}", "Registers:".bright_blue());
        for (i, x) in self.registers.as_slice().iter().enumerate() {
            eprint!("{:>5}: {:08x} ", REGVEC[i].bright_blue(), x);
            if i % 4 == 3 {
                eprintln!();
            }
        }
        eprintln!("{:>5}: {:08x}", "pc".bright_blue(), self.pc);

        eprintln!("{}", "CSRs:".bright_blue());
        eprintln!("{:?}", self.csrs);

        match &self.state {
            State::Running => eprintln!("{}", "running".bright_green()),
            State::Halted(halt) if halt.is_fault() => eprintln!("{}", halt.bright_red()),
            State::Halted(halt) => eprintln!("{}", halt.bright_green()),
        }
    }
}

fn alu(op: ROp, a: u32, b: u32) -> u32 {
    use ROp::*;
    match op {
        Add => a.wrapping_add(b),
        Sub => a.wrapping_sub(b),
        Sll => a << (b & 0x1f),
        Slt => ((a as i32) < (b as i32)) as u32,
        Sltu => (a < b) as u32,
        Xor => a ^ b,
        Srl => a >> (b & 0x1f),
        Sra => ((a as i32) >> (b & 0x1f)) as u32,
        Or => a | b,
        And => a & b,
    }
}

fn alu_imm(op: ImmOp, a: u32, imm: i32) -> u32 {
    use ImmOp::*;
    let b = imm as u32;
    match op {
        Addi => a.wrapping_add(b),
        Slti => ((a as i32) < imm) as u32,
        Sltiu => (a < b) as u32,
        Xori => a ^ b,
        Ori => a | b,
        Andi => a & b,
        Slli => a << (b & 0x1f),
        Srli => a >> (b & 0x1f),
        Srai => ((a as i32) >> (b & 0x1f)) as u32,
    }
}
