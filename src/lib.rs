//!
//! framerv emulates an RV32I processor whose address space has a framebuffer mapped right after
//! main memory. Programs draw by storing ARGB words to it and present a frame by storing anything
//! to the swap port that follows it.
//!
//! The [Simulator](simulator::Simulator) runs on one thread and only writes the back buffer of
//! the [FrameBuffer](framebuffer::FrameBuffer); the [render loop](gpu::RenderLoop) or the
//! [window](renderer) runs on another one and only reads the front buffer.
//!
//! The simulator doesn't try to model a real core. There are no traps, no privilege levels and no
//! CSRs with side effects, and words it can't decode are skipped. Unaligned accesses are fine.
//!

pub mod config;
pub mod decoder;
pub mod error;
pub mod framebuffer;
pub mod gpu;
pub mod instruction;
pub mod loader;
pub mod register_names;
pub mod renderer;
pub mod simulator;
pub mod stop;
