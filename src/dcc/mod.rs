//! DCC packet assembly and interpretation
//!
//! This module provides the protocol side of the decoder:
//! 1. Assemble classified bits into framed packets (preamble, data bytes,
//!    end marker)
//! 2. Route the address byte and decode the instruction that follows
//! 3. Verify the XOR checksum
//!
//! All results are emitted as positioned [`Annotation`] records.

mod assembler;
mod checksum;
mod interpreter;
mod types;

pub use assembler::{AssemblerStats, DecoderState, PacketAssembler};
pub use checksum::{verify_checksum, xor_checksum};
pub use interpreter::interpret;
pub use types::{Annotation, AnnotationRow, DecodedByte, Packet};
