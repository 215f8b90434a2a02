//! Swap transaction construction
//!
//! The construction side of the pipeline, split into focused modules:
//! - **instructions**: pool quoting and instruction building via the Orca SDK
//! - **assembler**: versioned message assembly with blockhash lifetime
//! - **envelope**: partial signing and the custody request body

pub mod assembler;
pub mod envelope;
pub mod instructions;

pub use assembler::assemble_transaction_message;
pub use envelope::{partially_sign, CreateTransactionRequest, SignedEnvelope};
pub use instructions::{build_swap_instructions, BuiltSwap};
