//! # zkattend-core
//!
//! Core protocol implementation for biometric time-attendance terminals.
//!
//! This crate provides the low-level protocol primitives:
//! - Frame structure and encoding/decoding
//! - Checksum calculation
//! - Command and reply code definitions
//! - Response reassembly across socket reads
//! - Session counters and connection lifecycle states

pub mod checksum;
pub mod command;
pub mod constants;
pub mod error;
pub mod frame;
pub mod reassembly;
pub mod session;

pub use command::{Command, ReplyCode};
pub use error::{Error, ErrorCode, Result};
pub use frame::{Frame, FrameHeader, Inbound};
pub use reassembly::{Progress, Reassembler, Reply};
pub use session::{ConnectionState, Session};
