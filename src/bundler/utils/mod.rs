//! Shared helpers for filesystem access and external tool execution.

pub mod fs;
pub mod process;
