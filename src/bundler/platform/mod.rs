//! Platform-specific packaging.
//!
//! The only target is a Windows self-extracting installer, which is built on
//! any host.

pub mod windows;
