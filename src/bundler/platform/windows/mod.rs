//! Windows installer output: SFX construction and Authenticode signing.

pub mod sfx;
pub mod sign;
