//! Outbound (driven) adapters: persistence, blob storage, and security.

pub mod persistence;
pub mod security;
pub mod storage;
