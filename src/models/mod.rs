//! Data types shared by the store backends and the migrator.

pub mod fingerprint_key;
pub mod listing;
