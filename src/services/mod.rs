//! Store access and the migration itself.

#[cfg(test)]
pub mod memory_store;
pub mod migrator;
pub mod object_store;
pub mod s3_store;
