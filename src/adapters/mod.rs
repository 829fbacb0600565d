//! Concrete implementations of the storage and hashing ports.

pub mod bcrypt;
pub mod memory;
