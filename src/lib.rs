//! ByteVault - A thread-safe in-memory key-value store
//!
//! This library provides a process-local store mapping string keys to byte
//! values with:
//! - Shared/exclusive locking (concurrent readers, exclusive writers)
//! - Copy-on-write and copy-on-read value isolation
//! - Nil values kept distinct from empty values and from absent keys

pub mod error;
pub mod store;
pub mod value;

pub use error::{Result, StoreError};
pub use store::Store;
pub use value::Value;
