//! Cache Module
//!
//! Key-value cache wrapper with call counting, call history and replay.

mod history;
mod instrument;
mod value;
mod wrapper;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use history::{replay, BoundOperation, CallRecord};
pub use instrument::{inputs_key, outputs_key, CallHistory, CallHook, CountCalls, Instrumented};
pub use value::CacheValue;
pub use wrapper::{decode_int, decode_utf8, Cache, STORE_OPERATION};
