//! Model-based test harness for `shastate-core`.
//!
//! The `model` module provides a reference implementation, and [`RealWorld`]
//! drives the actual handles. Operations are applied to both and their
//! results and observable states are compared.
//!
//! ```text
//! proptest / cargo-fuzz generates: Vec<Operation>
//!                          │
//!           ┌──────────────┼──────────────┐
//!           ▼              ▼              ▼
//!      ModelWorld     RealWorld        Compare
//!      (sha2/hmac)    (shastate)       Results
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod model;
mod real;

pub use model::{
    ModelAlgorithm, ModelWorld, ObservableState, Operation, OperationError, OperationResult,
    SlotId, SlotKind, SmallChunk, initial_key,
};
pub use real::RealWorld;
