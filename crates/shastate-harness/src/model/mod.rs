//! Reference model for model-based testing.
//!
//! The model is a deliberately naive implementation: it keeps every absorbed
//! byte and recomputes outputs from scratch with independent SHA-2 and HMAC
//! implementations. It serves as the oracle against which the real handles
//! are verified.
//!
//! # Design Principles
//!
//! - Simplicity: The model should be obviously correct
//! - No snapshots: export and import are identity operations in the model
//! - Deterministic: Same inputs produce same outputs

pub mod operation;
mod world;

pub use operation::{
    ModelAlgorithm, Operation, OperationError, OperationResult, SlotId, SlotKind, SmallChunk,
    initial_key,
};
pub use world::{ModelWorld, ObservableState};
