//! Resumable SHA-2 digests
//!
//! This crate provides streaming SHA-256 and SHA-512 digests whose complete
//! internal state can be exported to bytes and imported again later, possibly
//! in another process.
//!
//! # Design
//!
//! Every digest is a handle implementing [`StatefulDigest`]:
//!
//! - `update`: absorb more input, in chunks of any size
//! - `finish`: pad, produce the digest, and reset the handle
//! - `export_state`: snapshot the running state as a [`StateSnapshot`]
//! - `import_state`: replace the running state with a validated snapshot
//! - `scrub`: wipe the running state and return to the initial state
//!
//! Block compression is delegated to the `sha2` crate. This crate owns the
//! buffering, padding and the snapshot format, which keeps the state layout
//! stable and inspectable.
//!
//! # Security Properties
//!
//! - State wiping: handles, snapshots and temporary key material are zeroized
//!   on drop and on `scrub`
//! - No secret logging: `Debug` output and tracing events never contain
//!   buffered input, chaining values or keys
//! - Validated import: malformed snapshots are rejected without touching the
//!   handle
//!
//! # Example
//!
//! ```
//! use shastate_core::{Sha256, StatefulDigest};
//!
//! let mut first = Sha256::new();
//! first.update(b"hello ");
//! let snapshot = first.export_state();
//!
//! let mut second = Sha256::new();
//! second.import_state(snapshot.as_bytes())?;
//! second.update(b"world");
//!
//! assert_eq!(second.finish(), Sha256::digest(b"hello world"));
//! # Ok::<(), shastate_core::StateError>(())
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod algorithm;
mod any;
mod engine;
mod error;
mod handle;
pub mod hmac;
pub mod io;
pub mod state;

pub use algorithm::{Algorithm, AlgorithmId, Sha256Algorithm, Sha512Algorithm, Word};
pub use any::AnyDigest;
pub use error::{StateError, UnknownAlgorithm};
pub use handle::{Hasher, Sha256, Sha512, StatefulDigest};
pub use hmac::{Hmac, HmacSha256, HmacSha512};
pub use state::StateSnapshot;
