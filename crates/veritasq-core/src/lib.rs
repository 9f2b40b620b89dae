#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Shared models and parsing logic for the VeritasQ validation client.
//!
//! This crate is pure data: no I/O, no async. It defines the request and
//! report shapes exchanged with the remote compliance space, normalizes the
//! loosely-typed dataframe payload the space returns, and converts the raw
//! reply tuple into a typed [`ValidationReport`].

pub mod model;
pub mod reply;
pub mod table;

pub use model::{
    ClauseResult, DocumentFile, ValidationReport, ValidationRequest, Verdict, VerdictTally,
    DEFAULT_K_PER_CHECK, DEFAULT_MODEL_NAME,
};
pub use reply::{ArtifactRef, ReplyError, ReplyParts};
pub use table::Table;
