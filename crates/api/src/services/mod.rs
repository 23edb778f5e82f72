//! Operations that span the record store and object storage.
//!
//! Handlers stay thin: they extract the caller's identity and inputs, call
//! into these modules, and wrap the outcome in a response. Every function
//! takes the store and storage as trait objects so tests can substitute
//! failing backends.

pub mod prompts;
pub mod results;
pub mod sharing;
pub mod tag_linking;
