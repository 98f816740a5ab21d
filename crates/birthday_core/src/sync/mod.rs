//! Cloud blob sync.
//!
//! # Responsibility
//! - Encode the record list as the JSON document stored per user.
//! - Push local state up and pull remote state down through `BlobStore`.
//!
//! # Invariants
//! - Pull replaces local state wholesale; there is no merge.
//! - A missing remote document means an empty list.

pub mod blob;
