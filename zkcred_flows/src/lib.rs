//! Orchestration layer for an anonymous-credential protocol.
//!
//! The cryptography (signatures, zero-knowledge proofs, accumulator math)
//! lives behind the [`engine::ProofEngine`] trait; this crate assembles the
//! structured requests that drive it: issuance flows, the revocation ledger
//! with its append-only delta chain, multi-credential presentation building
//! and verification context reconstruction.

pub mod errors;

pub mod engine;
pub mod issuance;
pub mod loader;
pub mod presentation;
pub mod revocation;
pub mod verification;
