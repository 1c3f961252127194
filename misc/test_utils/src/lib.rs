//! Test support for the zkcred workspace: an in-process [`ProofEngine`]
//! backed by hash commitments instead of real zero-knowledge crypto, plus a
//! shared test logger.
//!
//! [`ProofEngine`]: zkcred_flows::engine::ProofEngine

pub mod logger;
pub mod mock_engine;

pub use logger::init_logger;
pub use mock_engine::MockProofEngine;
