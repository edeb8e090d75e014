//! Authenticated RPC client for the target notebook application.
//!
//! This module provides the [`RpcClient`] which issues batched-execute
//! calls using the [`crate::wire`] codec, manages session-token acquisition
//! with a single-flight refresh, and bounds every call with a timeout.
//!
//! # Architecture
//!
//! - [`RpcClient`] - HTTP client wrapper holding the session state
//! - [`RpcEndpoint`] - Configurable endpoint description (tests point this at a mock server)
//! - [`ProcedureId`] - The table of known remote procedures
//! - [`classify_rpc_code`] - Benign/fatal classification of inline error codes

mod client;
mod error;
mod procedure;

pub use client::{DEFAULT_CALL_TIMEOUT_SECS, RpcClient, RpcEndpoint};
pub use error::RpcError;
pub use procedure::{BENIGN_RPC_CODES, ProcedureId, RpcCodeClass, classify_rpc_code};
