//! Bid-correlation and session-state core for the bidtrace header-bidding
//! adapter.
//!
//! This crate turns a header-bidding auction's per-slot bid requests into a
//! single outbound GET query and reconciles the asynchronous server
//! response back to the originating bid identifiers. Transport mechanics,
//! creative rendering and auction scheduling are the orchestrator's
//! concern.
//!
//! # Modules
//!
//! - [`adapter`]: Session context and request parameter builder
//! - [`codec`]: Delimited slot name/size string codec
//! - [`constants`]: Adapter version, TTL policy, wire and cookie keys
//! - [`cookies`]: Cookie parsing and `Set-Cookie` formatting
//! - [`correlation`]: Per-round bid id correlation map
//! - [`error`]: Error types for the fallible boundaries
//! - [`ids`]: Collision-resistant, time-sortable identifiers
//! - [`models`]: Orchestrator-facing request/response data models
//! - [`response`]: Server response interpretation
//! - [`settings`]: Configuration management
//! - [`sizes`]: Tagged size variants decided at the input boundary
//! - [`store`]: Persistent key/value state store with per-key TTL
//! - [`test_support`]: Testing fixtures

pub mod adapter;
pub mod codec;
pub mod constants;
pub mod cookies;
pub mod correlation;
pub mod error;
pub mod ids;
pub mod models;
pub mod response;
pub mod settings;
pub mod sizes;
pub mod store;
pub mod test_support;
