//! # UGC Janitor Core
//!
//! Shared, runtime-free logic for UGC Janitor: the item model, the
//! repository collaborator traits, an in-memory backing store, and the
//! same-page redundancy filter used by the cleanup job.
//!
//! This crate contains no tokio, HTTP, or filesystem dependencies. The
//! batch loop, pacing clock, and job supervision live in the `ugc-janitor`
//! application crate.

pub mod filter;
pub mod models;
pub mod store;
