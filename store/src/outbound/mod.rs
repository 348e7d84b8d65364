//! Outbound adapters implementing domain ports.
//!
//! - **http**: reqwest client for the remote recipe collection.
//! - **storage**: snapshot stores backed by a directory or by memory.
//!
//! Adapters translate between domain types and their transport or storage
//! representation. They contain no business logic.

pub mod http;
pub mod storage;
