//! Ownership-gated recipe cache with remote and local-only synchronisation.
//!
//! The [`domain`] module holds the record types, the session and the cache;
//! [`outbound`] provides the HTTP and snapshot-store adapters; [`config`]
//! loads the settings the `recipes` binary uses to wire them together.

pub mod config;
pub mod domain;
pub mod outbound;
