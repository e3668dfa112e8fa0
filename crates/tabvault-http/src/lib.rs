//! # Tabvault HTTP
//!
//! Axum runtime exposing Tabvault's insert, backup, restore and view-report
//! operations over HTTP. Store work is blocking SQLite I/O and runs on
//! tokio's blocking pool; request handlers only parse, dispatch and map
//! errors to responses.

pub mod runtime;

pub use runtime::*;
