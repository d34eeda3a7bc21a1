//! # wikirdf
//!
//! CLI and HTTP front ends over [`wikirdf_core`].
//!
//! - [`cli`]: `export`, `expand`, `namespaces` and `server` commands
//! - [`api`]: axum router serving the same operations over HTTP

pub mod api;
pub mod cli;
