//! `hpa-map` library crate.
//!
//! The binary (`hpa`) is a thin wrapper around this library so that:
//!
//! - the appreciation transform and join are testable without network access
//! - providers can be swapped for fixtures (files, in-memory fakes)
//! - rendering stays separate from the relational steps

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod join;
pub mod logging;
pub mod render;
pub mod report;
pub mod transform;
