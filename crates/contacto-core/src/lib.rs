//! Core types and trait definitions for the Contacto contact store.
//!
//! No HTTP or database dependencies; every other crate builds on this one.

pub mod contact;
pub mod error;
pub mod patch;
pub mod query;
pub mod store;

pub use error::{Error, Result};
