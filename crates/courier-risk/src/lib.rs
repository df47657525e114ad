//! Phone-number risk lookups for Bangladeshi courier delivery history.
//!
//! [`checks`] holds the pure normalization and scoring core. [`lookup`] wires it to the
//! upstream courier lookup service and exposes it over HTTP.

pub mod checks;
pub mod config;
pub mod error;
pub mod lookup;
pub mod telemetry;
