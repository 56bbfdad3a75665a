#![doc(test(attr(deny(warnings))))]

//! Meter Ledger tracks monthly meter readings and sales per entity: a pure
//! engine derives consumption, sales, and balances, and a flat CSV store keeps
//! one file per billing period.

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod errors;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Meter Ledger tracing initialized.");
    });
}
