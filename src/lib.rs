#![doc(test(attr(deny(warnings))))]

//! NexusFinance tracks personal and small-business money: transactions,
//! projects, liquidity, team payroll, daily habits with XP leveling, and the
//! analytics built on top of them (Sankey cash flow, correlation matrices,
//! dashboards).

pub mod advisor;
pub mod analytics;
pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
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
        tracing::info!("NexusFinance tracing initialized.");
    });
}
