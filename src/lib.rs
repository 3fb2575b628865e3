//! Quotation Engine Library
//!
//! This crate prices and settles supplier quotations for institutional
//! food supply: tax-adjusted landed costs (DIFAL, IPI, value-proportional
//! freight), deterministic best-offer selection, savings analytics against
//! procurement baselines, and a serialized multi-stage approval workflow.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod commands;
pub mod config;
pub mod errors;
pub mod events;
pub mod ingest;
pub mod models;
pub mod pricing;
pub mod repositories;
pub mod services;
pub mod workflow;

pub mod prelude {
    pub use crate::commands::*;
    pub use crate::config::*;
    pub use crate::errors::*;
    pub use crate::events::*;
    pub use crate::ingest::*;
    pub use crate::models::*;
    // Note: models and pricing both contain a module named `summary`; the
    // calculators are re-exported individually to keep the globs unambiguous
    pub use crate::pricing::{
        build_comparative_analysis, build_comparative_analysis_with, build_economic_summary,
        build_economic_summary_with, compute_landed_costs, compute_landed_costs_with,
        select_best_offers, select_best_offers_with, BestOfferReport, CostReport, PRICE_TOLERANCE,
    };
    pub use crate::repositories::*;
    pub use crate::services::*;
    pub use crate::workflow::*;
}
