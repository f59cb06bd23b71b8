//! EV Parts Trace Library
//!
//! Normalizes inventory movements from the warranty backend, aggregates them
//! for the ledger and groups them into per-part traceability records for a VIN.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod client;
pub mod common;
pub mod config;
pub mod display;
pub mod errors;
pub mod models;
pub mod services;

pub use client::{HttpMovementApi, MovementApi};
pub use common::{DateRange, LedgerFilter, VinQuery};
pub use config::{load_config, AppConfig, AppConfigError};
pub use errors::ServiceError;
pub use models::{Lot, Movement, PageMeta, PartTraceRecord, Summary, VinTraceReport};
pub use services::{
    aggregate, group_by_vin, normalize, unwrap_envelope, Aggregator, CenterDirectory,
    LedgerPage, LedgerService, TraceabilityService,
};
