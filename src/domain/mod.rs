//! Core domain types and pure computation. No I/O happens here.

pub mod alignment;
pub mod asset_performance;
pub mod backtest;
pub mod benchmark;
pub mod config_validation;
pub mod error;
pub mod metrics;
pub mod portfolio;
pub mod price;
pub mod returns;
pub mod rolling;
pub mod schedule;
pub mod simulation;
pub mod stats;
pub mod strategy;
pub mod weights;
