//! setupscan core — bars, indicators, setup classification and scoring.
//!
//! This crate contains the signal engine:
//! - Domain types (bars, trades)
//! - Indicator Engine: SMA, RSI, rolling high and average volume, enriched series
//! - Setup Classifier with fixed priority order and the bounded Setup Scorer
//! - Data provider seam (Yahoo Finance, CSV, in-memory) and candidate universe
//! - Deterministic RNG for reproducible candidate shuffles

pub mod data;
pub mod domain;
pub mod enrich;
pub mod indicators;
pub mod rng;
pub mod setup;

pub use enrich::{enrich, EnrichError, EnrichedBar, EnrichedSeries, MIN_BARS};
pub use setup::{classify, describe_setup, is_valid_setup, score, Setup, SetupFlags};
