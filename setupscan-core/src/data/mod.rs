//! Price-history providers and the candidate universe.

pub mod circuit_breaker;
pub mod csv_import;
pub mod provider;
pub mod synthetic;
pub mod universe;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use csv_import::CsvProvider;
pub use provider::{DataError, DataProvider, Interval, MemoryProvider, Period, SchemaError};
pub use synthetic::SyntheticProvider;
pub use universe::{CandidateSource, PriceFilter, StaticUniverse, UniverseError, PRICE_THRESHOLD};
pub use yahoo::YahooProvider;
