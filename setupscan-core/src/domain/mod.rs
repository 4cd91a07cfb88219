//! Domain types for setupscan

pub mod bar;
pub mod trade;

pub use bar::{is_chronological, Bar};
pub use trade::Trade;

/// Symbol type alias
pub type Symbol = String;
