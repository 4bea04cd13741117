//! Relational transforms over the wide HPI series.

pub mod appreciation;

pub use appreciation::{appreciation, default_date_pair, percent_change, round_to, year_before};
