//! Presentation of ranked results on the terminal

pub mod report;

pub use report::{format_currency, Report};
