//! Port traits for the I/O seams: price data in, reports out, configuration.

pub mod config_port;
pub mod data_port;
pub mod report_port;
