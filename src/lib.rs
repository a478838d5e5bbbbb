//! Probe candidate package mirrors for real download throughput and rank
//! the survivors.

pub mod catalog;
pub mod config;
pub mod error;
pub mod probe;
pub mod rank;
pub mod runner;
pub mod session;
pub mod sources;
pub mod types;
pub mod window;
