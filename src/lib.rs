//! Library exports for authgate, shared between the binary and tests.

pub mod config;
pub mod gate;
pub mod lookup;
pub mod metrics;
pub mod models;
pub mod navigation;
pub mod routes;
pub mod startup;
pub mod state;
pub mod utils;
