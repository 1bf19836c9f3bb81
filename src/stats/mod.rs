//! # Estadísticas de Hashing
//!
//! Cantidad de jobs completados y latencia promedio, expuestas en `/stats`.

pub mod aggregator;

pub use aggregator::{StatsAggregator, StatsSnapshot};
