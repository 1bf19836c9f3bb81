//! # Sistema de Jobs
//!
//! Hashing diferido de passwords: cada submit recibe un id, un job
//! pendiente y un worker propio que lo completa pasado `HASH_DELAY`.
//!
//! ## Endpoints
//!
//! - `POST /hash` - Encolar un password
//! - `GET /hash/{id}` - Consultar el resultado
//! - `GET /stats` - Total y latencia promedio

pub mod handlers;
pub mod id;
pub mod manager;
pub mod store;
pub mod types;
pub mod worker;

pub use id::IdAllocator;
pub use manager::{JobManager, Submission};
pub use store::{JobSlot, JobStore};
pub use types::{JobState, JobStatus};
pub use worker::{HashWorker, HASH_DELAY};
