//! # Errores del Servicio
//! src/error.rs

use thiserror::Error;

/// Errores del ciclo de vida de un job
///
/// Salvo `Spawn`, todos indican un error de programación: el flujo normal
/// crea cada id una sola vez y lo completa un único worker.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job {0} already exists")]
    DuplicateJob(u64),

    #[error("Job not found: {0}")]
    UnknownJob(u64),

    #[error("Job {0} is already complete")]
    AlreadyComplete(u64),

    #[error("Failed to spawn hash worker: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Errores al levantar o correr el servidor
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid route pattern: {0}")]
    Route(#[from] regex::Error),

    #[error("Failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
