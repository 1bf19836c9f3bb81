//! # Asignador de IDs
//! src/jobs/id.rs
//!
//! Emite ids de job estrictamente crecientes, sin huecos ni repetidos,
//! empezando en 1.

use std::sync::{Mutex, PoisonError};

/// Contador protegido por mutex
///
/// Incrementar y leer el nuevo valor ocurre dentro de la misma sección
/// crítica: dos llamadas concurrentes nunca ven el mismo id.
#[derive(Debug, Default)]
pub struct IdAllocator {
    counter: Mutex<u64>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Siguiente id
    ///
    /// ```
    /// use hash_server::jobs::IdAllocator;
    ///
    /// let ids = IdAllocator::new();
    /// assert_eq!(ids.next_id(), 1);
    /// assert_eq!(ids.next_id(), 2);
    /// ```
    pub fn next_id(&self) -> u64 {
        let mut counter = self.counter.lock().unwrap_or_else(PoisonError::into_inner);
        *counter += 1;
        *counter
    }

    /// Último id emitido (0 si todavía no se emitió ninguno)
    pub fn last_issued(&self) -> u64 {
        *self.counter.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
