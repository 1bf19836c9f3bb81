//! # Almacén de Jobs
//! src/jobs/store.rs
//!
//! Tabla en memoria id → estado. Los jobs nunca se borran: viven lo que
//! vive el proceso.
//!
//! ## Sincronización
//!
//! - El `RwLock` del mapa sólo protege la membresía (crear / buscar).
//! - Cada `JobSlot` tiene su propio `Mutex<JobState>`, de modo que
//!   completar o leer un job no bloquea a los demás más allá del lookup.

use crate::error::JobError;
use crate::jobs::types::JobState;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Estado de un único job
///
/// El worker recibe un `Arc<JobSlot>` para hacer la única mutación
/// permitida (Pending → Complete) sin volver a pasar por el mapa.
#[derive(Debug)]
pub struct JobSlot {
    id: u64,
    state: Mutex<JobState>,
}

impl JobSlot {
    fn new(id: u64) -> Self {
        Self {
            id,
            state: Mutex::new(JobState::Pending),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Copia del estado actual
    pub fn state(&self) -> JobState {
        self.state.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Transición Pending → Complete
    ///
    /// Una segunda llamada no toca el estado y retorna `AlreadyComplete`.
    pub fn complete(&self, result: String) -> Result<(), JobError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.is_complete() {
            return Err(JobError::AlreadyComplete(self.id));
        }
        *state = JobState::Complete(result);
        Ok(())
    }
}

/// Almacén thread-safe de jobs
#[derive(Debug, Default)]
pub struct JobStore {
    jobs: RwLock<HashMap<u64, Arc<JobSlot>>>,
}

impl JobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserta un job nuevo en estado Pending
    pub fn create(&self, id: u64) -> Result<Arc<JobSlot>, JobError> {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        if jobs.contains_key(&id) {
            return Err(JobError::DuplicateJob(id));
        }

        let slot = Arc::new(JobSlot::new(id));
        jobs.insert(id, Arc::clone(&slot));
        Ok(slot)
    }

    /// Estado de un job; `None` si el id nunca se creó
    pub fn get(&self, id: u64) -> Option<JobState> {
        self.slot(id).map(|slot| slot.state())
    }

    /// Completa un job buscándolo por id
    pub fn complete(&self, id: u64, result: String) -> Result<(), JobError> {
        self.slot(id)
            .ok_or(JobError::UnknownJob(id))?
            .complete(result)
    }

    /// Cantidad de jobs creados
    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, id: u64) -> Option<Arc<JobSlot>> {
        let jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_create_is_pending() {
        let store = JobStore::new();
        let slot = store.create(1).unwrap();

        assert_eq!(slot.id(), 1);
        assert_eq!(store.get(1), Some(JobState::Pending));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unknown_id() {
        let store = JobStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get(99), None);
    }

    #[test]
    fn test_duplicate_create() {
        let store = JobStore::new();
        store.create(1).unwrap();

        assert!(matches!(store.create(1), Err(JobError::DuplicateJob(1))));
    }

    #[test]
    fn test_complete_by_id() {
        let store = JobStore::new();
        store.create(3).unwrap();
        store.complete(3, "digest".to_string()).unwrap();

        assert_eq!(store.get(3), Some(JobState::Complete("digest".to_string())));
    }

    #[test]
    fn test_complete_unknown() {
        let store = JobStore::new();
        assert!(matches!(
            store.complete(5, "x".to_string()),
            Err(JobError::UnknownJob(5))
        ));
    }

    #[test]
    fn test_second_complete_keeps_first_result() {
        let store = JobStore::new();
        let slot = store.create(1).unwrap();
        slot.complete("first".to_string()).unwrap();

        assert!(matches!(
            slot.complete("second".to_string()),
            Err(JobError::AlreadyComplete(1))
        ));
        assert_eq!(store.get(1), Some(JobState::Complete("first".to_string())));
    }

    #[test]
    fn test_slot_and_store_share_state() {
        let store = JobStore::new();
        let slot = store.create(2).unwrap();
        slot.complete("via-slot".to_string()).unwrap();

        assert_eq!(store.get(2).unwrap().result(), Some("via-slot"));
    }

    #[test]
    fn test_readers_never_see_partial_completion() {
        let store = Arc::new(JobStore::new());
        let slot = store.create(1).unwrap();
        let expected = "x".repeat(88);

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let store = Arc::clone(&store);
                let expected = expected.clone();
                thread::spawn(move || {
                    let mut seen_complete = false;
                    for _ in 0..10_000 {
                        match store.get(1).unwrap() {
                            JobState::Pending => {
                                // Monótono: una vez completo no vuelve a Pending
                                assert!(!seen_complete);
                            }
                            JobState::Complete(result) => {
                                assert_eq!(result, expected);
                                seen_complete = true;
                            }
                        }
                    }
                })
            })
            .collect();

        slot.complete(expected.clone()).unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
        assert!(store.get(1).unwrap().is_complete());
    }
}
