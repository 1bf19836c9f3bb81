//! # Gestor Central de Jobs
//! src/jobs/manager.rs
//!
//! Junta asignador de ids, almacén, worker y estadísticas. Se construye una
//! vez al arrancar y se inyecta en el dispatcher; los tests crean instancias
//! frescas con otra demora.

use crate::error::JobError;
use crate::jobs::id::IdAllocator;
use crate::jobs::store::JobStore;
use crate::jobs::types::JobState;
use crate::jobs::worker::HashWorker;
use crate::stats::{StatsAggregator, StatsSnapshot};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::info;

/// Resultado de encolar un password
#[derive(Debug)]
pub struct Submission {
    /// Id asignado al job
    pub id: u64,

    /// Thread del worker; soltarlo lo deja corriendo en segundo plano
    pub handle: JoinHandle<()>,
}

/// Gestor central de jobs
#[derive(Debug)]
pub struct JobManager {
    ids: IdAllocator,
    store: JobStore,
    stats: Arc<StatsAggregator>,
    worker: HashWorker,
}

impl JobManager {
    /// Gestor con la demora de producción (`HASH_DELAY`)
    pub fn new() -> Self {
        let stats = Arc::new(StatsAggregator::new());
        let worker = HashWorker::new(Arc::clone(&stats));
        Self::from_parts(stats, worker)
    }

    /// Gestor con una demora distinta
    pub fn with_delay(delay: Duration) -> Self {
        let stats = Arc::new(StatsAggregator::new());
        let worker = HashWorker::with_delay(Arc::clone(&stats), delay);
        Self::from_parts(stats, worker)
    }

    fn from_parts(stats: Arc<StatsAggregator>, worker: HashWorker) -> Self {
        Self {
            ids: IdAllocator::new(),
            store: JobStore::new(),
            stats,
            worker,
        }
    }

    /// Asigna id, crea el job Pending y lanza el worker
    ///
    /// Retorna apenas el worker quedó lanzado; nunca espera el hash.
    pub fn submit(&self, password: String) -> Result<Submission, JobError> {
        let id = self.ids.next_id();
        let slot = self.store.create(id)?;
        let handle = self.worker.spawn(slot, password)?;

        info!(job_id = id, "hash request accepted");
        Ok(Submission { id, handle })
    }

    /// Estado de un job; `None` si el id no existe
    pub fn lookup(&self, id: u64) -> Option<JobState> {
        self.store.get(id)
    }

    /// Snapshot de estadísticas
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Cantidad de jobs creados desde el arranque
    pub fn job_count(&self) -> usize {
        self.store.len()
    }

    /// Último id emitido
    pub fn last_id(&self) -> u64 {
        self.ids.last_issued()
    }
}

impl Default for JobManager {
    fn default() -> Self {
        Self::new()
    }
}
