//! # Worker de Hashing
//! src/jobs/worker.rs
//!
//! Cada submit lanza un thread propio que espera `HASH_DELAY` (simula un
//! hash caro), calcula SHA-512 del password, lo codifica en base64
//! URL-safe y completa el job. Al terminar reporta su latencia al
//! agregador de estadísticas.
//!
//! No hay reintentos ni cancelación: un worker lanzado siempre corre
//! hasta el final (salvo que el proceso termine antes).

use crate::jobs::store::JobSlot;
use crate::stats::StatsAggregator;
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine;
use sha2::{Digest, Sha512};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Demora artificial antes de calcular el hash
pub const HASH_DELAY: Duration = Duration::from_secs(5);

/// SHA-512 del payload en base64 URL-safe (con padding)
///
/// ```
/// use hash_server::jobs::worker::digest;
///
/// assert_eq!(
///     digest("angryMonkey"),
///     "ZEHhWB65gUlzdVwtDQArEyx-KVLzp_aTaRaPlBzYRIFj6vjFdqEb0Q5B8zVKCZ0vKbZPZklJz0Fd7su2A-gf7Q=="
/// );
/// ```
pub fn digest(payload: &str) -> String {
    let hash = Sha512::digest(payload.as_bytes());
    URL_SAFE.encode(hash)
}

/// Lanza los threads de hashing
#[derive(Debug, Clone)]
pub struct HashWorker {
    stats: Arc<StatsAggregator>,
    delay: Duration,
}

impl HashWorker {
    /// Worker con la demora de producción
    pub fn new(stats: Arc<StatsAggregator>) -> Self {
        Self::with_delay(stats, HASH_DELAY)
    }

    /// Worker con otra demora (tests)
    pub fn with_delay(stats: Arc<StatsAggregator>, delay: Duration) -> Self {
        Self { stats, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Lanza el cálculo en un thread nuevo
    ///
    /// El handle se devuelve explícitamente: quien llama decide si lo
    /// espera (tests) o lo suelta (dispatcher).
    pub fn spawn(&self, slot: Arc<JobSlot>, password: String) -> std::io::Result<JoinHandle<()>> {
        let stats = Arc::clone(&self.stats);
        let delay = self.delay;

        thread::Builder::new()
            .name(format!("hash-worker-{}", slot.id()))
            .spawn(move || Self::run(&slot, &password, delay, &stats))
    }

    fn run(slot: &JobSlot, password: &str, delay: Duration, stats: &StatsAggregator) {
        // La latencia se mide desde el arranque del worker, demora incluida
        let start = Instant::now();
        debug!(job_id = slot.id(), delay_ms = delay.as_millis() as u64, "hash worker sleeping");

        thread::sleep(delay);

        info!(job_id = slot.id(), "computing hash request");
        let encoded = digest(password);

        if let Err(e) = slot.complete(encoded) {
            // Sin estado de error: el job queda como estaba
            error!(job_id = slot.id(), error = %e, "failed to complete job");
            return;
        }

        let latency_micros = start.elapsed().as_micros() as u64;
        stats.record(latency_micros);

        info!(job_id = slot.id(), latency_us = latency_micros, "hash request complete");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::store::JobStore;
    use crate::jobs::types::JobState;

    const ANGRY_MONKEY: &str =
        "ZEHhWB65gUlzdVwtDQArEyx-KVLzp_aTaRaPlBzYRIFj6vjFdqEb0Q5B8zVKCZ0vKbZPZklJz0Fd7su2A-gf7Q==";

    #[test]
    fn test_digest_known_value() {
        assert_eq!(digest("angryMonkey"), ANGRY_MONKEY);
    }

    #[test]
    fn test_digest_is_deterministic_and_url_safe() {
        let a = digest("some password");
        let b = digest("some password");

        assert_eq!(a, b);
        // 64 bytes -> 88 caracteres con padding
        assert_eq!(a.len(), 88);
        assert!(a.ends_with("=="));
        assert!(!a.contains('+') && !a.contains('/'));
    }

    #[test]
    fn test_digest_empty_password() {
        assert_eq!(digest("").len(), 88);
        assert_ne!(digest(""), digest(" "));
    }

    #[test]
    fn test_worker_completes_job_and_records_latency() {
        let store = JobStore::new();
        let stats = Arc::new(StatsAggregator::new());
        let worker = HashWorker::with_delay(Arc::clone(&stats), Duration::from_millis(20));

        let slot = store.create(1).unwrap();
        let handle = worker.spawn(slot, "angryMonkey".to_string()).unwrap();

        assert_eq!(store.get(1), Some(JobState::Pending));
        handle.join().unwrap();

        assert_eq!(store.get(1), Some(JobState::Complete(ANGRY_MONKEY.to_string())));
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total, 1);
        assert!(snapshot.average >= 20_000, "latency includes the delay");
    }

    #[test]
    fn test_already_complete_does_not_record() {
        let store = JobStore::new();
        let stats = Arc::new(StatsAggregator::new());
        let worker = HashWorker::with_delay(Arc::clone(&stats), Duration::ZERO);

        let slot = store.create(1).unwrap();
        slot.complete("earlier".to_string()).unwrap();
        worker.spawn(slot, "late".to_string()).unwrap().join().unwrap();

        assert_eq!(store.get(1).unwrap().result(), Some("earlier"));
        assert_eq!(stats.snapshot().total, 0);
    }

    #[test]
    fn test_default_delay() {
        let worker = HashWorker::new(Arc::new(StatsAggregator::new()));
        assert_eq!(worker.delay(), Duration::from_secs(5));
    }
}
