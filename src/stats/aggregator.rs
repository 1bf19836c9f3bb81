//! # Agregador de Estadísticas
//! src/stats/aggregator.rs
//!
//! Lleva la cuenta de jobs completados y el promedio de latencia en
//! microsegundos. Se guarda la suma exacta junto al total (sin historial
//! de latencias) y el promedio truncado se recalcula en cada `record`.

use serde::Serialize;
use std::sync::{Mutex, PoisonError};

/// Snapshot consistente de las estadísticas
///
/// Se serializa tal cual como body de `GET /stats`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Jobs completados
    pub total: u64,

    /// Promedio truncado de latencia (microsegundos)
    pub average: u64,
}

/// Estado protegido por el lock
#[derive(Debug, Default)]
struct StatsData {
    /// Suma exacta de latencias; en u128 no desborda con u64::MAX * u64::MAX
    sum: u128,
    snapshot: StatsSnapshot,
}

/// Agregador thread-safe
///
/// `record` y `snapshot` toman el mismo lock, así que nunca se observa un
/// par (total, average) a medio actualizar.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    inner: Mutex<StatsData>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra la latencia de un job completado
    ///
    /// `average = floor(sum / total)`, independiente del orden de llamada.
    ///
    /// ```
    /// use hash_server::stats::StatsAggregator;
    ///
    /// let stats = StatsAggregator::new();
    /// stats.record(10);
    /// stats.record(15);
    /// assert_eq!(stats.snapshot().average, 12);
    /// ```
    pub fn record(&self, latency_micros: u64) {
        let mut data = self.inner.lock().unwrap_or_else(PoisonError::into_inner);

        data.sum += latency_micros as u128;
        data.snapshot.total += 1;
        data.snapshot.average = (data.sum / data.snapshot.total as u128) as u64;
    }

    /// Lectura atómica del par (total, average)
    pub fn snapshot(&self) -> StatsSnapshot {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_empty_snapshot() {
        let stats = StatsAggregator::new();
        assert_eq!(stats.snapshot(), StatsSnapshot { total: 0, average: 0 });
    }

    #[test]
    fn test_single_record() {
        let stats = StatsAggregator::new();
        stats.record(5_000_123);

        assert_eq!(stats.snapshot(), StatsSnapshot { total: 1, average: 5_000_123 });
    }

    #[test]
    fn test_average_truncates() {
        let stats = StatsAggregator::new();
        stats.record(1);
        stats.record(2);

        // (1 + 2) / 2 = 1.5 -> 1
        assert_eq!(stats.snapshot().average, 1);
    }

    #[test]
    fn test_matches_floor_of_mean() {
        let stats = StatsAggregator::new();
        let latencies = [5_000_001u64, 5_000_250, 5_001_999, 5_000_000];
        for latency in latencies {
            stats.record(latency);
        }

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.total, 4);
        assert_eq!(snapshot.average, latencies.iter().sum::<u64>() / 4);
    }

    #[test]
    fn test_truncation_is_not_carried_over() {
        let stats = StatsAggregator::new();
        stats.record(1);
        stats.record(2);
        stats.record(3);

        assert_eq!(stats.snapshot(), StatsSnapshot { total: 3, average: 2 });
    }

    #[test]
    fn test_order_does_not_change_average() {
        let forward = StatsAggregator::new();
        let backward = StatsAggregator::new();
        let latencies = [7u64, 1, 1, 4, 9, 2];

        for latency in latencies {
            forward.record(latency);
        }
        for latency in latencies.iter().rev() {
            backward.record(*latency);
        }

        assert_eq!(forward.snapshot(), backward.snapshot());
        assert_eq!(forward.snapshot().average, 24 / 6);
    }

    #[test]
    fn test_concurrent_distinct_latencies() {
        let stats = Arc::new(StatsAggregator::new());
        let mut handles = Vec::new();

        for t in 0..8u64 {
            let stats = Arc::clone(&stats);
            handles.push(thread::spawn(move || {
                for i in 0..250u64 {
                    stats.record(5_000_000 + t * 1_000 + i * 7);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        let sum: u64 = (0..8u64)
            .flat_map(|t| (0..250u64).map(move |i| 5_000_000 + t * 1_000 + i * 7))
            .sum();
        assert_eq!(stats.snapshot(), StatsSnapshot { total: 2_000, average: sum / 2_000 });
    }

    #[test]
    fn test_concurrent_records() {
        let stats = Arc::new(StatsAggregator::new());
        let mut handles = Vec::new();

        // Todas las latencias iguales: el promedio no depende del orden
        for _ in 0..8 {
            let stats = Arc::clone(&stats);
            handles.push(thread::spawn(move || {
                for _ in 0..250 {
                    stats.record(4_200);
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(stats.snapshot(), StatsSnapshot { total: 2_000, average: 4_200 });
    }

    #[test]
    fn test_large_latencies_do_not_overflow() {
        let stats = StatsAggregator::new();
        stats.record(u64::MAX);
        stats.record(u64::MAX);

        assert_eq!(stats.snapshot().average, u64::MAX);
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_string(&StatsSnapshot { total: 1, average: 5 }).unwrap();
        assert_eq!(json, r#"{"total":1,"average":5}"#);
    }
}
