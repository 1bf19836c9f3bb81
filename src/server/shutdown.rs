//! # Coordinador de Shutdown
//! src/server/shutdown.rs
//!
//! Cuenta las conexiones en curso y permite esperar a que lleguen a cero
//! antes de salir. Los workers de hashing no se cuentan: si el proceso
//! termina, los jobs pendientes se pierden.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Contador de operaciones en curso
#[derive(Debug, Default)]
pub struct ShutdownCoordinator {
    in_flight: Mutex<usize>,
    idle: Condvar,
}

impl ShutdownCoordinator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Marca el inicio de una operación; el guard la cierra al soltarse
    pub fn enter(self: &Arc<Self>) -> InFlightGuard {
        let mut count = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *count += 1;
        InFlightGuard {
            coordinator: Arc::clone(self),
        }
    }

    /// Operaciones todavía en curso
    pub fn in_flight(&self) -> usize {
        *self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bloquea hasta que no quede ninguna operación en curso
    pub fn wait_idle(&self) {
        let count = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let _idle = self
            .idle
            .wait_while(count, |count| *count > 0)
            .unwrap_or_else(PoisonError::into_inner);
    }

    /// Como `wait_idle` pero con límite; retorna `true` si se drenó a tiempo
    pub fn wait_idle_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);

        while *count > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return false;
            }
            count = self
                .idle
                .wait_timeout(count, remaining)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }

    fn leave(&self) {
        let mut count = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }
}

/// Guard RAII de una operación en curso
#[derive(Debug)]
pub struct InFlightGuard {
    coordinator: Arc<ShutdownCoordinator>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.coordinator.leave();
    }
}

/// Bandera compartida que pide detener el accept loop
#[derive(Debug, Clone, Default)]
pub struct ShutdownHandle {
    triggered: Arc<AtomicBool>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pide el shutdown (idempotente)
    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_guard_counts() {
        let coordinator = ShutdownCoordinator::new();
        assert_eq!(coordinator.in_flight(), 0);

        let a = coordinator.enter();
        let b = coordinator.enter();
        assert_eq!(coordinator.in_flight(), 2);

        drop(a);
        assert_eq!(coordinator.in_flight(), 1);
        drop(b);
        assert_eq!(coordinator.in_flight(), 0);
    }

    #[test]
    fn test_wait_idle_returns_immediately_when_idle() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.wait_idle();
        assert!(coordinator.wait_idle_timeout(Duration::ZERO));
    }

    #[test]
    fn test_wait_idle_blocks_until_guards_drop() {
        let coordinator = ShutdownCoordinator::new();
        let guard = coordinator.enter();

        let worker = thread::spawn(move || {
            thread::sleep(Duration::from_millis(100));
            drop(guard);
        });

        let start = Instant::now();
        coordinator.wait_idle();
        assert!(start.elapsed() >= Duration::from_millis(90));
        assert_eq!(coordinator.in_flight(), 0);

        worker.join().unwrap();
    }

    #[test]
    fn test_wait_idle_timeout_expires() {
        let coordinator = ShutdownCoordinator::new();
        let _guard = coordinator.enter();

        assert!(!coordinator.wait_idle_timeout(Duration::from_millis(50)));
        assert_eq!(coordinator.in_flight(), 1);
    }

    #[test]
    fn test_handle_trigger() {
        let handle = ShutdownHandle::new();
        let clone = handle.clone();
        assert!(!handle.is_triggered());

        clone.trigger();
        assert!(handle.is_triggered());
    }
}
