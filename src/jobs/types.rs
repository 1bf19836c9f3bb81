//! # Tipos del Sistema de Jobs
//! src/jobs/types.rs

use serde::Serialize;

/// Estado de un job (sin el resultado), para los logs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    /// Esperando a que el worker termine
    Pending,

    /// Digest disponible
    Complete,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Complete => "complete",
        }
    }
}

/// Estado completo de un job
///
/// Status y resultado viven en el mismo valor: no existe un "Complete sin
/// digest" que un lector pueda llegar a ver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Complete(String),
}

impl JobState {
    pub fn status(&self) -> JobStatus {
        match self {
            JobState::Pending => JobStatus::Pending,
            JobState::Complete(_) => JobStatus::Complete,
        }
    }

    /// Digest codificado, si el job ya terminó
    pub fn result(&self) -> Option<&str> {
        match self {
            JobState::Pending => None,
            JobState::Complete(digest) => Some(digest),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, JobState::Complete(_))
    }
}

/// Body de la respuesta a `POST /hash`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubmitReceipt {
    pub id: u64,
}

/// Path donde el cliente consulta el resultado de un job
///
/// ```
/// assert_eq!(hash_server::jobs::types::locator(7), "/hash/7");
/// ```
pub fn locator(id: u64) -> String {
    format!("/hash/{}", id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_accessors() {
        let pending = JobState::Pending;
        assert_eq!(pending.status(), JobStatus::Pending);
        assert_eq!(pending.result(), None);
        assert!(!pending.is_complete());

        let done = JobState::Complete("abc".to_string());
        assert_eq!(done.status(), JobStatus::Complete);
        assert_eq!(done.result(), Some("abc"));
        assert!(done.is_complete());
    }

    #[test]
    fn test_status_as_str() {
        assert_eq!(JobStatus::Pending.as_str(), "pending");
        assert_eq!(JobStatus::Complete.as_str(), "complete");
    }

    #[test]
    fn test_receipt_json() {
        let json = serde_json::to_string(&SubmitReceipt { id: 1 }).unwrap();
        assert_eq!(json, r#"{"id":1}"#);
    }
}
