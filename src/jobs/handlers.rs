//! # Handlers HTTP para Jobs
//! src/jobs/handlers.rs
//!
//! - `POST /hash` → submit_handler
//! - `GET /hash/{id}` → result_handler
//! - `GET /stats` → stats_handler

use crate::http::form::FormValues;
use crate::http::{Request, Response, StatusCode};
use crate::jobs::manager::JobManager;
use crate::jobs::types::{locator, SubmitReceipt};
use serde::Serialize;
use tracing::{debug, error, warn};

/// Serializa `value` como JSON o responde 500 con el texto del error
fn json_response<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_string(value) {
        Ok(body) => Response::json(status, &body),
        Err(e) => {
            error!(error = %e, "failed to encode response");
            Response::error(StatusCode::InternalServerError, &e.to_string())
        }
    }
}

/// Handler para `POST /hash` (form field `password`)
///
/// Responde 202 con `Location: /hash/{id}` y `{"id": N}` sin esperar el
/// hash. Un campo `password` ausente se hashea como string vacío.
///
/// # Ejemplo de response
/// ```json
/// {"id":1}
/// ```
pub fn submit_handler(req: &Request, job_manager: &JobManager) -> Response {
    let form = match FormValues::from_request(req) {
        Ok(form) => form,
        Err(e) => {
            warn!(error = %e, "malformed hash request");
            return Response::error(StatusCode::BadRequest, &format!("ParseForm() err: {}", e));
        }
    };

    let password = form.get("password").unwrap_or_default().to_string();

    let submission = match job_manager.submit(password) {
        Ok(submission) => submission,
        Err(e) => {
            error!(error = %e, "failed to schedule hash job");
            return Response::error(StatusCode::InternalServerError, &e.to_string());
        }
    };

    // El worker sigue solo; no se espera su handle
    let id = submission.id;
    drop(submission.handle);

    let mut response = json_response(StatusCode::Accepted, &SubmitReceipt { id });
    if response.status().is_success() {
        response.add_header("Location", &locator(id));
    }
    response
}

/// Handler para `GET /hash/{id}`
///
/// - 404 si el id nunca existió
/// - 202 + `Location` si sigue pendiente
/// - 200 con el digest en texto plano si terminó
pub fn result_handler(id: u64, job_manager: &JobManager) -> Response {
    let Some(state) = job_manager.lookup(id) else {
        debug!(job_id = id, "hash result not found");
        return Response::error(StatusCode::NotFound, "404 page not found");
    };

    debug!(job_id = id, status = state.status().as_str(), "hash result polled");

    match state.result() {
        None => Response::new(StatusCode::Accepted).with_header("Location", &locator(id)),
        Some(digest) => Response::new(StatusCode::Ok)
            .with_header("Content-Type", "application/text")
            .with_cors()
            .with_body(digest),
    }
}

/// Handler para `GET /stats`
///
/// # Ejemplo de response
/// ```json
/// {"total":1,"average":5000311}
/// ```
pub fn stats_handler(job_manager: &JobManager) -> Response {
    json_response(StatusCode::Ok, &job_manager.stats())
}
