//! # Dispatcher de Requests
//! src/router/dispatcher.rs
//!
//! Máquina de estados por request:
//! `Routing → {Submit | FetchResult | FetchStats | NotFound} → Responding`.

use crate::http::{Method, Request, Response, StatusCode};
use crate::jobs::{handlers, JobManager};
use crate::router::{Endpoint, Resolution, Router};
use std::sync::Arc;
use tracing::debug;

/// Valor del header `Server` (`hash_server/<versión>`)
pub const SERVER_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Despacha requests a los handlers de jobs
pub struct Dispatcher {
    router: Router,
    job_manager: Arc<JobManager>,
}

impl Dispatcher {
    /// Dispatcher con las rutas estándar
    pub fn new(job_manager: Arc<JobManager>) -> Result<Self, regex::Error> {
        Ok(Self::with_router(Router::standard()?, job_manager))
    }

    pub fn with_router(router: Router, job_manager: Arc<JobManager>) -> Self {
        Self { router, job_manager }
    }

    pub fn job_manager(&self) -> &Arc<JobManager> {
        &self.job_manager
    }

    /// Resuelve y ejecuta un request
    pub fn dispatch(&self, request: &Request) -> Response {
        let mut response = match self.router.resolve(request.method(), request.path()) {
            Resolution::Dispatch(Endpoint::Submit) => {
                handlers::submit_handler(request, &self.job_manager)
            }
            Resolution::Dispatch(Endpoint::FetchResult(id)) => {
                handlers::result_handler(id, &self.job_manager)
            }
            Resolution::Dispatch(Endpoint::FetchStats) => {
                handlers::stats_handler(&self.job_manager)
            }
            Resolution::MethodNotAllowed(allow) => {
                debug!(method = %request.method(), path = request.path(), allow = %allow, "method not allowed");
                method_not_allowed(allow)
            }
            Resolution::NotFound => {
                debug!(path = request.path(), "route not found");
                Response::error(StatusCode::NotFound, "404 page not found")
            }
        };

        Self::add_common_headers(&mut response);
        response
    }

    /// Agrega headers comunes a todas las respuestas
    fn add_common_headers(response: &mut Response) {
        response.add_header("Server", SERVER_NAME);
        response.add_header("Connection", "close");
    }
}

/// 405 con el header `Allow` indicando el único método aceptado
fn method_not_allowed(allow: Method) -> Response {
    let message = format!("405 Not Allowed: {} only is accepted for this endpoint", allow);
    Response::error(StatusCode::MethodNotAllowed, &message)
        .with_header("Allow", allow.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn dispatcher(delay: Duration) -> Dispatcher {
        Dispatcher::new(Arc::new(JobManager::with_delay(delay))).unwrap()
    }

    fn request(raw: &str) -> Request {
        Request::parse(raw.as_bytes()).unwrap()
    }

    #[test]
    fn test_get_on_submit_path_is_405() {
        let response = dispatcher(Duration::ZERO).dispatch(&request("GET /hash HTTP/1.0\r\n\r\n"));

        assert_eq!(response.status(), StatusCode::MethodNotAllowed);
        assert_eq!(response.header("Allow"), Some("POST"));
        assert_eq!(
            response.body(),
            b"405 Not Allowed: POST only is accepted for this endpoint\n"
        );
    }

    #[test]
    fn test_post_on_stats_is_405() {
        let response = dispatcher(Duration::ZERO).dispatch(&request("POST /stats HTTP/1.0\r\n\r\n"));

        assert_eq!(response.status(), StatusCode::MethodNotAllowed);
        assert_eq!(response.header("Allow"), Some("GET"));
    }

    #[test]
    fn test_unknown_path_is_404() {
        let response = dispatcher(Duration::ZERO).dispatch(&request("GET /nope HTTP/1.0\r\n\r\n"));

        assert_eq!(response.status(), StatusCode::NotFound);
        assert_eq!(response.header("Connection"), Some("close"));
        assert_eq!(response.header("Server"), Some("hash_server/0.1.0"));
    }

    #[test]
    fn test_id_larger_than_issued_is_404() {
        let dispatcher = dispatcher(Duration::from_secs(60));
        dispatcher.dispatch(&request(
            "POST /hash HTTP/1.0\r\nContent-Type: application/x-www-form-urlencoded\r\n\r\npassword=x",
        ));

        let response = dispatcher.dispatch(&request("GET /hash/2 HTTP/1.0\r\n\r\n"));
        assert_eq!(response.status(), StatusCode::NotFound);

        let response = dispatcher.dispatch(&request("GET /hash/1 HTTP/1.0\r\n\r\n"));
        assert_eq!(response.status(), StatusCode::Accepted);
    }

    #[test]
    fn test_full_flow_through_dispatcher() {
        let dispatcher = dispatcher(Duration::from_millis(50));

        let submit = dispatcher.dispatch(&request(
            "POST /hash HTTP/1.0\r\nContent-Type: application/x-www-form-urlencoded\r\n\r\npassword=angryMonkey",
        ));
        assert_eq!(submit.status(), StatusCode::Accepted);
        assert_eq!(submit.header("Location"), Some("/hash/1"));

        // Polling hasta que termine
        let mut fetched = dispatcher.dispatch(&request("GET /hash/1 HTTP/1.0\r\n\r\n"));
        for _ in 0..200 {
            if fetched.status() == StatusCode::Ok {
                break;
            }
            assert_eq!(fetched.status(), StatusCode::Accepted);
            std::thread::sleep(Duration::from_millis(10));
            fetched = dispatcher.dispatch(&request("GET /hash/1 HTTP/1.0\r\n\r\n"));
        }

        assert_eq!(fetched.status(), StatusCode::Ok);
        assert_eq!(
            fetched.body(),
            b"ZEHhWB65gUlzdVwtDQArEyx-KVLzp_aTaRaPlBzYRIFj6vjFdqEb0Q5B8zVKCZ0vKbZPZklJz0Fd7su2A-gf7Q=="
        );
    }
}
