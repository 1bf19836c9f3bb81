//! # Sistema de Routing
//! src/router/mod.rs
//!
//! Mapea (método, path) a un endpoint del servicio.
//!
//! ## Arquitectura
//!
//! ```text
//! Request → Router::resolve → Resolution → Dispatcher → handler → Response
//! ```
//!
//! Cada ruta es un patrón regex anclado más el único método que acepta.
//! Si el path coincide pero el método no, el resultado es 405 (no 404).
//! Gana la primera ruta cuyo patrón coincida.

pub mod dispatcher;

pub use dispatcher::Dispatcher;

use crate::http::Method;
use regex::Regex;

/// Path para enviar passwords
pub const HASH_ROUTE: &str = "/hash";

/// Path para consultar un resultado; el grupo captura el id
pub const HASH_RESULT_ROUTE: &str = "/hash/([^/]+)";

/// Path de estadísticas
pub const STATS_ROUTE: &str = "/stats";

/// Qué endpoint atiende una ruta registrada
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    Submit,
    FetchResult,
    FetchStats,
}

/// Endpoint resuelto, con sus parámetros ya parseados
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Submit,
    FetchResult(u64),
    FetchStats,
}

/// Resultado de resolver un request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Path y método correctos
    Dispatch(Endpoint),

    /// El path existe pero sólo acepta `allow`
    MethodNotAllowed(Method),

    /// Ninguna ruta coincide
    NotFound,
}

struct Route {
    pattern: Regex,
    method: Method,
    kind: EndpointKind,
}

impl Route {
    /// Endpoint si el path coincide y sus parámetros son válidos
    fn endpoint(&self, path: &str) -> Option<Endpoint> {
        let captures = self.pattern.captures(path)?;

        match self.kind {
            EndpointKind::Submit => Some(Endpoint::Submit),
            EndpointKind::FetchStats => Some(Endpoint::FetchStats),
            EndpointKind::FetchResult => {
                // Un id no numérico hace que la ruta no coincida
                let id = captures.get(1)?.as_str().parse().ok()?;
                Some(Endpoint::FetchResult(id))
            }
        }
    }
}

/// Router que mapea paths a endpoints
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Crea un router vacío
    pub fn new() -> Self {
        Self { routes: Vec::new() }
    }

    /// Router con las tres rutas del servicio
    ///
    /// ```
    /// use hash_server::http::Method;
    /// use hash_server::router::{Endpoint, Resolution, Router};
    ///
    /// let router = Router::standard().unwrap();
    /// assert_eq!(
    ///     router.resolve(Method::GET, "/hash/7"),
    ///     Resolution::Dispatch(Endpoint::FetchResult(7))
    /// );
    /// assert_eq!(router.resolve(Method::GET, "/hash"), Resolution::MethodNotAllowed(Method::POST));
    /// ```
    pub fn standard() -> Result<Self, regex::Error> {
        let mut router = Self::new();
        router.register(HASH_ROUTE, Method::POST, EndpointKind::Submit)?;
        router.register(HASH_RESULT_ROUTE, Method::GET, EndpointKind::FetchResult)?;
        router.register(STATS_ROUTE, Method::GET, EndpointKind::FetchStats)?;
        Ok(router)
    }

    /// Registra una ruta; el patrón se ancla con `^...$`
    pub fn register(&mut self, pattern: &str, method: Method, kind: EndpointKind) -> Result<(), regex::Error> {
        let pattern = Regex::new(&format!("^{}$", pattern))?;
        self.routes.push(Route { pattern, method, kind });
        Ok(())
    }

    /// Resuelve método + path
    pub fn resolve(&self, method: Method, path: &str) -> Resolution {
        for route in &self.routes {
            if let Some(endpoint) = route.endpoint(path) {
                if route.method == method {
                    return Resolution::Dispatch(endpoint);
                }
                return Resolution::MethodNotAllowed(route.method);
            }
        }

        Resolution::NotFound
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn router() -> Router {
        Router::standard().unwrap()
    }

    #[test]
    fn test_router_creation() {
        assert!(Router::new().is_empty());
        assert_eq!(router().len(), 3);
    }

    #[test]
    fn test_submit_route() {
        assert_eq!(
            router().resolve(Method::POST, "/hash"),
            Resolution::Dispatch(Endpoint::Submit)
        );
    }

    #[test]
    fn test_stats_route() {
        assert_eq!(
            router().resolve(Method::GET, "/stats"),
            Resolution::Dispatch(Endpoint::FetchStats)
        );
    }

    #[test]
    fn test_fetch_result_route() {
        assert_eq!(
            router().resolve(Method::GET, "/hash/123"),
            Resolution::Dispatch(Endpoint::FetchResult(123))
        );
    }

    #[test]
    fn test_wrong_method_is_405() {
        let router = router();
        assert_eq!(router.resolve(Method::GET, "/hash"), Resolution::MethodNotAllowed(Method::POST));
        assert_eq!(router.resolve(Method::POST, "/hash/1"), Resolution::MethodNotAllowed(Method::GET));
        assert_eq!(router.resolve(Method::DELETE, "/stats"), Resolution::MethodNotAllowed(Method::GET));
    }

    #[test]
    fn test_non_numeric_id_is_404() {
        let router = router();
        assert_eq!(router.resolve(Method::GET, "/hash/abc"), Resolution::NotFound);
        assert_eq!(router.resolve(Method::GET, "/hash/-1"), Resolution::NotFound);
        // Ni siquiera con el método incorrecto: la ruta no coincide
        assert_eq!(router.resolve(Method::POST, "/hash/abc"), Resolution::NotFound);
    }

    #[test]
    fn test_unknown_paths() {
        let router = router();
        assert_eq!(router.resolve(Method::GET, "/"), Resolution::NotFound);
        assert_eq!(router.resolve(Method::GET, "/hash/1/extra"), Resolution::NotFound);
        assert_eq!(router.resolve(Method::GET, "/stats/"), Resolution::NotFound);
        assert_eq!(router.resolve(Method::POST, "/hashes"), Resolution::NotFound);
    }

    #[test]
    fn test_invalid_pattern() {
        let mut router = Router::new();
        assert!(router.register("/bad(", Method::GET, EndpointKind::FetchStats).is_err());
    }
}
