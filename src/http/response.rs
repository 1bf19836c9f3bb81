//! # Construcción de Respuestas HTTP
//! src/http/response.rs
//!
//! API para construir respuestas HTTP/1.0 y convertirlas a bytes.
//!
//! ## Formato de una respuesta HTTP/1.0
//!
//! ```text
//! HTTP/1.0 202 Accepted\r\n
//! Location: /hash/1\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 8\r\n
//! \r\n
//! {"id":1}
//! ```
//!
//! ## Ejemplo de uso
//!
//! ```
//! use hash_server::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Accepted)
//!     .with_header("Location", "/hash/1")
//!     .with_body(r#"{"id":1}"#);
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.starts_with(b"HTTP/1.0 202 Accepted\r\n"));
//! ```

use super::StatusCode;
use std::collections::HashMap;

/// Representa una respuesta HTTP/1.0 completa
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP (200, 202, 404, etc.)
    status: StatusCode,

    /// Headers HTTP. Usamos HashMap para evitar duplicados
    headers: HashMap<String, String>,

    /// Cuerpo de la respuesta (puede ser vacío)
    body: Vec<u8>,
}

impl Response {
    /// Crea una nueva respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header a la respuesta (si ya existe, se sobrescribe)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Agrega un header a una respuesta existente (versión mutable)
    pub fn add_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_string(), value.to_string());
    }

    /// Establece el cuerpo de la respuesta desde un string
    ///
    /// Automáticamente calcula y agrega el header `Content-Length`.
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.as_bytes().to_vec();
        self.headers.insert(
            "Content-Length".to_string(),
            self.body.len().to_string()
        );
        self
    }

    /// Permite que cualquier origen lea la respuesta (CORS permisivo)
    pub fn with_cors(self) -> Self {
        self.with_header("Access-Control-Allow-Origin", "*")
    }

    /// Crea una respuesta JSON con el código indicado
    ///
    /// Establece `Content-Type: application/json` y el header CORS permisivo
    /// que llevan todas las respuestas JSON del servicio.
    ///
    /// # Ejemplo
    /// ```
    /// use hash_server::http::{Response, StatusCode};
    ///
    /// let response = Response::json(StatusCode::Ok, r#"{"total":0,"average":0}"#);
    /// assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
    /// ```
    pub fn json(status: StatusCode, body: &str) -> Self {
        Self::new(status)
            .with_header("Content-Type", "application/json")
            .with_cors()
            .with_body(body)
    }

    /// Crea una respuesta de texto plano
    pub fn text(status: StatusCode, body: &str) -> Self {
        Self::new(status)
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_body(body)
    }

    /// Crea una respuesta de error con el mensaje en texto plano
    ///
    /// El mensaje termina en salto de línea, igual que cualquier error
    /// legible por un humano desde `curl`.
    ///
    /// # Ejemplo
    /// ```
    /// use hash_server::http::{Response, StatusCode};
    ///
    /// let response = Response::error(StatusCode::NotFound, "404 page not found");
    /// assert_eq!(response.body(), b"404 page not found\n");
    /// ```
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::text(status, &format!("{}\n", message))
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    ///
    /// - Status line: `HTTP/1.0 200 OK\r\n`
    /// - Headers: `Header-Name: Value\r\n`
    /// - Línea vacía: `\r\n`
    /// - Body
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::new();

        let status_line = format!("HTTP/1.0 {}\r\n", self.status);
        result.extend_from_slice(status_line.as_bytes());

        for (name, value) in &self.headers {
            let header_line = format!("{}: {}\r\n", name, value);
            result.extend_from_slice(header_line.as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    /// Obtiene el código de estado de la respuesta
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Obtiene una referencia a los headers
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header específico
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(|s| s.as_str())
    }

    /// Obtiene una referencia al body
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
