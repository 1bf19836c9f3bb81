//! # Módulo HTTP
//!
//! Implementa la parte del protocolo HTTP/1.0 que necesita el servicio,
//! sin librerías de alto nivel:
//!
//! - Parsing de requests (request line, headers, body crudo)
//! - Decodificación de formularios URL-encoded
//! - Construcción de responses
//! - Códigos de estado
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 24\r\n
//! \r\n
//! {"total":1,"average":5000123}
//! ```

pub mod form;      // Formularios application/x-www-form-urlencoded
pub mod request;   // Parsing de HTTP requests
pub mod response;  // Construcción de HTTP responses
pub mod status;    // Códigos de estado HTTP

// Re-exportamos los tipos principales para facilitar su uso
pub use request::{Method, Request};
pub use response::Response;
pub use status::StatusCode;
