//! # Hash Server
//! src/lib.rs
//!
//! Servidor HTTP/1.0 que recibe passwords, programa un hash SHA-512
//! diferido para cada uno y permite consultar el resultado y estadísticas
//! de latencia.
//!
//! ## Arquitectura
//!
//! - `http`: Parsing de requests, formularios y construcción de responses
//! - `server`: Accept loop, thread por conexión y shutdown con drain
//! - `router`: Rutas con patrón + método y dispatcher
//! - `jobs`: Ids, almacén de jobs, worker de hashing y handlers
//! - `stats`: Total de jobs completados y latencia promedio
//! - `config` / `telemetry` / `error`: configuración, logging y errores
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use hash_server::config::Config;
//! use hash_server::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(&config).expect("Error al iniciar servidor");
//! server.run().expect("Error en el servidor");
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod jobs;
pub mod router;
pub mod server;
pub mod stats;
pub mod telemetry;
