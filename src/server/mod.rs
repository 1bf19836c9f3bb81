//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! 1. Escucha en un puerto
//! 2. Acepta conexiones y lanza un thread por cada una
//! 3. Lee, despacha y responde cada request
//! 4. Al recibir SIGINT/SIGTERM deja de aceptar y drena las conexiones

pub mod shutdown;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use shutdown::{InFlightGuard, ShutdownCoordinator, ShutdownHandle};
pub use tcp::Server;
