//! # Hash Server - Entry Point
//! src/main.rs
//!
//! Parsea la configuración, instala logging y el handler de SIGINT/SIGTERM,
//! y corre el servidor hasta que se pida el shutdown.

use hash_server::config::Config;
use hash_server::error::ServerError;
use hash_server::server::Server;
use hash_server::telemetry;
use tracing::{error, info};

fn main() {
    let config = Config::new();
    telemetry::init(&config);
    config.print_summary();

    if let Err(e) = run(&config) {
        error!(error = %e, "fatal error");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> Result<(), ServerError> {
    let server = Server::bind(config)?;

    let shutdown = server.shutdown_handle();
    ctrlc::set_handler(move || {
        info!("SIGTERM/SIGINT received, shutting down...");
        shutdown.trigger();
    })?;

    server.run()?;
    info!("jobs finished, exiting");
    Ok(())
}
