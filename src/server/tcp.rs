//! # Servidor TCP Concurrente
//! src/server/tcp.rs
//!
//! Cada conexión se atiende en su propio thread. El accept loop corre en
//! modo no bloqueante para poder revisar la bandera de shutdown; al
//! activarse deja de aceptar y espera a que terminen las conexiones en
//! curso antes de retornar.

use crate::config::Config;
use crate::error::ServerError;
use crate::http::request::find_head_end;
use crate::http::{Request, Response, StatusCode};
use crate::jobs::JobManager;
use crate::router::Dispatcher;
use crate::server::shutdown::{ShutdownCoordinator, ShutdownHandle};
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, info_span, warn};

/// Cada cuánto se revisa la bandera de shutdown si no hay conexiones
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Tamaño del chunk de lectura del socket
const READ_CHUNK: usize = 4096;

/// Resultado de leer un request del socket
#[derive(Debug, PartialEq, Eq)]
enum ReadOutcome {
    /// El cliente cerró sin mandar nada
    Closed,
    /// Headers completos más `Content-Length` bytes de body
    Complete(Vec<u8>),
    /// Superó `max_request_bytes`
    TooLarge,
}

/// Límites por conexión
#[derive(Debug, Clone, Copy)]
struct ConnectionLimits {
    max_request_bytes: usize,
    read_timeout: Duration,
}

impl ConnectionLimits {
    fn from_config(config: &Config) -> Self {
        Self {
            max_request_bytes: config.max_request_bytes,
            read_timeout: Duration::from_millis(config.read_timeout_ms),
        }
    }
}

/// Servidor HTTP/1.0 concurrente
pub struct Server {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    coordinator: Arc<ShutdownCoordinator>,
    shutdown: ShutdownHandle,
    limits: ConnectionLimits,
}

impl Server {
    /// Bind con un `JobManager` de producción
    pub fn bind(config: &Config) -> Result<Self, ServerError> {
        Self::bind_with(config, Arc::new(JobManager::new()))
    }

    /// Bind inyectando el `JobManager`
    pub fn bind_with(config: &Config, job_manager: Arc<JobManager>) -> Result<Self, ServerError> {
        config.validate().map_err(ServerError::Config)?;

        let address = config.address();
        let listener = TcpListener::bind(&address)
            .map_err(|source| ServerError::Bind { address, source })?;

        Ok(Self {
            listener,
            dispatcher: Arc::new(Dispatcher::new(job_manager)?),
            coordinator: ShutdownCoordinator::new(),
            shutdown: ShutdownHandle::new(),
            limits: ConnectionLimits::from_config(config),
        })
    }

    /// Dirección real (útil con puerto 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Handle para pedir el shutdown desde otro thread o un signal handler
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn coordinator(&self) -> Arc<ShutdownCoordinator> {
        Arc::clone(&self.coordinator)
    }

    pub fn job_manager(&self) -> &Arc<JobManager> {
        self.dispatcher.job_manager()
    }

    /// Accept loop; retorna después de drenar las conexiones en curso
    pub fn run(self) -> Result<(), ServerError> {
        let address = self.local_addr()?;
        self.listener.set_nonblocking(true)?;
        info!(%address, "server listening (one thread per connection)");

        let mut connection_id: u64 = 0;

        while !self.shutdown.is_triggered() {
            match self.listener.accept() {
                Ok((stream, peer)) => {
                    connection_id += 1;
                    self.spawn_connection(stream, peer, connection_id);
                }
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
            }
        }

        info!(pending = self.coordinator.in_flight(), "shutting down, waiting for pending requests");
        self.coordinator.wait_idle();
        info!(
            jobs = self.job_manager().job_count(),
            "requests drained, exiting (background hash workers are abandoned)"
        );

        Ok(())
    }

    fn spawn_connection(&self, stream: TcpStream, peer: SocketAddr, connection_id: u64) {
        // El guard se toma antes del spawn para que el drain no lo pierda
        let guard = self.coordinator.enter();
        let dispatcher = Arc::clone(&self.dispatcher);
        let limits = self.limits;

        let spawned = thread::Builder::new()
            .name(format!("conn-{}", connection_id))
            .spawn(move || {
                let _guard = guard;
                let span = info_span!("connection", id = connection_id, %peer);
                let _entered = span.enter();

                if let Err(e) = Self::handle_connection(stream, &dispatcher, limits) {
                    warn!(error = %e, "connection error");
                }
            });

        if let Err(e) = spawned {
            error!(error = %e, %peer, "failed to spawn connection thread");
        }
    }

    fn handle_connection(
        mut stream: TcpStream,
        dispatcher: &Dispatcher,
        limits: ConnectionLimits,
    ) -> io::Result<()> {
        let start = Instant::now();

        // El listener es no bloqueante; el stream aceptado no debe serlo
        stream.set_nonblocking(false)?;
        stream.set_read_timeout(Some(limits.read_timeout))?;

        let raw = match read_request(&mut stream, limits.max_request_bytes)? {
            ReadOutcome::Closed => {
                debug!("connection closed without request");
                return Ok(());
            }
            ReadOutcome::TooLarge => {
                warn!(limit = limits.max_request_bytes, "request too large");
                let response = Response::error(StatusCode::BadRequest, "Request too large");
                return write_response(&mut stream, &response);
            }
            ReadOutcome::Complete(raw) => raw,
        };

        let (response, method, path, version) = match Request::parse(&raw) {
            Ok(request) => {
                let response = dispatcher.dispatch(&request);
                (
                    response,
                    request.method().as_str(),
                    request.path().to_string(),
                    request.version().to_string(),
                )
            }
            Err(e) => {
                warn!(error = %e, "invalid request");
                let response = Response::error(StatusCode::BadRequest, &format!("Invalid: {}", e));
                (response, "-", "-".to_string(), "-".to_string())
            }
        };

        write_response(&mut stream, &response)?;

        let status = response.status();
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        if status.is_server_error() {
            error!(method, path = %path, version = %version, status = status.as_u16(), latency_ms, "request failed");
        } else if status.is_client_error() {
            debug!(method, path = %path, version = %version, status = status.as_u16(), latency_ms, "request rejected");
        } else {
            info!(method, path = %path, version = %version, status = status.as_u16(), latency_ms, "request served");
        }

        Ok(())
    }
}

fn write_response(stream: &mut impl Write, response: &Response) -> io::Result<()> {
    stream.write_all(&response.to_bytes())?;
    stream.flush()
}

/// Lee headers y, si hay `Content-Length`, el body completo
fn read_request(stream: &mut impl Read, max_bytes: usize) -> io::Result<ReadOutcome> {
    let mut buffer = Vec::with_capacity(1024);
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let n = stream.read(&mut chunk)?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);

        if buffer.len() > max_bytes {
            return Ok(ReadOutcome::TooLarge);
        }

        if let Some(head_end) = find_head_end(&buffer) {
            let expected = match head_end.checked_add(declared_content_length(&buffer[..head_end])) {
                Some(expected) if expected <= max_bytes => expected,
                _ => return Ok(ReadOutcome::TooLarge),
            };
            if buffer.len() >= expected {
                buffer.truncate(expected);
                break;
            }
        }
    }

    if buffer.is_empty() {
        Ok(ReadOutcome::Closed)
    } else {
        Ok(ReadOutcome::Complete(buffer))
    }
}

/// `Content-Length` declarado en los headers crudos (0 si falta o es inválido)
fn declared_content_length(head: &[u8]) -> usize {
    String::from_utf8_lossy(head)
        .split("\r\n")
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("Content-Length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}
