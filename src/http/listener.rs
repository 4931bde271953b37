//! TCP [`ActionSource`] implementation.
//!
//! Binds a TCP socket and serves each accepted connection on its own
//! thread.  A connection carries exactly one request: bytes are buffered
//! until the request line is complete (or the peer stops sending), the
//! line is routed, at most one [`Action`](crate::action::Action) is
//! submitted, one response is written and the connection is closed.
//!
//! # Wire format
//!
//! ```text
//! POST /snap/left HTTP/1.1\r\n
//! Host: localhost:42424\r\n
//! \r\n
//! ```
//!
//! answered with
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: application/json\r\n
//! Content-Length: 31\r\n
//! Connection: Close\r\n
//! \r\n
//! {"status":"ok","action":"left"}
//! ```
//!
//! A `200` means the action was queued, not that a window moved.

use super::request::{self, RouteError};
use crate::dispatcher::DispatchHandle;
use crate::traits::ActionSource;
use log::{debug, error, info, warn};
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

/// How long to wait for the peer to close after the response is sent.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Upper bound on buffered bytes before routing whatever has arrived.
pub const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Default listening port.
pub const DEFAULT_PORT: u16 = 42424;

/// A bound HTTP endpoint that turns `POST /snap/{action}` into actions.
pub struct RequestListener {
    listener: TcpListener,
}

/// Errors produced by the request listener.
#[derive(Debug, thiserror::Error)]
pub enum ListenerError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl RequestListener {
    /// Bind the listening socket.
    ///
    /// This is the only fallible step that should stop the daemon.
    pub fn bind(addr: impl ToSocketAddrs) -> Result<Self, ListenerError> {
        let listener = TcpListener::bind(addr)?;
        Ok(Self { listener })
    }

    /// The address actually bound (useful when binding port `0`).
    pub fn local_addr(&self) -> Result<SocketAddr, ListenerError> {
        Ok(self.listener.local_addr()?)
    }
}

impl ActionSource for RequestListener {
    type Error = ListenerError;

    /// Accept connections forever.
    ///
    /// This method **blocks**.  Each connection is served on a fresh
    /// thread, so a slow client never holds up the others.
    fn run(&mut self, sink: DispatchHandle) -> Result<(), Self::Error> {
        info!("listening on http://{}", self.listener.local_addr()?);

        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let peer = stream
                        .peer_addr()
                        .map(|a| a.to_string())
                        .unwrap_or_else(|_| "?".into());
                    debug!("client connected: {}", peer);
                    let sink = sink.clone();
                    let spawned = thread::Builder::new()
                        .name("hyprsnap-http".into())
                        .spawn(move || {
                            if let Err(e) = serve_connection(stream, &sink) {
                                warn!("connection {}: {}", peer, e);
                            }
                        });
                    if let Err(e) = spawned {
                        error!("failed to spawn connection thread: {}", e);
                    }
                }
                Err(e) => {
                    error!("accept error: {}", e);
                }
            }
        }
        Ok(())
    }
}

/// Read until the request line is complete, the peer closes, or the
/// buffer limit is hit.  Returns `None` if the peer sent nothing.
fn read_request(stream: &mut TcpStream) -> io::Result<Option<Vec<u8>>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = match stream.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if n == 0 {
            return Ok(if buf.is_empty() { None } else { Some(buf) });
        }
        buf.extend_from_slice(&chunk[..n]);
        if request::find_crlf(&buf).is_some() || buf.len() >= MAX_REQUEST_BYTES {
            return Ok(Some(buf));
        }
    }
}

/// Serve one request on `stream`, then close it.
fn serve_connection(mut stream: TcpStream, sink: &DispatchHandle) -> io::Result<()> {
    let Some(buf) = read_request(&mut stream)? else {
        debug!("client closed without sending a request");
        return Ok(());
    };

    let response = match request::parse_request(&buf) {
        Ok(action) => match sink.submit(action) {
            Ok(()) => {
                info!("accepted {} over http", action);
                request::ok_response(action)
            }
            Err(e) => {
                warn!("dropping {} from http: {}", action, e);
                request::error_response(RouteError::Busy)
            }
        },
        Err(e) => {
            debug!("rejected request: {}", e);
            request::error_response(e)
        }
    };

    stream.write_all(&response)?;
    stream.flush()?;
    stream.shutdown(Shutdown::Write)?;
    drain(&mut stream);
    Ok(())
}

/// Consume whatever the peer still sends (unread headers, a body) until it
/// closes.  Dropping a socket with unread input makes the kernel answer
/// with a reset, which can discard the response before the client reads it.
fn drain(stream: &mut TcpStream) {
    if stream.set_read_timeout(Some(DRAIN_TIMEOUT)).is_err() {
        return;
    }
    let mut chunk = [0u8; 4096];
    while let Ok(n) = stream.read(&mut chunk) {
        if n == 0 {
            break;
        }
    }
}

//  Tests
