//! Direct Hyprland IPC.
//!
//! Talks to Hyprland through its Unix sockets at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/`, avoiding any
//! shell command invocation or third-party crate for socket discovery.
//! `.socket.sock` answers requests; `.socket2.sock` streams events.

use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Errors that can occur when talking to Hyprland.
#[derive(Debug, thiserror::Error)]
#[error("hyprland IPC error: {0}")]
pub struct HyprlandError(pub String);

/// Whether this process looks like it runs inside a Hyprland session.
pub fn instance_available() -> bool {
    std::env::var_os("HYPRLAND_INSTANCE_SIGNATURE").is_some()
}

fn instance_dir() -> Result<PathBuf, HyprlandError> {
    let runtime_dir = std::env::var("XDG_RUNTIME_DIR")
        .map_err(|_| HyprlandError("XDG_RUNTIME_DIR not set".into()))?;
    let his = std::env::var("HYPRLAND_INSTANCE_SIGNATURE")
        .map_err(|_| HyprlandError("HYPRLAND_INSTANCE_SIGNATURE not set".into()))?;
    Ok(PathBuf::from(runtime_dir).join("hypr").join(his))
}

/// Path of the request socket.
pub fn socket_path() -> Result<PathBuf, HyprlandError> {
    Ok(instance_dir()?.join(".socket.sock"))
}

/// Path of the event socket.
pub fn socket2_path() -> Result<PathBuf, HyprlandError> {
    Ok(instance_dir()?.join(".socket2.sock"))
}

/// Send a raw request to the command socket and return the response.
pub fn request(command: &str) -> Result<String, HyprlandError> {
    let path = socket_path()?;
    let mut stream = UnixStream::connect(&path)
        .map_err(|e| HyprlandError(format!("connect to {}: {}", path.display(), e)))?;

    stream
        .write_all(command.as_bytes())
        .map_err(|e| HyprlandError(format!("write: {}", e)))?;

    let mut response = Vec::new();
    stream
        .read_to_end(&mut response)
        .map_err(|e| HyprlandError(format!("read: {}", e)))?;

    String::from_utf8(response).map_err(|e| HyprlandError(format!("utf-8: {}", e)))
}

/// Send a JSON data query (`j/<command>`) and return the raw JSON string.
pub fn json(data_command: &str) -> Result<String, HyprlandError> {
    request(&format!("j/{}", data_command))
}

/// Fail unless Hyprland answered `ok`.
fn expect_ok(what: &str, response: String) -> Result<(), HyprlandError> {
    if response.trim() == "ok" {
        Ok(())
    } else {
        Err(HyprlandError(format!("{} error: {}", what, response.trim())))
    }
}

/// Run a dispatcher (`/dispatch <args>`).
pub fn dispatch(args: &str) -> Result<(), HyprlandError> {
    expect_ok("dispatch", request(&format!("/dispatch {}", args))?)
}

/// Set a runtime config keyword (`/keyword <args>`).
pub fn keyword(args: &str) -> Result<(), HyprlandError> {
    expect_ok("keyword", request(&format!("/keyword {}", args))?)
}

/// Parse a single event line from socket2.
///
/// Lines have the form `EVENT>>DATA`.
pub fn parse_event_line(line: &str) -> Option<(&str, &str)> {
    line.split_once(">>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_event_line_valid() {
        assert_eq!(
            parse_event_line("custom>>hyprsnap:3"),
            Some(("custom", "hyprsnap:3"))
        );
        assert_eq!(
            parse_event_line("activewindow>>kitty,~"),
            Some(("activewindow", "kitty,~"))
        );
        assert_eq!(parse_event_line("custom>>"), Some(("custom", "")));
    }

    #[test]
    fn parse_event_line_no_separator() {
        assert_eq!(parse_event_line("garbage"), None);
    }

    #[test]
    fn expect_ok_accepts_trailing_whitespace() {
        assert!(expect_ok("dispatch", "ok\n".into()).is_ok());
        let err = expect_ok("keyword", "Invalid dispatcher".into()).unwrap_err();
        assert!(err.to_string().contains("Invalid dispatcher"));
    }
}
