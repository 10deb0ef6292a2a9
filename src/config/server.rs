/// Server configuration constants.
///
/// Bind address for the HTTP/WebSocket listener.
pub const HOST: &str = "127.0.0.1";

/// Listening port.
pub const PORT: u16 = 8080;
