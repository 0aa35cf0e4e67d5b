pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 33000;

/// Upper bound on a single receive call. Each read is one message; larger
/// payloads arrive as several messages and are never reassembled.
pub const BUFFER_SIZE: usize = 1024;

/// Reserved payload that ends a session. Matched byte for byte.
pub const QUIT_COMMAND: &[u8] = b"{quit}";
