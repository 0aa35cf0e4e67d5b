mod framing;
mod messages;

pub use framing::{ProtocolError, read_message, write_message};
pub use messages::{NAME_PROMPT, is_quit, joined, left, sender_label, welcome};
