use crate::{constants::QUIT_COMMAND, types::DisplayName};

/// First bytes a client sees after connecting. Sent without a terminator.
pub const NAME_PROMPT: &str = "Type your name and press enter!";

pub fn welcome(name: &DisplayName) -> String {
    format!(
        "Welcome {}! If you ever want to quit, type {{quit}} to exit.",
        name
    )
}

pub fn joined(name: &DisplayName) -> String {
    format!("{} has joined the chat!", name)
}

pub fn left(name: &DisplayName) -> String {
    format!("{} has left the chat.", name)
}

/// Prefix prepended to every chat payload relayed on behalf of `name`.
pub fn sender_label(name: &DisplayName) -> String {
    format!("{}: ", name)
}

pub fn is_quit(payload: &[u8]) -> bool {
    payload == QUIT_COMMAND
}
