mod ids;
mod name;

pub use ids::ConnectionId;
pub use name::DisplayName;

#[cfg(test)]
mod tests {
    use super::{ConnectionId, DisplayName};

    #[test]
    fn display_name_accepts_anything() {
        assert_eq!(DisplayName::from_bytes(b"").as_str(), "");
        assert_eq!(DisplayName::from_bytes(b"bob\r\n").as_str(), "bob\r\n");
    }

    #[test]
    fn display_name_decodes_invalid_utf8_lossily() {
        let name = DisplayName::from_bytes(&[b'a', 0xff, b'b']);
        assert_eq!(name.as_str(), "a\u{fffd}b");
    }

    #[test]
    fn connection_ids_order_by_value() {
        assert!(ConnectionId(1) < ConnectionId(2));
        assert_eq!(ConnectionId(7).to_string(), "7");
    }
}
