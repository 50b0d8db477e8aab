//! Short correlation ids for tagging a call's emitted events.

/// Eight hex characters, enough to tell concurrent calls apart in logs.
pub fn new_call_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    let bytes = uuid.as_bytes();
    format!(
        "{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_id_length() {
        assert_eq!(new_call_id().len(), 8);
    }

    #[test]
    fn call_id_is_hex() {
        assert!(new_call_id().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn call_id_is_unique() {
        assert_ne!(new_call_id(), new_call_id());
    }
}
