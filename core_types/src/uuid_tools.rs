use uuid::Uuid;

/// Generates a fresh random UUID for node identifiers.
pub fn new_uuid() -> Uuid {
    Uuid::new_v4()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uuid_is_v4() {
        let id = new_uuid();
        assert_eq!(id.get_version_num(), 4);
        assert_ne!(id, new_uuid());
    }
}
