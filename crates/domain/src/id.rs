//! ID generation utilities.

use uuid::Uuid;

/// Generates a new UUID v7.
///
/// UUID v7 includes timestamp information and is sortable, which keeps
/// request ids in log output ordered by issue time.
#[must_use]
pub fn generate_id_v7() -> Uuid {
    Uuid::now_v7()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_id_v7_version() {
        let id = generate_id_v7();
        assert_eq!(id.get_version_num(), 7);
        assert_eq!(id.to_string().len(), 36);
    }

    #[test]
    fn test_generate_id_v7_uniqueness() {
        let id1 = generate_id_v7();
        let id2 = generate_id_v7();
        assert_ne!(id1, id2);
    }
}
