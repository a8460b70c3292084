/// Generates a new opaque record identifier.
///
/// Identifiers are assigned by the storage layer at creation time and are
/// immutable afterwards.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
