//! Client identifier generation.

use uuid::Uuid;

/// Generates a new client identifier.
///
/// Client ids are UUID v4 strings. They are assigned once when an entity is
/// created and never reassigned; the sync layer uses them to correlate the
/// same logical entity across the local store and the remote server.
pub fn generate_client_id() -> String {
    Uuid::new_v4().to_string()
}
