//! Domain factories for creating value objects.

use sha2::{Digest, Sha256};

use super::{ClientId, error::ValueObjectError};

/// Factory for generating ClientId instances.
///
/// Separates the generation concern from the validation logic in ClientId.
/// The seed mixes host-local and time-based entropy and goes through a one-way
/// hash, so identifiers are unique within a server lifetime but carry no
/// cryptographic meaning.
pub struct ClientIdFactory;

impl ClientIdFactory {
    /// Generate a new ClientId as the hex SHA-256 digest of a fresh seed.
    ///
    /// # Errors
    ///
    /// This method should not fail in practice, but returns Result for consistency
    /// with the domain error handling pattern.
    pub fn generate() -> Result<ClientId, ValueObjectError> {
        let host = std::env::var("HOSTNAME").unwrap_or_else(|_| "localhost".to_string());
        let nanos = chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default();
        let seed = format!(
            "{}-{}-{}-{}",
            host,
            std::process::id(),
            nanos,
            uuid::Uuid::new_v4()
        );
        let digest = Sha256::digest(seed.as_bytes());
        ClientId::new(format!("{digest:x}"))
    }
}
