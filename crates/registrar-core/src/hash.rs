//! ContentHasher trait for computing cache keys.
//!
//! Defined in registrar-core so the query cache can key entries without
//! coupling to a specific hashing algorithm. The `Sha256ContentHasher`
//! adapter lives in registrar-infra.

/// Abstraction over content hashing.
///
/// Used by `QueryCache` to turn normalized query text plus bound parameters
/// into a stable key.
pub trait ContentHasher: Send + Sync {
    /// Compute a hex-encoded hash of the given content.
    fn compute_hash(&self, content: &str) -> String;
}
