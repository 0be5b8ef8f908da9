//! Shared size limits for inbound request bodies.

/// Default maximum size, in bytes, for a JSON request body (1 MiB).
///
/// Applies to the API surface at large; webhook ingress uses
/// [`DEFAULT_MAX_FILE_BODY_SIZE`] instead since upstream providers may send
/// larger payloads.
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Maximum size, in bytes, accepted for webhook ingress deliveries (10 MiB).
pub const DEFAULT_MAX_FILE_BODY_SIZE: usize = 10 * 1024 * 1024;
