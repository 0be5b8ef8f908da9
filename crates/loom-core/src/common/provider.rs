//! Provider construction trait.

use crate::Result;

/// Bridges a node's non-sensitive configuration with a resolved connection's
/// sensitive credentials to construct a connector client.
///
/// # Type Parameters
///
/// - `Params`: Non-sensitive configuration taken from the node definition
///   (e.g. a Slack channel, an HTTP base URL).
/// - `Credentials`: Sensitive material decrypted from a `Connection` record
///   (e.g. an OAuth2 access token, an API key).
///
/// # Example
///
/// ```ignore
/// #[async_trait::async_trait]
/// impl Provider for SlackClient {
///     type Params = SlackParams;
///     type Credentials = OAuth2Credentials;
///
///     async fn create(params: Self::Params, credentials: Self::Credentials) -> Result<Self> {
///         // Build an authenticated Slack client
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait Provider: Send {
    /// Non-sensitive parameters taken from the node definition.
    type Params: Send;
    /// Sensitive credentials decrypted from the resolved `Connection`.
    type Credentials: Send;

    /// Creates a new provider instance from parameters and credentials.
    async fn create(params: Self::Params, credentials: Self::Credentials) -> Result<Self>
    where
        Self: Sized;
}
