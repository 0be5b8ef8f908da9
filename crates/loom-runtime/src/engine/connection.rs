//! Loads and decrypts `Connection` records into an in-memory registry.

use std::collections::HashMap;

use async_trait::async_trait;
use loom_core::crypto::{EncryptionKey, decrypt_json};
use loom_postgres::query::ConnectionRepository;
use loom_postgres::types::{CredentialKind, OffsetPagination};
use loom_postgres::{PgClient, model::Connection as ConnectionRecord};
use uuid::Uuid;

use crate::error::{Error, Result};

/// HKDF `info` string scoping the derived key used for connection credentials.
///
/// Distinct from every other subsystem's derived key (e.g. resume tokens),
/// even when both are configured from the same `ENCRYPTION_MASTER_KEY`.
pub const CREDENTIALS_KEY_INFO: &[u8] = b"connection-credentials";

/// Decrypted credentials for a single connection, scoped to one organization.
#[derive(Debug, Clone)]
pub struct ResolvedConnection {
    /// The connection record's own id.
    pub connection_id: Uuid,
    /// The connector app this connection authenticates against.
    pub app_id: String,
    /// The shape of the decrypted credential payload.
    pub kind: CredentialKind,
    /// Decrypted credential material (e.g. `{"access_token": "...", "refresh_token": "..."}`).
    pub credentials: serde_json::Value,
}

/// Callback invoked when resolving a connection's credentials causes an
/// OAuth2 token to be rotated, so the caller can persist the refreshed token
/// instead of silently discarding it.
#[async_trait]
pub trait TokenRefreshHandler: Send + Sync {
    /// Persists a rotated credential payload for `connection_id`.
    async fn on_token_refreshed(
        &self,
        connection_id: Uuid,
        credentials: &serde_json::Value,
    ) -> Result<()>;
}

/// A no-op handler for callers that don't perform token rotation in-process.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTokenRefreshHandler;

#[async_trait]
impl TokenRefreshHandler for NoopTokenRefreshHandler {
    async fn on_token_refreshed(
        &self,
        _connection_id: Uuid,
        _credentials: &serde_json::Value,
    ) -> Result<()> {
        Ok(())
    }
}

/// In-memory set of resolved connections for a single execution.
#[derive(Debug, Default, Clone)]
pub struct ConnectionRegistry {
    connections: HashMap<Uuid, ResolvedConnection>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resolved connection, replacing any existing entry for its id.
    pub fn register(&mut self, connection: ResolvedConnection) {
        self.connections.insert(connection.connection_id, connection);
    }

    /// Returns the resolved connection for `connection_id`, if registered.
    pub fn get(&self, connection_id: Uuid) -> Option<&ResolvedConnection> {
        self.connections.get(&connection_id)
    }

    /// Returns the number of registered connections.
    pub fn len(&self) -> usize {
        self.connections.len()
    }

    /// Returns whether the registry has no registered connections.
    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

/// Loads and decrypts `Connection` records from Postgres on demand.
///
/// The master secret is used to derive a single HKDF-SHA256 key scoped to
/// [`CREDENTIALS_KEY_INFO`]; every connection in every organization is
/// encrypted under that one key, with tenant isolation enforced at the SQL
/// layer (every query here is organization-scoped) rather than via per-tenant
/// key material.
pub struct PgConnectionLoader {
    client: PgClient,
    key: EncryptionKey,
}

impl std::fmt::Debug for PgConnectionLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgConnectionLoader")
            .field("key", &"[redacted]")
            .finish()
    }
}

impl PgConnectionLoader {
    /// Derives the credentials key from `master_secret` and wraps `client`.
    pub fn new(client: PgClient, master_secret: &[u8]) -> Result<Self> {
        let key = EncryptionKey::derive_from_secret(master_secret, CREDENTIALS_KEY_INFO)?;
        Ok(Self { client, key })
    }

    fn decrypt(&self, record: &ConnectionRecord) -> Result<ResolvedConnection> {
        let credentials = decrypt_json(&self.key, &record.encrypted_credentials)?;
        Ok(ResolvedConnection {
            connection_id: record.id,
            app_id: record.app_id.clone(),
            kind: record.kind,
            credentials,
        })
    }

    /// Loads and decrypts a single connection, scoped to `organization_id`.
    pub async fn load_connection(
        &self,
        organization_id: Uuid,
        connection_id: Uuid,
    ) -> Result<ResolvedConnection> {
        let mut conn = self.client.get_connection().await?;
        let record = conn
            .find_connection_in_organization(organization_id, connection_id)
            .await?
            .ok_or(Error::CredentialsNotFound(connection_id))?;
        self.decrypt(&record)
    }

    /// Loads every connection for a set of referenced ids within an organization.
    pub async fn load_connections(
        &self,
        organization_id: Uuid,
        connection_ids: &[Uuid],
    ) -> Result<ConnectionRegistry> {
        let mut registry = ConnectionRegistry::new();
        for &connection_id in connection_ids {
            let resolved = self.load_connection(organization_id, connection_id).await?;
            registry.register(resolved);
        }
        Ok(registry)
    }

    /// Loads and decrypts the first connection registered for `app_id`
    /// within an organization, for resolving a polling trigger's
    /// credentials. Returns `None` if the organization has no connection to
    /// that app.
    pub async fn load_connection_for_app(
        &self,
        organization_id: Uuid,
        app_id: &str,
    ) -> Result<Option<ResolvedConnection>> {
        let mut conn = self.client.get_connection().await?;
        let records = conn.find_connections_by_app_id(organization_id, app_id).await?;
        match records.first() {
            Some(record) => Ok(Some(self.decrypt(record)?)),
            None => Ok(None),
        }
    }

    /// Loads and decrypts every connection belonging to an organization.
    pub async fn load_organization_connections(
        &self,
        organization_id: Uuid,
    ) -> Result<ConnectionRegistry> {
        let mut conn = self.client.get_connection().await?;
        let mut registry = ConnectionRegistry::new();
        let mut offset = 0i64;
        const PAGE_SIZE: i64 = 200;

        loop {
            let page = conn
                .offset_list_connections(organization_id, OffsetPagination::new(PAGE_SIZE, offset))
                .await?;
            let fetched = page.len() as i64;
            for record in &page {
                registry.register(self.decrypt(record)?);
            }
            if fetched < PAGE_SIZE {
                break;
            }
            offset += fetched;
        }

        Ok(registry)
    }
}
