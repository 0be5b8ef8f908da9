//! HTTPS server implementation.

use std::io;
use std::path::Path;

use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use loom_server::extract::AppConnectInfo;

use crate::config::ServerConfig;
use crate::server::error::{ServerError, ServerResult};
use crate::server::{TRACING_TARGET_SHUTDOWN, TRACING_TARGET_STARTUP, shutdown_signal};

/// Binds and serves `app` over HTTPS (rustls) until a shutdown signal arrives.
pub async fn serve_https(
    app: Router,
    server_config: ServerConfig,
    cert_path: &Path,
    key_path: &Path,
) -> ServerResult<()> {
    let server_addr = server_config.server_addr();
    let shutdown_timeout = server_config.shutdown_timeout();

    validate_tls_files(cert_path, key_path).map_err(ServerError::Runtime)?;

    let tls_config = RustlsConfig::from_pem_file(cert_path, key_path)
        .await
        .map_err(|e| ServerError::TlsCertificate(e.to_string()))?;

    tracing::debug!(
        target: TRACING_TARGET_STARTUP,
        cert_path = %cert_path.display(),
        key_path = %key_path.display(),
        "TLS certificates loaded"
    );
    tracing::info!(target: TRACING_TARGET_STARTUP, addr = %server_addr, tls = true, "server listening");

    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();

    tokio::spawn(async move {
        shutdown_signal(shutdown_timeout).await;
        shutdown_handle.graceful_shutdown(Some(shutdown_timeout));
    });

    let result = axum_server::bind_rustls(server_addr, tls_config)
        .handle(handle)
        .serve(app.into_make_service_with_connect_info::<AppConnectInfo>())
        .await
        .map_err(ServerError::Runtime);

    tracing::info!(target: TRACING_TARGET_SHUTDOWN, "server stopped");
    result
}

fn validate_tls_files(cert_path: &Path, key_path: &Path) -> io::Result<()> {
    let validate_file = |path: &Path, file_type: &str| -> io::Result<()> {
        if !path.exists() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{file_type} file does not exist: {}", path.display()),
            ));
        }

        if !path.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{file_type} path is not a file: {}", path.display()),
            ));
        }

        let metadata = std::fs::metadata(path)?;
        if metadata.len() == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{file_type} file is empty: {}", path.display()),
            ));
        }

        Ok(())
    };

    validate_file(cert_path, "Certificate")?;
    validate_file(key_path, "Private key")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    #[test]
    fn validate_tls_files_rejects_nonexistent_files() {
        let cert_path = Path::new("nonexistent_cert.pem");
        let key_path = Path::new("nonexistent_key.pem");

        let result = validate_tls_files(cert_path, key_path);
        assert!(result.is_err());

        let err = result.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(err.to_string().contains("Certificate file does not exist"));
    }
}
