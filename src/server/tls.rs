//! Certificate provisioning and the server-side TLS configuration.
//!
//! The certificate directory holds one combined PEM file with the full
//! certificate chain followed by the private key. Protocol versions are
//! pinned to TLS 1.2 and 1.3; older clients fail the handshake at the
//! configuration level.

use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use rustls::ServerConfig;
use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use tokio_rustls::TlsAcceptor;

/// Fixed filename of the combined certificate-chain + private-key PEM.
pub const CERT_FILE: &str = "server_combined.crt";

/// Builds the process-wide TLS acceptor from the certificate directory.
pub fn acceptor(cert_dir: &Path) -> anyhow::Result<TlsAcceptor> {
    let cert_path = cert_dir.join(CERT_FILE);
    let pem = std::fs::read(&cert_path)
        .with_context(|| format!("failed to read {}", cert_path.display()))?;

    let certs: Vec<CertificateDer<'static>> = rustls_pemfile::certs(&mut BufReader::new(&pem[..]))
        .collect::<Result<_, _>>()
        .with_context(|| format!("invalid certificate chain in {}", cert_path.display()))?;
    anyhow::ensure!(
        !certs.is_empty(),
        "no certificates found in {}",
        cert_path.display()
    );

    let key: PrivateKeyDer<'static> = rustls_pemfile::private_key(&mut BufReader::new(&pem[..]))
        .with_context(|| format!("invalid private key in {}", cert_path.display()))?
        .with_context(|| format!("no private key found in {}", cert_path.display()))?;

    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let config = ServerConfig::builder_with_provider(provider)
        .with_protocol_versions(&[&rustls::version::TLS12, &rustls::version::TLS13])
        .context("failed to restrict TLS protocol versions")?
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .context("certificate chain and private key do not match")?;

    Ok(TlsAcceptor::from(Arc::new(config)))
}
