//! Transport security for pooled connections.
//!
//! Plain connections go through [`AsyncConnection::establish`]. TLS
//! connections are opened with `tokio-postgres` over `rustls` and handed to
//! diesel-async afterwards.
//!
//! [`AsyncConnection::establish`]: diesel_async::AsyncConnection::establish

use std::fmt;
use std::sync::Arc;

use diesel::ConnectionError;
use diesel_async::AsyncPgConnection;
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::CryptoProvider;
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use serde::{Deserialize, Serialize};
use tokio_postgres_rustls::MakeRustlsConnect;

/// How connections to the database are secured.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum PgTlsMode {
    /// Plain TCP, for local development databases.
    Disable,
    /// TLS without certificate verification.
    ///
    /// Needed for managed providers that present self-signed chains.
    Require,
    /// TLS verified against the Mozilla root store.
    #[default]
    VerifyFull,
}

impl PgTlsMode {
    /// Returns whether connections are encrypted.
    #[inline]
    pub fn is_encrypted(self) -> bool {
        !matches!(self, PgTlsMode::Disable)
    }

    /// Returns whether the server certificate is verified.
    #[inline]
    pub fn verifies_certificate(self) -> bool {
        matches!(self, PgTlsMode::VerifyFull)
    }
}

impl fmt::Display for PgTlsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PgTlsMode::Disable => f.write_str("disable"),
            PgTlsMode::Require => f.write_str("require"),
            PgTlsMode::VerifyFull => f.write_str("verify-full"),
        }
    }
}

/// Opens a TLS connection and wraps it into an [`AsyncPgConnection`].
pub(crate) async fn establish_tls(
    addr: &str,
    verify_certificate: bool,
) -> Result<AsyncPgConnection, ConnectionError> {
    let config = client_config(verify_certificate)
        .map_err(|err| ConnectionError::BadConnection(err.to_string()))?;

    let (client, connection) = tokio_postgres::connect(addr, MakeRustlsConnect::new(config))
        .await
        .map_err(|err| ConnectionError::BadConnection(err.to_string()))?;

    AsyncPgConnection::try_from_client_and_connection(client, connection).await
}

/// Builds the rustls client configuration on the ring provider.
fn client_config(verify_certificate: bool) -> Result<ClientConfig, rustls::Error> {
    let provider = Arc::new(rustls::crypto::ring::default_provider());
    let builder =
        ClientConfig::builder_with_provider(provider.clone()).with_safe_default_protocol_versions()?;

    let config = if verify_certificate {
        let mut roots = RootCertStore::empty();
        roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        builder.with_root_certificates(roots).with_no_client_auth()
    } else {
        builder
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate(provider)))
            .with_no_client_auth()
    };

    Ok(config)
}

/// Accepts any server certificate while still checking handshake signatures.
#[derive(Debug)]
struct AcceptAnyCertificate(Arc<CryptoProvider>);

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls12_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        rustls::crypto::verify_tls13_signature(
            message,
            cert,
            dss,
            &self.0.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.0.signature_verification_algorithms.supported_schemes()
    }
}
