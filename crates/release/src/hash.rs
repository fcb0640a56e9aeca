//! Streaming content hashing.
//!
//! Downloads a resource chunk by chunk and feeds every chunk into a SHA-256
//! digest, so the body is never held in memory as a whole. The digest is
//! rendered as standard base64, the form the manifest's `sha256` field is
//! written in.

use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use sha2::{Digest, Sha256};
use tracing::debug;

/// Computes the checksum of a remote resource.
#[async_trait]
pub trait ContentHasher: Send + Sync {
    /// Download `url` and return its checksum.
    async fn digest(&self, url: &str) -> Result<String>;
}

/// Returns `true` for the two supported wire schemes.
fn is_supported_scheme(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    lower.starts_with("https://") || lower.starts_with("http://")
}

/// Encode a finished SHA-256 digest in the manifest's textual form.
#[must_use]
pub fn encode_digest(digest: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(digest)
}

/// [`ContentHasher`] that streams over HTTP(S).
///
/// There is no retry policy; a failed download is reported to the caller.
#[derive(Debug, Clone)]
pub struct HttpContentHasher {
    client: Client,
}

impl HttpContentHasher {
    /// Creates a hasher using the given HTTP client.
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }

    /// Creates a hasher with a default client identifying as `user_agent`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the TLS backend cannot be initialised.
    pub fn with_user_agent(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::invalid_input(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self::new(client))
    }
}

#[async_trait]
impl ContentHasher for HttpContentHasher {
    async fn digest(&self, url: &str) -> Result<String> {
        if !is_supported_scheme(url) {
            return Err(Error::unsupported_scheme(url));
        }

        debug!(%url, "Computing SHA-256 of remote content");
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::transport(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::download(url, status.as_u16()));
        }

        let mut hasher = Sha256::new();
        let mut total: u64 = 0;
        while let Some(chunk) = response.chunk().await.map_err(|e| Error::transport(url, e))? {
            total += chunk.len() as u64;
            hasher.update(&chunk);
        }

        let checksum = encode_digest(&hasher.finalize());
        debug!(%url, bytes = total, sha256 = %checksum, "Computed checksum");
        Ok(checksum)
    }
}
