use std::time::Duration;

use anyhow::{Context, bail};
use async_trait::async_trait;

/// Downloads the avatar a provider reports for a new federated account.
#[async_trait]
pub trait AvatarFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>>;
}

#[derive(Debug, Clone)]
pub struct HttpAvatarFetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: usize,
}

impl Default for HttpAvatarFetcher {
    fn default() -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(5),
            max_bytes: 1024 * 1024,
        }
    }
}

#[async_trait]
impl AvatarFetcher for HttpAvatarFetcher {
    async fn fetch(&self, url: &str) -> anyhow::Result<Vec<u8>> {
        let bytes = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .context("Failed to request avatar")?
            .error_for_status()
            .context("Avatar host returned an error")?
            .bytes()
            .await
            .context("Failed to read avatar body")?;

        if bytes.is_empty() {
            bail!("Avatar is empty");
        }
        if bytes.len() > self.max_bytes {
            bail!("Avatar exceeds {} bytes", self.max_bytes);
        }

        Ok(bytes.to_vec())
    }
}
