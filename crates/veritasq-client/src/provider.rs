use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::SpaceConfig;
use crate::error::ClientError;
use crate::session::HttpSession;

/// A way of resolving a connection to the space.
///
/// Two implementations exist: deriving the canonical host from the space id
/// directly, and asking the Hub API for it. `connect_via` tries them in
/// order, so an unreachable or renamed canonical host falls back to the
/// Hub-resolved one.
#[async_trait]
pub trait SpaceProvider: Send + Sync {
    /// Short provider name, used in errors and logs.
    fn name(&self) -> &'static str;

    /// Establish a session for the configured space.
    async fn connect(&self, config: &SpaceConfig) -> Result<HttpSession, ClientError>;
}

/// Derives `https://{owner}-{name}.hf.space` from the space id.
#[derive(Debug, Default)]
pub struct DirectHostProvider;

/// Space id to canonical subdomain: lowercased, with `/`, `.` and `_`
/// mapped to `-`.
pub fn direct_base_url(space_id: &str) -> String {
    let subdomain: String = space_id
        .to_lowercase()
        .chars()
        .map(|c| match c {
            '/' | '.' | '_' => '-',
            other => other,
        })
        .collect();
    format!("https://{subdomain}.hf.space")
}

#[async_trait]
impl SpaceProvider for DirectHostProvider {
    fn name(&self) -> &'static str {
        "direct-host"
    }

    async fn connect(&self, config: &SpaceConfig) -> Result<HttpSession, ClientError> {
        let base_url = direct_base_url(&config.space_id);
        debug!(provider = self.name(), %base_url, "connecting");
        HttpSession::open(base_url, config.token.clone())
            .await
            .map_err(|e| ClientError::Connect {
                provider: self.name(),
                source: Box::new(e),
            })
    }
}

/// Asks the Hub API where the space is actually hosted.
#[derive(Debug, Default)]
pub struct HubLookupProvider;

#[derive(Debug, Deserialize)]
struct HostInfo {
    host: String,
}

#[async_trait]
impl SpaceProvider for HubLookupProvider {
    fn name(&self) -> &'static str {
        "hub-lookup"
    }

    async fn connect(&self, config: &SpaceConfig) -> Result<HttpSession, ClientError> {
        let lookup = async {
            let url = format!(
                "https://huggingface.co/api/spaces/{}/host",
                config.space_id
            );
            let req = reqwest::Client::new().get(&url);
            let req = match &config.token {
                Some(token) => req.bearer_auth(token),
                None => req,
            };
            let info: HostInfo = req
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            debug!(provider = "hub-lookup", host = %info.host, "space host resolved");
            HttpSession::open(info.host, config.token.clone()).await
        };

        lookup.await.map_err(|e: ClientError| ClientError::Connect {
            provider: self.name(),
            source: Box::new(e),
        })
    }
}

/// The production provider chain: direct host first, Hub lookup second.
pub fn default_providers() -> Vec<Box<dyn SpaceProvider>> {
    vec![
        Box::new(DirectHostProvider),
        Box::new(HubLookupProvider),
    ]
}

/// Try each provider in order; any failure moves to the next. The last
/// provider's error propagates when all fail. No retries, no caching:
/// every call re-resolves.
pub async fn connect_via(
    providers: &[Box<dyn SpaceProvider>],
    config: &SpaceConfig,
) -> Result<HttpSession, ClientError> {
    let mut last_err = None;
    for provider in providers {
        match provider.connect(config).await {
            Ok(session) => return Ok(session),
            Err(e) => {
                warn!(provider = provider.name(), error = %e, "provider failed, trying next");
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap_or(ClientError::NoEndpoint))
}
