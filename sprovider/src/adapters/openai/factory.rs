//! reqwest-backed factory for channel-configured OpenAI-compatible backends.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Proxy};

use crate::{BackendFactory, BackendFamily, Channel, ChatBackend, HttpBackendConfig, ProviderError};

use super::backend::OpenAiCompatibleBackend;
use super::transport::OpenAiHttpTransport;
use super::types::{OpenAiAuth, OpenAiEndpoint};

const OPENAI_SERVER: &str = "https://api.openai.com/v1";
const AZURE_API_VERSION: &str = "2023-05-15";

#[derive(Debug, Clone)]
pub struct HttpBackendFactory {
    config: HttpBackendConfig,
    direct: Client,
    proxied: Option<Client>,
}

impl HttpBackendFactory {
    pub fn new(config: HttpBackendConfig) -> Result<Self, ProviderError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let direct = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ProviderError::other(err.to_string()))?;

        let proxied = match config.proxy_url.as_deref().filter(|url| !url.trim().is_empty()) {
            Some(url) => {
                let proxy = Proxy::all(url)
                    .map_err(|err| ProviderError::invalid_request(err.to_string()))?;
                let client = Client::builder()
                    .timeout(timeout)
                    .proxy(proxy)
                    .build()
                    .map_err(|err| ProviderError::other(err.to_string()))?;
                Some(client)
            }
            None => None,
        };

        Ok(Self {
            config,
            direct,
            proxied,
        })
    }

    pub fn config(&self) -> &HttpBackendConfig {
        &self.config
    }

    pub fn endpoint_for(&self, family: BackendFamily, channel: &Channel) -> OpenAiEndpoint {
        let server = channel.server.trim();
        let secret = channel.secret.clone();

        match family {
            BackendFamily::OpenRouter => {
                let server = if server.is_empty() {
                    self.config.openrouter_server.as_str()
                } else {
                    server
                };
                OpenAiEndpoint::new(server, OpenAiAuth::Bearer(secret))
                    .with_header("HTTP-Referer", self.config.openrouter_referer.as_str())
                    .with_header("X-Title", self.config.openrouter_title.as_str())
            }
            BackendFamily::OpenAi if channel.meta.openai_azure => {
                let api_version = channel
                    .meta
                    .openai_azure_api_version
                    .clone()
                    .filter(|version| !version.trim().is_empty())
                    .unwrap_or_else(|| AZURE_API_VERSION.to_string());
                OpenAiEndpoint::new(
                    server,
                    OpenAiAuth::Azure {
                        key: secret,
                        api_version,
                    },
                )
            }
            BackendFamily::OpenAi | BackendFamily::OneApi => {
                let server = if server.is_empty() { OPENAI_SERVER } else { server };
                OpenAiEndpoint::new(server, OpenAiAuth::Bearer(secret))
            }
        }
    }

    fn client_for(&self, channel: &Channel) -> Client {
        match (&self.proxied, channel.meta.using_proxy) {
            (Some(proxied), true) => proxied.clone(),
            _ => self.direct.clone(),
        }
    }
}

impl BackendFactory for HttpBackendFactory {
    fn build(
        &self,
        family: BackendFamily,
        channel: &Channel,
    ) -> Result<Arc<dyn ChatBackend>, ProviderError> {
        if channel.secret.is_empty() {
            return Err(ProviderError::authentication(format!(
                "channel {} has no credential",
                channel.id
            )));
        }

        let endpoint = self.endpoint_for(family, channel);
        if endpoint.base_url.is_empty() {
            return Err(ProviderError::invalid_request(format!(
                "channel {} has no server configured",
                channel.id
            )));
        }

        let transport = OpenAiHttpTransport::new(self.client_for(channel), endpoint);
        Ok(Arc::new(OpenAiCompatibleBackend::new(Arc::new(transport))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChannelMeta, ProviderErrorKind};

    fn factory() -> HttpBackendFactory {
        HttpBackendFactory::new(HttpBackendConfig::default()).expect("factory builds")
    }

    #[test]
    fn openrouter_defaults_server_and_adds_attribution_headers() {
        let channel = Channel::new(7, "openrouter").with_secret("sk-or");
        let endpoint = factory().endpoint_for(BackendFamily::OpenRouter, &channel);

        assert_eq!(endpoint.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(endpoint.headers.get("X-Title").map(String::as_str), Some("AIdea"));
        assert!(endpoint.headers.contains_key("HTTP-Referer"));
    }

    #[test]
    fn azure_channel_uses_api_key_auth_with_version() {
        let channel = Channel::new(2, "openai")
            .with_server("https://corp.openai.azure.com")
            .with_secret("azure-key")
            .with_meta(ChannelMeta {
                openai_azure: true,
                ..ChannelMeta::default()
            });

        let endpoint = factory().endpoint_for(BackendFamily::OpenAi, &channel);
        match endpoint.auth {
            OpenAiAuth::Azure { ref api_version, .. } => assert_eq!(api_version, AZURE_API_VERSION),
            OpenAiAuth::Bearer(_) => panic!("azure channel must not use bearer auth"),
        }
    }

    #[test]
    fn build_rejects_channel_without_secret() {
        let channel = Channel::new(4, "oneapi").with_server("https://relay.example.com/v1");
        let error = factory()
            .build(BackendFamily::OneApi, &channel)
            .err()
            .expect("missing secret must fail");

        assert_eq!(error.kind, ProviderErrorKind::Authentication);
    }

    #[test]
    fn proxy_flag_without_proxy_url_falls_back_to_direct_client() {
        let channel = Channel::new(5, "openai").with_secret("sk").with_meta(ChannelMeta {
            using_proxy: true,
            ..ChannelMeta::default()
        });

        assert!(factory().build(BackendFamily::OpenAi, &channel).is_ok());
    }
}
