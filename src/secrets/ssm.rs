use crate::config::Config;
use crate::error::ViewerError;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_ssm::Client;
use aws_sdk_ssm::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_ssm::operation::get_parameter::GetParameterError;
use tracing::debug;

/// Looks up a single decrypted value by name.
#[async_trait]
pub trait SecretResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<String, ViewerError>;
}

/// `SecretResolver` backed by AWS Systems Manager Parameter Store.
#[derive(Clone)]
pub struct SsmSecretResolver {
    client: Client,
}

impl SsmSecretResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client for the configured region, using the default
    /// credential chain.
    pub async fn from_config(cfg: &Config) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(cfg.region.clone()));
        if let Some(endpoint) = cfg.ssm_endpoint.clone() {
            loader = loader.endpoint_url(endpoint);
        }
        let shared_config = loader.load().await;
        Self::new(Client::new(&shared_config))
    }
}

#[async_trait]
impl SecretResolver for SsmSecretResolver {
    async fn resolve(&self, name: &str) -> Result<String, ViewerError> {
        let output = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|err| classify_error(name, err.into_service_error()))?;

        debug!(parameter = %name, "parameter resolved");
        output
            .parameter()
            .and_then(|p| p.value())
            .map(str::to_string)
            .ok_or_else(|| ViewerError::SecretNotFound {
                name: name.to_string(),
            })
    }
}

fn classify_error(name: &str, err: GetParameterError) -> ViewerError {
    if err.is_parameter_not_found() {
        return ViewerError::SecretNotFound {
            name: name.to_string(),
        };
    }
    let message = match (err.code(), err.message()) {
        (Some(code), Some(message)) => format!("{code}: {message}"),
        _ => DisplayErrorContext(&err).to_string(),
    };
    ViewerError::SecretAccess {
        name: name.to_string(),
        message,
    }
}
