//! Provider configuration
//!
//! Route table resources name a provider configuration through their
//! `provider_ref`. This module holds those named configurations and resolves
//! them into an AWS SDK configuration.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use vpcroute_core::error::BoxError;
use vpcroute_core::managed::ProviderReference;
use vpcroute_core::routetable::ConfigResolver;

/// Errors that can occur when loading or looking up provider configurations
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration is registered under the referenced name
    #[error("Provider configuration not found: {0}")]
    NotFound(String),

    #[error("Region is required for provider configuration {0}")]
    MissingRegion(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid provider configuration: {0}")]
    Invalid(#[from] serde_json::Error),
}

/// Configuration of one AWS provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// AWS region, either "ap-northeast-1" or "aws.Region.ap_northeast_1"
    pub region: String,
    /// Named profile from the shared AWS config files
    #[serde(default)]
    pub profile: Option<String>,
    /// Endpoint override (e.g., a local EC2 emulator)
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl ProviderConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            profile: None,
            endpoint_url: None,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    /// Region in AWS format
    pub fn aws_region(&self) -> String {
        convert_region_value(&self.region)
    }
}

/// Named provider configurations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderConfigs {
    providers: HashMap<String, ProviderConfig>,
}

impl ProviderConfigs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, name: impl Into<String>, config: ProviderConfig) -> Self {
        self.providers.insert(name.into(), config);
        self
    }

    /// Load configurations from a JSON object keyed by provider name
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let configs: ProviderConfigs = serde_json::from_str(&content)?;

        for (name, config) in &configs.providers {
            if config.region.trim().is_empty() {
                return Err(ConfigError::MissingRegion(name.clone()));
            }
        }

        Ok(configs)
    }

    pub fn get(&self, provider: &ProviderReference) -> Result<&ProviderConfig, ConfigError> {
        self.providers
            .get(&provider.name)
            .ok_or_else(|| ConfigError::NotFound(provider.name.clone()))
    }
}

/// Resolves provider references into loaded AWS SDK configurations
pub struct AwsConfigResolver {
    configs: ProviderConfigs,
}

impl AwsConfigResolver {
    pub fn new(configs: ProviderConfigs) -> Self {
        Self { configs }
    }
}

#[async_trait]
impl ConfigResolver for AwsConfigResolver {
    type Config = SdkConfig;

    async fn resolve(&self, provider: &ProviderReference) -> Result<SdkConfig, BoxError> {
        let config = self.configs.get(provider)?;
        let region = config.aws_region();
        if region.is_empty() {
            return Err(ConfigError::MissingRegion(provider.name.clone()).into());
        }
        debug!("Loading AWS config for provider {} in {}", provider.name, region);

        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region));
        if let Some(profile) = &config.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint_url) = &config.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }

        Ok(loader.load().await)
    }
}

/// Convert region value from DSL format to AWS format
/// e.g., "aws.Region.ap_northeast_1" -> "ap-northeast-1"
fn convert_region_value(value: &str) -> String {
    match value.strip_prefix("aws.Region.") {
        Some(region) => region.replace('_', "-"),
        None => value.to_string(),
    }
}
