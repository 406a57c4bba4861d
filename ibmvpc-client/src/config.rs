//! Client configuration
//!
//! Values can be set explicitly with the builder methods or loaded from the
//! same environment variables the IBM Cloud tooling uses.

use std::time::Duration;

use crate::error::{ClientError, Result};

pub const DEFAULT_REGION: &str = "us-south";
pub const DEFAULT_IAM_ENDPOINT: &str = "https://iam.cloud.ibm.com";
/// VPC API version date sent with every request
pub const DEFAULT_API_VERSION: &str = "2024-11-12";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const API_KEY_VARS: &[&str] = &["IC_API_KEY", "IBMCLOUD_API_KEY"];
const REGION_VARS: &[&str] = &["IC_REGION", "IBMCLOUD_REGION"];
const ENDPOINT_VARS: &[&str] = &["IBMCLOUD_IS_NG_API_ENDPOINT"];
const IAM_ENDPOINT_VARS: &[&str] = &["IBMCLOUD_IAM_API_ENDPOINT"];

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub region: String,
    /// Overrides the regional VPC endpoint (e.g., for private endpoints)
    pub endpoint: Option<String>,
    pub iam_endpoint: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
            iam_endpoint: DEFAULT_IAM_ENDPOINT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_iam_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.iam_endpoint = endpoint.into();
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let first = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| lookup(k).filter(|v| !v.trim().is_empty()))
        };

        let api_key = first(API_KEY_VARS).ok_or_else(|| {
            ClientError::Config(format!(
                "API key not set; export one of {}",
                API_KEY_VARS.join(", ")
            ))
        })?;

        let mut config = Self::new(api_key);
        if let Some(region) = first(REGION_VARS) {
            config.region = region;
        }
        if let Some(endpoint) = first(ENDPOINT_VARS) {
            config.endpoint = Some(endpoint);
        }
        if let Some(iam) = first(IAM_ENDPOINT_VARS) {
            config.iam_endpoint = iam;
        }
        Ok(config)
    }

    /// Base URL of the VPC API, without a trailing slash
    pub fn service_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => {
                let endpoint = endpoint.trim_end_matches('/');
                if endpoint.ends_with("/v1") {
                    endpoint.to_string()
                } else {
                    format!("{}/v1", endpoint)
                }
            }
            None => format!("https://{}.iaas.cloud.ibm.com/v1", self.region),
        }
    }

    /// IAM token endpoint
    pub fn token_url(&self) -> String {
        format!(
            "{}/identity/token",
            self.iam_endpoint.trim_end_matches('/')
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(ClientError::Config("API key must not be empty".to_string()));
        }
        if self.region.trim().is_empty() && self.endpoint.is_none() {
            return Err(ClientError::Config(
                "either a region or an explicit endpoint is required".to_string(),
            ));
        }
        Ok(())
    }
}
