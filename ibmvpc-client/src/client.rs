//! HTTP implementation of `VpcApi`

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::api::VpcApi;
use crate::auth::{Authenticator, IamAuthenticator};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::models::{
    BareMetalServerNetworkAttachmentCollection, DnsResolutionBinding,
    DnsResolutionBindingCollection, DnsResolutionBindingPatch, DnsResolutionBindingPrototype,
    EndpointGateway, EndpointGatewayPatch, EndpointGatewayPrototype, RouteCollection, Vpc,
    VpcPatch,
};
use crate::pager::PAGE_LIMIT;

const MERGE_PATCH: &str = "application/merge-patch+json";

/// VPC API client over HTTPS
pub struct VpcClient {
    http: reqwest::Client,
    base_url: String,
    api_version: String,
    auth: Authenticator,
}

impl VpcClient {
    /// Create a client authenticating with the configured API key
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let auth = Authenticator::Iam(IamAuthenticator::new(&config));
        Self::build(&config, auth)
    }

    /// Create a client using a pre-issued bearer token
    pub fn with_bearer_token(config: ClientConfig, token: impl Into<String>) -> Result<Self> {
        Self::build(&config, Authenticator::Bearer(token.into()))
    }

    fn build(config: &ClientConfig, auth: Authenticator) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: config.service_url(),
            api_version: config.api_version.clone(),
            auth,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.auth.token(&self.http).await?;
        Ok(self
            .http
            .request(method, self.url(path))
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .query(&[
                ("version", self.api_version.as_str()),
                ("generation", "2"),
            ]))
    }

    async fn execute(&self, method: &Method, path: &str, request: RequestBuilder) -> Result<String> {
        log::debug!("{} {}", method, path);
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            log::debug!("{} {} returned HTTP {}", method, path, status.as_u16());
            return Err(ClientError::from_response(status.as_u16(), &body));
        }
        Ok(body)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.request(Method::GET, path).await?;
        let body = self.execute(&Method::GET, path, request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn list<T: DeserializeOwned>(&self, path: &str, start: Option<String>) -> Result<T> {
        let limit = PAGE_LIMIT.to_string();
        let mut request = self
            .request(Method::GET, path)
            .await?
            .query(&[("limit", limit.as_str())]);
        if let Some(start) = &start {
            request = request.query(&[("start", start.as_str())]);
        }
        let body = self.execute(&Method::GET, path, request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let request = self.request(Method::POST, path).await?.json(body);
        let body = self.execute(&Method::POST, path, request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn patch<B: Serialize + Sync, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let payload = serde_json::to_vec(body)?;
        let request = self
            .request(Method::PATCH, path)
            .await?
            .header(CONTENT_TYPE, MERGE_PATCH)
            .body(payload);
        let body = self.execute(&Method::PATCH, path, request).await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let request = self.request(Method::DELETE, path).await?;
        self.execute(&Method::DELETE, path, request).await?;
        Ok(())
    }
}

#[async_trait]
impl VpcApi for VpcClient {
    async fn get_vpc(&self, id: &str) -> Result<Vpc> {
        self.get(&format!("vpcs/{}", id)).await
    }

    async fn update_vpc(&self, id: &str, patch: &VpcPatch) -> Result<Vpc> {
        self.patch(&format!("vpcs/{}", id), patch).await
    }

    async fn create_dns_resolution_binding(
        &self,
        vpc_id: &str,
        prototype: &DnsResolutionBindingPrototype,
    ) -> Result<DnsResolutionBinding> {
        self.post(&format!("vpcs/{}/dns_resolution_bindings", vpc_id), prototype)
            .await
    }

    async fn get_dns_resolution_binding(
        &self,
        vpc_id: &str,
        id: &str,
    ) -> Result<DnsResolutionBinding> {
        self.get(&format!("vpcs/{}/dns_resolution_bindings/{}", vpc_id, id))
            .await
    }

    async fn update_dns_resolution_binding(
        &self,
        vpc_id: &str,
        id: &str,
        patch: &DnsResolutionBindingPatch,
    ) -> Result<DnsResolutionBinding> {
        self.patch(
            &format!("vpcs/{}/dns_resolution_bindings/{}", vpc_id, id),
            patch,
        )
        .await
    }

    async fn delete_dns_resolution_binding(&self, vpc_id: &str, id: &str) -> Result<()> {
        self.delete(&format!("vpcs/{}/dns_resolution_bindings/{}", vpc_id, id))
            .await
    }

    async fn list_dns_resolution_bindings(
        &self,
        vpc_id: &str,
        start: Option<String>,
    ) -> Result<DnsResolutionBindingCollection> {
        self.list(&format!("vpcs/{}/dns_resolution_bindings", vpc_id), start)
            .await
    }

    async fn create_endpoint_gateway(
        &self,
        prototype: &EndpointGatewayPrototype,
    ) -> Result<EndpointGateway> {
        self.post("endpoint_gateways", prototype).await
    }

    async fn get_endpoint_gateway(&self, id: &str) -> Result<EndpointGateway> {
        self.get(&format!("endpoint_gateways/{}", id)).await
    }

    async fn update_endpoint_gateway(
        &self,
        id: &str,
        patch: &EndpointGatewayPatch,
    ) -> Result<EndpointGateway> {
        self.patch(&format!("endpoint_gateways/{}", id), patch).await
    }

    async fn delete_endpoint_gateway(&self, id: &str) -> Result<()> {
        self.delete(&format!("endpoint_gateways/{}", id)).await
    }

    async fn list_bare_metal_server_network_attachments(
        &self,
        bare_metal_server_id: &str,
        start: Option<String>,
    ) -> Result<BareMetalServerNetworkAttachmentCollection> {
        self.list(
            &format!("bare_metal_servers/{}/network_attachments", bare_metal_server_id),
            start,
        )
        .await
    }

    async fn list_vpc_routing_table_routes(
        &self,
        vpc_id: &str,
        routing_table_id: &str,
        start: Option<String>,
    ) -> Result<RouteCollection> {
        self.list(
            &format!("vpcs/{}/routing_tables/{}/routes", vpc_id, routing_table_id),
            start,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_missing_api_key() {
        let result = VpcClient::new(ClientConfig::new(""));
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[test]
    fn builds_regional_urls() {
        let client = VpcClient::with_bearer_token(
            ClientConfig::new("key").with_region("jp-tok"),
            "token",
        )
        .unwrap();
        assert_eq!(client.base_url(), "https://jp-tok.iaas.cloud.ibm.com/v1");
        assert_eq!(
            client.url("/vpcs/r022-1/dns_resolution_bindings"),
            "https://jp-tok.iaas.cloud.ibm.com/v1/vpcs/r022-1/dns_resolution_bindings"
        );
    }

    #[tokio::test]
    async fn requests_carry_version_and_generation() {
        let client = VpcClient::with_bearer_token(
            ClientConfig::new("key").with_api_version("2024-06-01"),
            "secret-token",
        )
        .unwrap();

        let request = client
            .request(Method::GET, "vpcs/r006-1")
            .await
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "https://us-south.iaas.cloud.ibm.com/v1/vpcs/r006-1?version=2024-06-01&generation=2"
        );
        assert_eq!(
            request.headers().get(reqwest::header::AUTHORIZATION).unwrap(),
            "Bearer secret-token"
        );
    }
}
