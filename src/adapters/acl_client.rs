use crate::domain::model::AllowedUpstream;
use crate::domain::ports::AccessControlList;
use crate::utils::error::{Result, RpaasError};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::time::Duration;
use url::Url;

/// REST client for the `/resources/{instance}/acl` endpoints.
#[derive(Debug, Clone)]
pub struct AclClient {
    client: Client,
    base_url: Url,
}

impl AclClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| RpaasError::InvalidConfigValueError {
            field: "api_url".to_string(),
            value: base_url.to_string(),
            reason: format!("Invalid URL format: {}", e),
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RpaasError::ApiError)?;

        Ok(Self { client, base_url })
    }

    fn acl_url(&self, instance: &str) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| RpaasError::ConfigError {
                message: format!("API URL {} cannot be a base", self.base_url),
            })?
            .pop_if_empty()
            .extend(["resources", instance, "acl"]);
        Ok(url)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        tracing::debug!("ACL API response status: {}", status);
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(RpaasError::ApiStatusError {
            status: status.as_u16(),
            message: message.trim().to_string(),
        })
    }
}

#[async_trait]
impl AccessControlList for AclClient {
    async fn add(&self, instance: &str, host: &str, port: u16) -> Result<()> {
        let url = self.acl_url(instance)?;
        tracing::debug!("Adding {}:{} to ACL at {}", host, port, url);
        let body = AllowedUpstream {
            host: host.to_string(),
            port,
        };
        let response = self.client.post(url).json(&body).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn list(&self, instance: &str) -> Result<Vec<AllowedUpstream>> {
        let url = self.acl_url(instance)?;
        tracing::debug!("Listing ACL at {}", url);
        let response = Self::check(self.client.get(url).send().await?).await?;
        // 部分版本在 ACL 為空時回傳 null
        let acls: Option<Vec<AllowedUpstream>> = response.json().await?;
        Ok(acls.unwrap_or_default())
    }

    async fn remove(&self, instance: &str, host: &str, port: u16) -> Result<()> {
        let url = self.acl_url(instance)?;
        tracing::debug!("Removing {}:{} from ACL at {}", host, port, url);
        let body = AllowedUpstream {
            host: host.to_string(),
            port,
        };
        let response = self.client.delete(url).json(&body).send().await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acl_url_joins_segments() {
        let client = AclClient::new("http://rpaas.example.com/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.acl_url("my instance").unwrap().as_str(),
            "http://rpaas.example.com/api/resources/my%20instance/acl"
        );

        let client = AclClient::new("http://rpaas.example.com", Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.acl_url("rpaas").unwrap().as_str(),
            "http://rpaas.example.com/resources/rpaas/acl"
        );
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        let err = AclClient::new("not a url", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, RpaasError::InvalidConfigValueError { .. }));
    }
}
