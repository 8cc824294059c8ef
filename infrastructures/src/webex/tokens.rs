use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use time::Duration;

use domains::models::credentials::TokenGrant;
use domains::repositories::tokens::{TokenEndpoint, TokenEndpointError};

use super::response_body;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: String,
    refresh_token_expires_in: i64,
    #[serde(default)]
    token_type: Option<String>,
}

impl From<TokenResponse> for TokenGrant {
    fn from(response: TokenResponse) -> Self {
        Self {
            access_token: Secret::new(response.access_token),
            refresh_token: Secret::new(response.refresh_token),
            expires_in: Duration::seconds(response.expires_in),
            refresh_token_expires_in: Duration::seconds(response.refresh_token_expires_in),
            token_type: response.token_type,
        }
    }
}

/// WebexのOAuth2トークンエンドポイント
#[derive(Debug, Clone)]
pub struct WebexTokenEndpoint {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: Secret<String>,
}

impl WebexTokenEndpoint {
    pub fn new(
        client: Client,
        token_url: &str,
        client_id: &str,
        client_secret: Secret<String>,
    ) -> Self {
        Self {
            client,
            token_url: token_url.to_owned(),
            client_id: client_id.to_owned(),
            client_secret,
        }
    }
}

#[async_trait]
impl TokenEndpoint for WebexTokenEndpoint {
    #[tracing::instrument(name = "Refresh access token", skip(self, refresh_token))]
    async fn refresh(
        &self,
        refresh_token: &Secret<String>,
    ) -> Result<TokenGrant, TokenEndpointError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret().as_str()),
                ("refresh_token", refresh_token.expose_secret().as_str()),
            ])
            .send()
            .await
            .map_err(|e| TokenEndpointError::UnexpectedError(e.into()))?;
        let status = response.status();
        // リフレッシュトークンが失効または取り消されている場合
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let body = response_body(response).await;
            return Err(TokenEndpointError::Rejected(format!("{}: {}", status, body)));
        }
        if !status.is_success() {
            let body = response_body(response).await;
            return Err(TokenEndpointError::UnexpectedError(anyhow::anyhow!(
                "トークンを更新できませんでした。{}: {}",
                status,
                body
            )));
        }
        let token: TokenResponse = response
            .json()
            .await
            .context("トークンエンドポイントのレスポンスを解析できません。")
            .map_err(TokenEndpointError::UnexpectedError)?;

        Ok(token.into())
    }
}
