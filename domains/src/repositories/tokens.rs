use async_trait::async_trait;
use secrecy::Secret;

use crate::models::credentials::TokenGrant;

#[derive(Debug, thiserror::Error)]
pub enum TokenEndpointError {
    #[error(transparent)]
    UnexpectedError(anyhow::Error),
    #[error("トークンエンドポイントがリフレッシュトークンを拒否しました。{0}")]
    Rejected(String),
}

/// OAuth2トークンエンドポイント
#[async_trait]
pub trait TokenEndpoint: Send + Sync {
    /// リフレッシュトークンを新しいトークンと交換する。
    ///
    /// # Arguments
    ///
    /// * `refresh_token` - リフレッシュトークン。
    ///
    /// # Returns
    ///
    /// トークンエンドポイントが発行したトークン。
    async fn refresh(&self, refresh_token: &Secret<String>)
        -> Result<TokenGrant, TokenEndpointError>;
}
