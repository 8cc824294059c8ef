use anyhow::anyhow;
use time::OffsetDateTime;

use domains::models::credentials::Credential;
use domains::repositories::credentials::CredentialRepository;
use domains::repositories::tokens::{TokenEndpoint, TokenEndpointError};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error(transparent)]
    UnexpectedError(anyhow::Error),
    #[error("アクセストークンが存在しないか、リフレッシュトークンの有効期限が切れています。コンプライアンスオフィサーを再認証してください。")]
    AuthenticationRequired,
}

/// 取得したアクセストークン構造体
#[derive(Debug, Clone)]
pub struct ObtainedToken {
    /// 有効なクレデンシャル
    pub credential: Credential,
    /// トークンを更新した場合は`true`
    pub refreshed: bool,
}

/// 有効なアクセストークンを取得する。
///
/// 保存されているクレデンシャルを読み込み、アクセストークンの有効期限が切れている場合は、
/// リフレッシュトークンを使用してトークンを更新して保存する。リフレッシュトークンの有効期限も
/// 切れている場合は、ネットワークにアクセスせずに再認証を要求する。
///
/// # Arguments
///
/// * `credentials` - クレデンシャルリポジトリ。
/// * `endpoint` - トークンエンドポイント。
/// * `now` - 現在日時。
///
/// # Returns
///
/// 有効なアクセストークン。
#[tracing::instrument(name = "Obtain access token", skip(credentials, endpoint))]
pub async fn obtain_access_token<C, T>(
    credentials: &C,
    endpoint: &T,
    now: OffsetDateTime,
) -> Result<ObtainedToken, TokenError>
where
    C: CredentialRepository + ?Sized,
    T: TokenEndpoint + ?Sized,
{
    // 保存されているクレデンシャルを読み込み
    let credential = credentials
        .load()
        .await
        .map_err(TokenError::UnexpectedError)?;
    let credential = match credential {
        Some(credential) => credential,
        None => {
            tracing::warn!("no stored credential");
            return Err(TokenError::AuthenticationRequired);
        }
    };

    // リフレッシュトークンの有効期限が切れている場合は、再認証が必要
    let refresh_token_expires_at = credential.refresh_token_expires_at().ok_or_else(|| {
        TokenError::UnexpectedError(anyhow!(
            "保存されているトークンのリフレッシュトークンの有効期限を計算できません。"
        ))
    })?;
    if now > refresh_token_expires_at {
        tracing::warn!(%refresh_token_expires_at, "refresh token expired");
        return Err(TokenError::AuthenticationRequired);
    }

    if !credential.is_access_token_expired(now) {
        tracing::info!(expires_at = %credential.expires_at, "using stored access token");
        return Ok(ObtainedToken {
            credential,
            refreshed: false,
        });
    }

    // リフレッシュトークンでトークンを更新
    tracing::info!(expires_at = %credential.expires_at, "access token expired, refreshing");
    let grant = endpoint
        .refresh(&credential.refresh_token)
        .await
        .map_err(|e| match e {
            TokenEndpointError::Rejected(reason) => {
                tracing::warn!(%reason, "refresh token rejected");
                TokenError::AuthenticationRequired
            }
            TokenEndpointError::UnexpectedError(e) => TokenError::UnexpectedError(e),
        })?;
    let refreshed = Credential::issue(grant, now).ok_or_else(|| {
        TokenError::UnexpectedError(anyhow!(
            "トークンエンドポイントが返却したトークンの有効期間が不正です。"
        ))
    })?;

    // 更新したクレデンシャルでファイル全体を上書き
    credentials
        .save(&refreshed)
        .await
        .map_err(TokenError::UnexpectedError)?;
    tracing::info!(expires_at = %refreshed.expires_at, "stored refreshed credential");

    Ok(ObtainedToken {
        credential: refreshed,
        refreshed: true,
    })
}
