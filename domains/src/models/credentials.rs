use secrecy::Secret;
use time::{Duration, OffsetDateTime};

/// トークンエンドポイントが発行したトークン構造体
#[derive(Debug, Clone)]
pub struct TokenGrant {
    /// アクセストークン
    pub access_token: Secret<String>,
    /// リフレッシュトークン
    pub refresh_token: Secret<String>,
    /// アクセストークンの有効期間
    pub expires_in: Duration,
    /// リフレッシュトークンの有効期間
    pub refresh_token_expires_in: Duration,
    /// トークンタイプ
    pub token_type: Option<String>,
}

/// クレデンシャル構造体
///
/// コンプライアンスオフィサーのアクセストークンとリフレッシュトークンを保持する。
#[derive(Debug, Clone)]
pub struct Credential {
    /// アクセストークン
    pub access_token: Secret<String>,
    /// リフレッシュトークン
    pub refresh_token: Secret<String>,
    /// アクセストークンの有効期限
    pub expires_at: OffsetDateTime,
    /// 発行時点のアクセストークンの有効期間
    pub expires_in: Duration,
    /// 発行時点のリフレッシュトークンの有効期間
    pub refresh_token_expires_in: Duration,
    /// トークンタイプ
    pub token_type: Option<String>,
}

impl Credential {
    /// トークンエンドポイントが発行したトークンからクレデンシャルを構築する。
    ///
    /// # Arguments
    ///
    /// * `grant` - トークンエンドポイントが発行したトークン。
    /// * `issued_at` - トークンを受け取った日時。
    ///
    /// # Returns
    ///
    /// クレデンシャルインスタンス。有効期限が日時の範囲を超える場合は`None`。
    pub fn issue(grant: TokenGrant, issued_at: OffsetDateTime) -> Option<Self> {
        let credential = Self {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at: issued_at.checked_add(grant.expires_in)?,
            expires_in: grant.expires_in,
            refresh_token_expires_in: grant.refresh_token_expires_in,
            token_type: grant.token_type,
        };
        credential.refresh_token_expires_at()?;

        Some(credential)
    }

    /// リフレッシュトークンの有効期限を返却する。
    ///
    /// リフレッシュトークンの有効期限は保存されていないため、アクセストークンの有効期限に
    /// 発行時点の両トークンの有効期間の差を加算して求める。計算結果が日時の範囲を超える
    /// 場合は`None`を返却する。
    pub fn refresh_token_expires_at(&self) -> Option<OffsetDateTime> {
        let remaining = self
            .refresh_token_expires_in
            .checked_sub(self.expires_in)?;

        self.expires_at.checked_add(remaining)
    }

    /// アクセストークンの有効期限が切れているか確認する。
    pub fn is_access_token_expired(&self, now: OffsetDateTime) -> bool {
        now > self.expires_at
    }

    /// リフレッシュトークンの有効期限が切れているか確認する。
    ///
    /// 有効期限を計算できない場合は`None`を返却する。
    pub fn is_refresh_token_expired(&self, now: OffsetDateTime) -> Option<bool> {
        self.refresh_token_expires_at()
            .map(|expires_at| now > expires_at)
    }
}
