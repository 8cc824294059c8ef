use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use domains::models::credentials::Credential;
use domains::repositories::credentials::CredentialRepository;

const NANOS_PER_SECOND: f64 = 1_000_000_000.0;

#[derive(Debug, thiserror::Error)]
pub enum CredentialFileError {
    #[error("トークンファイル({0})を読み書きできませんでした。{1}")]
    IoError(PathBuf, std::io::Error),
    #[error("トークンファイル({0})を解析できません。{1}")]
    ParseError(PathBuf, serde_json::Error),
    #[error("トークンファイル({0})に記録されている有効期限が不正です。")]
    InvalidExpiration(PathBuf),
}

/// トークンファイルに記録するクレデンシャルレコード
///
/// `expires_at`はUNIXエポック秒で、小数を含む場合がある。
#[derive(Debug, Serialize, Deserialize)]
struct CredentialRecord {
    access_token: String,
    refresh_token: String,
    expires_at: f64,
    expires_in: i64,
    refresh_token_expires_in: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token_type: Option<String>,
}

impl CredentialRecord {
    fn from_credential(credential: &Credential) -> Self {
        Self {
            access_token: credential.access_token.expose_secret().to_owned(),
            refresh_token: credential.refresh_token.expose_secret().to_owned(),
            expires_at: credential.expires_at.unix_timestamp_nanos() as f64 / NANOS_PER_SECOND,
            expires_in: credential.expires_in.whole_seconds(),
            refresh_token_expires_in: credential.refresh_token_expires_in.whole_seconds(),
            token_type: credential.token_type.clone(),
        }
    }

    fn into_credential(self, path: &Path) -> Result<Credential, CredentialFileError> {
        if !self.expires_at.is_finite() {
            return Err(CredentialFileError::InvalidExpiration(path.to_owned()));
        }
        let nanos = (self.expires_at * NANOS_PER_SECOND).round() as i128;
        let expires_at = OffsetDateTime::from_unix_timestamp_nanos(nanos)
            .map_err(|_| CredentialFileError::InvalidExpiration(path.to_owned()))?;

        let credential = Credential {
            access_token: Secret::new(self.access_token),
            refresh_token: Secret::new(self.refresh_token),
            expires_at,
            expires_in: Duration::seconds(self.expires_in),
            refresh_token_expires_in: Duration::seconds(self.refresh_token_expires_in),
            token_type: self.token_type,
        };
        if credential.refresh_token_expires_at().is_none() {
            return Err(CredentialFileError::InvalidExpiration(path.to_owned()));
        }

        Ok(credential)
    }
}

/// JSONファイルにクレデンシャルを保存するリポジトリ
#[derive(Debug, Clone)]
pub struct FileCredentialRepository {
    path: PathBuf,
}

impl FileCredentialRepository {
    /// リポジトリを構築する。
    ///
    /// # Arguments
    ///
    /// * `path` - トークンファイルのパス。
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// トークンファイルのパスを返却する。
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialRepository for FileCredentialRepository {
    #[tracing::instrument(name = "Load credential", skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> anyhow::Result<Option<Credential>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!("token file does not exist");
                return Ok(None);
            }
            Err(e) => return Err(CredentialFileError::IoError(self.path.clone(), e).into()),
        };
        let record: CredentialRecord = serde_json::from_str(&content)
            .map_err(|e| CredentialFileError::ParseError(self.path.clone(), e))?;

        Ok(Some(record.into_credential(&self.path)?))
    }

    #[tracing::instrument(name = "Save credential", skip(self, credential), fields(path = %self.path.display()))]
    async fn save(&self, credential: &Credential) -> anyhow::Result<()> {
        let record = CredentialRecord::from_credential(credential);
        let content = serde_json::to_string_pretty(&record)
            .map_err(|e| CredentialFileError::ParseError(self.path.clone(), e))?;
        // ファイル全体を上書き
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| CredentialFileError::IoError(self.path.clone(), e))?;

        Ok(())
    }
}
