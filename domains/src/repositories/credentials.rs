use async_trait::async_trait;

use crate::models::credentials::Credential;

/// クレデンシャルを保存するリポジトリ
///
/// 保存先を差し替えられるように、読み込みと保存のみを定義する。
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    /// 保存されているクレデンシャルを読み込む。
    ///
    /// # Returns
    ///
    /// クレデンシャル。保存されていない場合は`None`。
    async fn load(&self) -> anyhow::Result<Option<Credential>>;

    /// クレデンシャル全体を上書きして保存する。
    async fn save(&self, credential: &Credential) -> anyhow::Result<()>;
}
