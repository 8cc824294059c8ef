use async_trait::async_trait;

use crate::models::messages::{EventPage, EventWindow, MessageId, PageCursor};

#[derive(Debug, thiserror::Error)]
pub enum DeleteMessageError {
    #[error(transparent)]
    UnexpectedError(anyhow::Error),
    #[error("メッセージ({0})が存在しません。")]
    NotFound(MessageId),
}

/// コンプライアンスAPIを通じてメッセージを操作するリポジトリ
#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// 期間内のメッセージ作成イベントの最初のページを取得する。
    ///
    /// # Arguments
    ///
    /// * `window` - イベントを取得する期間。
    ///
    /// # Returns
    ///
    /// イベントのページ。
    async fn first_page(&self, window: &EventWindow) -> anyhow::Result<EventPage>;

    /// カーソルが示す次のページを取得する。
    async fn next_page(&self, cursor: &PageCursor) -> anyhow::Result<EventPage>;

    /// メッセージを削除する。
    async fn delete(&self, id: &MessageId) -> Result<(), DeleteMessageError>;
}
