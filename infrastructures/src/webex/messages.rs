use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::{OffsetDateTime, UtcOffset};

use domains::models::messages::{
    EventPage, EventWindow, MessageEvent, MessageId, PageCursor, RoomType,
};
use domains::repositories::messages::{DeleteMessageError, MessageRepository};

use super::pagination::next_page_cursor;
use super::response_body;

#[derive(Debug, Deserialize)]
struct EventList {
    #[serde(default)]
    items: Vec<EventItem>,
}

#[derive(Debug, Deserialize)]
struct EventItem {
    data: MessageData,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageData {
    id: String,
    #[serde(with = "time::serde::rfc3339")]
    created: OffsetDateTime,
    #[serde(default)]
    person_email: String,
    #[serde(default)]
    room_type: String,
}

impl From<MessageData> for MessageEvent {
    fn from(data: MessageData) -> Self {
        Self {
            id: MessageId::gen(&data.id),
            created: data.created,
            person_email: data.person_email,
            room_type: RoomType::from_api_value(&data.room_type),
        }
    }
}

/// イベントAPIに渡す日時の文字列を生成する。
///
/// 秒未満を切り捨てたUTCのRFC 3339形式で返却する。
fn format_timestamp(timestamp: OffsetDateTime) -> anyhow::Result<String> {
    let timestamp = timestamp.to_offset(UtcOffset::UTC).replace_nanosecond(0)?;

    Ok(timestamp.format(&Rfc3339)?)
}

/// Webexのコンプライアンスオフィサー用APIクライアント
#[derive(Debug, Clone)]
pub struct WebexMessageRepository {
    client: Client,
    base_url: String,
    access_token: Secret<String>,
}

impl WebexMessageRepository {
    /// APIクライアントを構築する。
    ///
    /// # Arguments
    ///
    /// * `client` - HTTPクライアント。
    /// * `base_url` - REST APIのベースURL。
    /// * `access_token` - コンプライアンスオフィサーのアクセストークン。
    pub fn new(client: Client, base_url: &str, access_token: Secret<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            access_token,
        }
    }

    async fn read_page(&self, response: Response) -> anyhow::Result<EventPage> {
        let status = response.status();
        if !status.is_success() {
            let body = response_body(response).await;
            return Err(anyhow!("イベントを取得できませんでした。{}: {}", status, body));
        }
        let next = next_page_cursor(response.headers());
        let list: EventList = response
            .json()
            .await
            .context("イベントAPIのレスポンスを解析できません。")?;

        Ok(EventPage {
            items: list.items.into_iter().map(|item| item.data.into()).collect(),
            next,
        })
    }
}

#[async_trait]
impl MessageRepository for WebexMessageRepository {
    #[tracing::instrument(name = "List message created events", skip(self))]
    async fn first_page(&self, window: &EventWindow) -> anyhow::Result<EventPage> {
        let from = format_timestamp(window.from)?;
        let to = format_timestamp(window.to)?;
        let response = self
            .client
            .get(format!("{}/events", self.base_url))
            .bearer_auth(self.access_token.expose_secret())
            .query(&[
                ("resource", "messages"),
                ("type", "created"),
                ("from", from.as_str()),
                ("to", to.as_str()),
            ])
            .send()
            .await
            .context("イベントAPIにアクセスできませんでした。")?;

        self.read_page(response).await
    }

    #[tracing::instrument(name = "List next events page", skip(self))]
    async fn next_page(&self, cursor: &PageCursor) -> anyhow::Result<EventPage> {
        let response = self
            .client
            .get(&cursor.0)
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .context("イベントAPIにアクセスできませんでした。")?;

        self.read_page(response).await
    }

    #[tracing::instrument(name = "Delete message", skip(self), fields(message_id = %id))]
    async fn delete(&self, id: &MessageId) -> Result<(), DeleteMessageError> {
        let response = self
            .client
            .delete(format!("{}/messages/{}", self.base_url, id.value()))
            .bearer_auth(self.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| DeleteMessageError::UnexpectedError(e.into()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DeleteMessageError::NotFound(id.clone()));
        }
        if !status.is_success() {
            let body = response_body(response).await;
            return Err(DeleteMessageError::UnexpectedError(anyhow!(
                "メッセージ({})を削除できませんでした。{}: {}",
                id,
                status,
                body
            )));
        }

        Ok(())
    }
}
