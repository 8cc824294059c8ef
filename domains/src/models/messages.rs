use std::fmt;

use time::{Duration, OffsetDateTime};

/// メッセージID構造体
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageId {
    value: String,
}

impl MessageId {
    /// メッセージIDインスタンスを構築する。
    pub fn gen(value: &str) -> Self {
        Self {
            value: value.to_owned(),
        }
    }

    /// メッセージIDを文字列で返却する。
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// スペースの種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomType {
    /// 1対1のスペース
    Direct,
    /// 複数人のスペース
    Group,
    /// 上記以外
    Other,
}

impl RoomType {
    /// APIが返却した文字列からスペースの種類を取得する。
    pub fn from_api_value(value: &str) -> Self {
        match value {
            "direct" => Self::Direct,
            "group" => Self::Group,
            _ => Self::Other,
        }
    }
}

/// メッセージ作成イベント構造体
///
/// イベントAPIが返却したイベントの`data`に含まれるメッセージを表現する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    /// メッセージID
    pub id: MessageId,
    /// メッセージの作成日時
    pub created: OffsetDateTime,
    /// 送信者のEメールアドレス
    pub person_email: String,
    /// メッセージが投稿されたスペースの種類
    pub room_type: RoomType,
}

impl MessageEvent {
    /// 1対1のスペースに投稿されたメッセージか確認する。
    pub fn is_direct(&self) -> bool {
        self.room_type == RoomType::Direct
    }
}

/// イベントを取得する期間構造体
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    /// 期間の開始日時
    pub from: OffsetDateTime,
    /// 期間の終了日時
    pub to: OffsetDateTime,
}

impl EventWindow {
    /// 現在日時からさかのぼった期間を構築する。
    ///
    /// 開始日時が終了日時より後になる期間も検証せずに構築する。
    ///
    /// # Arguments
    ///
    /// * `now` - 現在日時。
    /// * `check_events_from_age` - 現在日時から期間の開始日時までの長さ。
    /// * `target_message_age` - 現在日時から期間の終了日時までの長さ。
    ///
    /// # Returns
    ///
    /// イベントを取得する期間。開始日時または終了日時が日時の範囲を超える場合は`None`。
    pub fn ending_before(
        now: OffsetDateTime,
        check_events_from_age: Duration,
        target_message_age: Duration,
    ) -> Option<Self> {
        Some(Self {
            from: now.checked_sub(check_events_from_age)?,
            to: now.checked_sub(target_message_age)?,
        })
    }

    /// 開始日時が終了日時より後になっているか確認する。
    pub fn is_inverted(&self) -> bool {
        self.from > self.to
    }
}

/// 次のページを取得するためのカーソル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageCursor(pub String);

/// イベントのページ構造体
#[derive(Debug, Clone, Default)]
pub struct EventPage {
    /// ページに含まれるメッセージ作成イベント
    pub items: Vec<MessageEvent>,
    /// 次のページのカーソル
    pub next: Option<PageCursor>,
}
