//! ユースケースのテストで使用するリポジトリの代替実装

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::anyhow;
use async_trait::async_trait;
use secrecy::{ExposeSecret, Secret};
use time::{Duration, OffsetDateTime};

use domains::models::credentials::{Credential, TokenGrant};
use domains::models::messages::{
    EventPage, EventWindow, MessageEvent, MessageId, PageCursor, RoomType,
};
use domains::repositories::credentials::CredentialRepository;
use domains::repositories::messages::{DeleteMessageError, MessageRepository};
use domains::repositories::tokens::{TokenEndpoint, TokenEndpointError};

pub fn credential(access_token: &str, expires_at: OffsetDateTime) -> Credential {
    Credential {
        access_token: Secret::new(access_token.to_owned()),
        refresh_token: Secret::new(format!("{}-refresh", access_token)),
        expires_at,
        expires_in: Duration::days(14),
        refresh_token_expires_in: Duration::days(90),
        token_type: Some("Bearer".to_owned()),
    }
}

pub fn message(id: &str, room_type: RoomType) -> MessageEvent {
    MessageEvent {
        id: MessageId::gen(id),
        created: time::macros::datetime!(2024-01-10 08:00 UTC),
        person_email: format!("{}@example.com", id),
        room_type,
    }
}

pub struct InMemoryCredentialRepository {
    credential: Mutex<Option<Credential>>,
    saves: AtomicUsize,
}

impl InMemoryCredentialRepository {
    pub fn empty() -> Self {
        Self {
            credential: Mutex::new(None),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn with(credential: Credential) -> Self {
        Self {
            credential: Mutex::new(Some(credential)),
            saves: AtomicUsize::new(0),
        }
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub fn stored(&self) -> Option<Credential> {
        self.credential.lock().unwrap().clone()
    }
}

#[async_trait]
impl CredentialRepository for InMemoryCredentialRepository {
    async fn load(&self) -> anyhow::Result<Option<Credential>> {
        Ok(self.stored())
    }

    async fn save(&self, credential: &Credential) -> anyhow::Result<()> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.credential.lock().unwrap() = Some(credential.clone());
        Ok(())
    }
}

enum RefreshBehavior {
    Grant(String, Duration),
    Reject,
    Fail,
}

pub struct FakeTokenEndpoint {
    behavior: RefreshBehavior,
    calls: AtomicUsize,
    last_refresh_token: Mutex<Option<String>>,
}

impl FakeTokenEndpoint {
    fn new(behavior: RefreshBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_refresh_token: Mutex::new(None),
        }
    }

    pub fn granting(access_token: &str) -> Self {
        Self::granting_for(access_token, Duration::days(14))
    }

    /// アクセストークンの有効期間を指定してトークンを発行する。
    pub fn granting_for(access_token: &str, expires_in: Duration) -> Self {
        Self::new(RefreshBehavior::Grant(access_token.to_owned(), expires_in))
    }

    pub fn rejecting() -> Self {
        Self::new(RefreshBehavior::Reject)
    }

    pub fn failing() -> Self {
        Self::new(RefreshBehavior::Fail)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_refresh_token(&self) -> Option<String> {
        self.last_refresh_token.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenEndpoint for FakeTokenEndpoint {
    async fn refresh(
        &self,
        refresh_token: &Secret<String>,
    ) -> Result<TokenGrant, TokenEndpointError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_refresh_token.lock().unwrap() = Some(refresh_token.expose_secret().clone());
        match &self.behavior {
            RefreshBehavior::Grant(access_token, expires_in) => Ok(TokenGrant {
                access_token: Secret::new(access_token.clone()),
                refresh_token: Secret::new(format!("{}-refresh", access_token)),
                expires_in: *expires_in,
                refresh_token_expires_in: Duration::days(90),
                token_type: Some("Bearer".to_owned()),
            }),
            RefreshBehavior::Reject => Err(TokenEndpointError::Rejected("invalid_grant".to_owned())),
            RefreshBehavior::Fail => Err(TokenEndpointError::UnexpectedError(anyhow!(
                "service unavailable"
            ))),
        }
    }
}

/// 削除APIの応答
#[derive(Clone, Copy)]
pub enum DeleteResponse {
    NotFound,
    ServerError,
}

/// ページ単位でイベントを返却し、削除要求を記録するリポジトリ
pub struct InMemoryMessageRepository {
    pages: Mutex<VecDeque<Vec<MessageEvent>>>,
    page_requests: AtomicUsize,
    failures: HashMap<String, DeleteResponse>,
    deleted: Mutex<Vec<String>>,
}

impl InMemoryMessageRepository {
    pub fn with_pages(pages: Vec<Vec<MessageEvent>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            page_requests: AtomicUsize::new(0),
            failures: HashMap::new(),
            deleted: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(mut self, id: &str, response: DeleteResponse) -> Self {
        self.failures.insert(id.to_owned(), response);
        self
    }

    pub fn page_requests(&self) -> usize {
        self.page_requests.load(Ordering::SeqCst)
    }

    /// 削除を要求されたメッセージID
    pub fn delete_requests(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    fn pop_page(&self) -> EventPage {
        self.page_requests.fetch_add(1, Ordering::SeqCst);
        let mut pages = self.pages.lock().unwrap();
        let items = pages.pop_front().unwrap_or_default();
        let next = (!pages.is_empty()).then(|| PageCursor(format!("page-{}", self.page_requests())));
        EventPage { items, next }
    }
}

#[async_trait]
impl MessageRepository for InMemoryMessageRepository {
    async fn first_page(&self, _window: &EventWindow) -> anyhow::Result<EventPage> {
        Ok(self.pop_page())
    }

    async fn next_page(&self, _cursor: &PageCursor) -> anyhow::Result<EventPage> {
        Ok(self.pop_page())
    }

    async fn delete(&self, id: &MessageId) -> Result<(), DeleteMessageError> {
        self.deleted.lock().unwrap().push(id.value().to_owned());
        match self.failures.get(id.value()) {
            None => Ok(()),
            Some(DeleteResponse::NotFound) => Err(DeleteMessageError::NotFound(id.clone())),
            Some(DeleteResponse::ServerError) => Err(DeleteMessageError::UnexpectedError(
                anyhow!("500 Internal Server Error"),
            )),
        }
    }
}
