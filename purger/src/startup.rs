use std::io::{BufRead, Write};

use anyhow::anyhow;
use reqwest::Client;
use time::OffsetDateTime;

use configurations::Settings;
use domains::models::messages::EventWindow;
use infrastructures::repositories::credentials::FileCredentialRepository;
use infrastructures::webex::{WebexMessageRepository, WebexTokenEndpoint};
use usecases::purge::{purge_direct_messages, PurgeOutcome};
use usecases::tokens::{obtain_access_token, TokenError};

/// 削除を実行した場合の終了ステータス
pub const EXIT_COMPLETED: u8 = 0;
/// 削除を承認されなかった、または想定していないエラーが発生した場合の終了ステータス
pub const EXIT_FAILURE: u8 = 1;
/// 再認証が必要な場合の終了ステータス
pub const EXIT_AUTHENTICATION_REQUIRED: u8 = 2;

#[derive(Debug, thiserror::Error)]
pub enum PurgeError {
    #[error(transparent)]
    UnexpectedError(anyhow::Error),
    #[error("{0}")]
    AuthenticationRequired(TokenError),
}

impl From<TokenError> for PurgeError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::AuthenticationRequired => {
                Self::AuthenticationRequired(TokenError::AuthenticationRequired)
            }
            TokenError::UnexpectedError(e) => Self::UnexpectedError(e),
        }
    }
}

/// メッセージ削除の結果から終了ステータスを決定する。
pub fn exit_status(result: &Result<PurgeOutcome, PurgeError>) -> u8 {
    match result {
        Ok(PurgeOutcome::Completed(_)) => EXIT_COMPLETED,
        Ok(PurgeOutcome::Declined { .. }) => EXIT_FAILURE,
        Err(PurgeError::AuthenticationRequired(_)) => EXIT_AUTHENTICATION_REQUIRED,
        Err(PurgeError::UnexpectedError(_)) => EXIT_FAILURE,
    }
}

/// メッセージ削除アプリ構造体
pub struct Purger {
    settings: Settings,
    client: Client,
}

impl Purger {
    /// メッセージ削除アプリを構築する。
    ///
    /// # Arguments
    ///
    /// * `settings` - 設定インスタンス。
    ///
    /// # Returns
    ///
    /// メッセージ削除アプリインスタンス。
    pub fn build(settings: Settings) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { settings, client })
    }

    /// トークンを取得して、1対1のスペースに投稿された古いメッセージを削除する。
    ///
    /// # Arguments
    ///
    /// * `now` - 現在日時。
    /// * `input` - 操作者の回答を読み込む入力。
    /// * `output` - 進捗を表示する出力。
    ///
    /// # Returns
    ///
    /// メッセージ削除の結果。
    pub async fn run<R, W>(
        &self,
        now: OffsetDateTime,
        input: &mut R,
        output: &mut W,
    ) -> Result<PurgeOutcome, PurgeError>
    where
        R: BufRead,
        W: Write,
    {
        let Settings {
            oauth,
            webex,
            purge,
            token_store,
            ..
        } = &self.settings;

        // 有効なアクセストークンを取得
        writeln!(output, "トークンファイルのトークンを確認しています...")
            .map_err(|e| PurgeError::UnexpectedError(e.into()))?;
        let credentials = FileCredentialRepository::new(&token_store.path);
        let endpoint = WebexTokenEndpoint::new(
            self.client.clone(),
            &oauth.token_url,
            &oauth.client_id,
            oauth.client_secret.clone(),
        );
        let token = obtain_access_token(&credentials, &endpoint, now).await?;
        if token.refreshed {
            writeln!(output, "アクセストークンの有効期限が切れていたため、トークンを更新しました。")
                .map_err(|e| PurgeError::UnexpectedError(e.into()))?;
        }
        writeln!(output, "保存されている、または更新したトークンを使用します。")
            .map_err(|e| PurgeError::UnexpectedError(e.into()))?;

        // 期間内のメッセージを確認して削除
        let repository = WebexMessageRepository::new(
            self.client.clone(),
            &webex.api_base_url,
            token.credential.access_token,
        );
        let window = EventWindow::ending_before(
            now,
            purge.check_events_from_age,
            purge.target_message_age,
        )
        .ok_or_else(|| {
            PurgeError::UnexpectedError(anyhow!("イベントを取得する期間を計算できません。"))
        })?;
        let outcome = purge_direct_messages(&repository, &window, input, output)
            .await
            .map_err(PurgeError::UnexpectedError)?;

        if let PurgeOutcome::Completed(report) = &outcome {
            writeln!(
                output,
                "削除: {}件、削除済み: {}件、失敗: {}件",
                report.deleted(),
                report.already_deleted(),
                report.failed()
            )
            .map_err(|e| PurgeError::UnexpectedError(e.into()))?;
        }

        Ok(outcome)
    }
}
