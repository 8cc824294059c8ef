use std::env;
use std::path::PathBuf;

use secrecy::Secret;
use time::Duration;

/// WebexのREST APIの既定のベースURL
pub const DEFAULT_API_BASE_URL: &str = "https://webexapis.com/v1";
/// 既定のトークンファイル
pub const DEFAULT_TOKENS_FILE: &str = "tokens.json";
/// 既定のログ出力ディレクトリ
pub const DEFAULT_LOG_DIR: &str = "logs";
/// 既定のログレベル
pub const DEFAULT_RUST_LOG: &str = "info";
/// 経過時間に指定できる秒数の上限(100年)
pub const MAX_AGE_SECONDS: i64 = 100 * 365 * 24 * 60 * 60;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("環境変数に{0}が設定されていません。")]
    Missing(&'static str),
    #[error("環境変数{key}を{expected}として認識できません。({value})")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// 設定構造体
#[derive(Debug, Clone)]
pub struct Settings {
    /// Rust設定
    pub rust_log: String,
    /// ログ出力ディレクトリ
    pub log_dir: PathBuf,
    /// OAuth2クライアント設定
    pub oauth: OAuthSettings,
    /// Webex API設定
    pub webex: WebexSettings,
    /// 削除対象設定
    pub purge: PurgeSettings,
    /// トークンストア設定
    pub token_store: TokenStoreSettings,
}

/// OAuth2クライアント設定構造体
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: Secret<String>,
    pub token_url: String,
}

/// Webex API設定構造体
#[derive(Debug, Clone)]
pub struct WebexSettings {
    pub api_base_url: String,
}

/// 削除対象設定構造体
#[derive(Debug, Clone)]
pub struct PurgeSettings {
    /// 削除するメッセージの経過時間
    pub target_message_age: Duration,
    /// イベントをさかのぼって確認する経過時間
    pub check_events_from_age: Duration,
}

/// トークンストア設定構造体
#[derive(Debug, Clone)]
pub struct TokenStoreSettings {
    pub path: PathBuf,
}

impl Settings {
    /// 環境変数から設定を取得する。
    ///
    /// `.env`ファイルが存在する場合は、その内容を環境変数に読み込む。
    ///
    /// # Returns
    ///
    /// 設定インスタンス。
    pub fn from_env() -> Result<Self, SettingsError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// キーから値を検索する関数を使用して設定を取得する。
    ///
    /// # Arguments
    ///
    /// * `lookup` - キーに対応する値を返却する関数。値がない場合は`None`を返却する。
    ///
    /// # Returns
    ///
    /// 設定インスタンス。
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = optional_string(&lookup, "WEBEX_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_owned());
        let api_base_url = api_base_url.trim_end_matches('/').to_owned();
        let token_url = optional_string(&lookup, "WEBEX_TOKEN_URL")
            .unwrap_or_else(|| format!("{}/access_token", api_base_url));

        Ok(Self {
            // Rust設定
            rust_log: optional_string(&lookup, "RUST_LOG")
                .unwrap_or_else(|| DEFAULT_RUST_LOG.to_owned()),
            log_dir: optional_string(&lookup, "LOG_DIR")
                .unwrap_or_else(|| DEFAULT_LOG_DIR.to_owned())
                .into(),

            // OAuth2クライアント設定
            oauth: OAuthSettings {
                client_id: required_string(&lookup, "CLIENT_ID")?,
                client_secret: Secret::new(required_string(&lookup, "CLIENT_SECRET")?),
                token_url,
            },

            // Webex API設定
            webex: WebexSettings { api_base_url },

            // 削除対象設定
            purge: PurgeSettings {
                target_message_age: seconds(&lookup, "TARGET_MSG_AGE")?,
                check_events_from_age: seconds(&lookup, "CHECK_EVENTS_FROM_AGE")?,
            },

            // トークンストア設定
            token_store: TokenStoreSettings {
                path: optional_string(&lookup, "TOKENS_FILE")
                    .unwrap_or_else(|| DEFAULT_TOKENS_FILE.to_owned())
                    .into(),
            },
        })
    }
}

fn optional_string<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn required_string<F>(lookup: &F, key: &'static str) -> Result<String, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    optional_string(lookup, key).ok_or(SettingsError::Missing(key))
}

fn seconds<F>(lookup: &F, key: &'static str) -> Result<Duration, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = required_string(lookup, key)?;
    match value.parse::<i64>() {
        Ok(seconds) if (-MAX_AGE_SECONDS..=MAX_AGE_SECONDS).contains(&seconds) => {
            Ok(Duration::seconds(seconds))
        }
        _ => Err(SettingsError::Invalid {
            key,
            expected: "100年以内の秒数",
            value,
        }),
    }
}
