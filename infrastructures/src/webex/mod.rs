mod messages;
mod pagination;
mod tokens;

pub use messages::WebexMessageRepository;
pub use tokens::WebexTokenEndpoint;

/// エラーレスポンスの本文を取得する。
///
/// 本文を取得できなかった場合は空文字を返却する。
async fn response_body(response: reqwest::Response) -> String {
    response.text().await.unwrap_or_default()
}
