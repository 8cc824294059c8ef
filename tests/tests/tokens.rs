use secrecy::ExposeSecret;
use time::macros::datetime;
use time::{Duration, OffsetDateTime};

use purger::startup::{exit_status, PurgeError, EXIT_AUTHENTICATION_REQUIRED, EXIT_COMPLETED};
use tests::{credential, message_created_event, spawn_purger, ACCESS_TOKEN_LIFETIME};

const NOW: OffsetDateTime = datetime!(2024-03-01 12:00 UTC);

/// アクセストークンの有効期限が切れている場合、トークンを更新して保存し、更新したトークンでAPIを呼び出すことを確認するテスト
#[tokio::test]
async fn refreshes_expired_access_token_and_uses_it() {
    let app = spawn_purger().await;
    app.store_credential(&credential("old-access", NOW - Duration::hours(1)))
        .await;
    app.mount_token_endpoint("new-access", 1).await;
    app.mount_event_pages(
        "new-access",
        vec![vec![message_created_event("m1", "direct", "a@example.com")]],
        1,
    )
    .await;
    app.mount_delete("new-access", "m1", 204, 1).await;

    let run = app.run(NOW, "y\n").await;
    assert_eq!(exit_status(&run.result), EXIT_COMPLETED);
    assert!(run.output.contains("トークンを更新しました。"));

    // 更新したトークンがトークンファイルに保存されていることを確認
    let stored = app.stored_credential().await.unwrap();
    assert_eq!(stored.access_token.expose_secret(), "new-access");
    assert_eq!(stored.refresh_token.expose_secret(), "new-access-refresh");
    assert_eq!(stored.expires_at, NOW + ACCESS_TOKEN_LIFETIME);
}

/// 保存したトークンを再度読み込んで、後続の実行で使用できることを確認するテスト
#[tokio::test]
async fn reloads_refreshed_token_on_next_run() {
    let app = spawn_purger().await;
    app.store_credential(&credential("old-access", NOW - Duration::hours(1)))
        .await;
    // トークンの更新は最初の実行の1回のみ
    app.mount_token_endpoint("new-access", 1).await;
    app.mount_event_pages("new-access", vec![vec![]], 2).await;

    let first = app.run(NOW, "y\n").await;
    assert_eq!(exit_status(&first.result), EXIT_COMPLETED);
    let second = app.run(NOW + Duration::minutes(5), "y\n").await;
    assert_eq!(exit_status(&second.result), EXIT_COMPLETED);
    assert!(!second.output.contains("トークンを更新しました。"));
}

/// リフレッシュトークンの有効期限も切れている場合、APIを呼び出さずに再認証を要求することを確認するテスト
#[tokio::test]
async fn requires_authentication_beyond_refresh_window() {
    let app = spawn_purger().await;
    app.store_credential(&credential("old-access", NOW - Duration::days(77)))
        .await;
    app.mount_token_endpoint("new-access", 0).await;
    app.mount_event_pages("old-access", vec![vec![]], 0).await;

    let run = app.run(NOW, "y\n").await;
    assert!(matches!(run.result, Err(PurgeError::AuthenticationRequired(_))));
    assert_eq!(exit_status(&run.result), EXIT_AUTHENTICATION_REQUIRED);

    let stored = app.stored_credential().await.unwrap();
    assert_eq!(stored.access_token.expose_secret(), "old-access");
}

/// トークンファイルが存在しない場合、再認証を要求することを確認するテスト
#[tokio::test]
async fn requires_authentication_without_token_file() {
    let app = spawn_purger().await;
    app.mount_token_endpoint("new-access", 0).await;

    let run = app.run(NOW, "y\n").await;
    assert_eq!(exit_status(&run.result), EXIT_AUTHENTICATION_REQUIRED);
    assert!(app.stored_credential().await.is_none());
}

/// トークンエンドポイントがリフレッシュトークンを拒否した場合、再認証を要求することを確認するテスト
#[tokio::test]
async fn requires_authentication_when_refresh_is_rejected() {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    let app = spawn_purger().await;
    app.store_credential(&credential("old-access", NOW - Duration::hours(1)))
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/access_token"))
        .respond_with(ResponseTemplate::new(400).set_body_string("invalid_grant"))
        .expect(1)
        .mount(&app.server)
        .await;

    let run = app.run(NOW, "y\n").await;
    assert_eq!(exit_status(&run.result), EXIT_AUTHENTICATION_REQUIRED);
    let stored = app.stored_credential().await.unwrap();
    assert_eq!(stored.access_token.expose_secret(), "old-access");
}
