use std::path::Path;

use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

/// トレーシングサブスクライバーを構築する。
///
/// # Arguments
///
/// * `name` - ログに記録するアプリケーション名。
/// * `env_filter` - 記録するログのフィルター。
/// * `sink` - ログの出力先。
///
/// # Returns
///
/// トレーシングサブスクライバー。
pub fn get_subscriber<Sink>(
    name: String,
    env_filter: EnvFilter,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let formatting_layer = BunyanFormattingLayer::new(name, sink);
    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// トレーシングサブスクライバーをグローバルに登録する。
///
/// `log`クレートが出力するログもサブスクライバーに転送する。
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) -> anyhow::Result<()> {
    LogTracer::init()?;
    set_global_default(subscriber)?;

    Ok(())
}

/// 環境変数`RUST_LOG`を優先して、ログのフィルターを構築する。
///
/// # Arguments
///
/// * `default_directives` - `RUST_LOG`が設定されていない場合のフィルター。
pub fn env_filter(default_directives: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives))
}

/// 日付ごとにローテーションするログファイルの出力先を構築する。
///
/// 標準出力は操作者との対話に使用するため、ログはファイルにのみ出力する。
pub fn daily_log_file(log_dir: &Path, prefix: &str) -> RollingFileAppender {
    rolling::daily(log_dir, prefix)
}
