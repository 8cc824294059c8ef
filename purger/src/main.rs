use std::process::ExitCode;

use time::OffsetDateTime;

use configurations::Settings;
use purger::startup::{exit_status, Purger, EXIT_FAILURE};
use telemetries::{daily_log_file, env_filter, get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> ExitCode {
    // 設定を取得
    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    // トレーシングログを設定
    let log_file = daily_log_file(&settings.log_dir, "purger");
    let subscriber = get_subscriber("purger".into(), env_filter(&settings.rust_log), log_file);
    if let Err(e) = init_subscriber(subscriber) {
        eprintln!("ログを設定できませんでした。{}", e);
    }

    let purger = match Purger::build(settings) {
        Ok(purger) => purger,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    tracing::info!("Startup purger...");
    let mut input = std::io::stdin().lock();
    let mut output = std::io::stdout();
    let result = purger
        .run(OffsetDateTime::now_utc(), &mut input, &mut output)
        .await;
    if let Err(e) = &result {
        tracing::error!(error = ?e, "purge failed");
        eprintln!("{}", e);
    }

    ExitCode::from(exit_status(&result))
}
