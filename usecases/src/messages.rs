use std::io::{BufRead, Write};

use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use domains::models::messages::{EventWindow, MessageEvent, MessageId};
use domains::repositories::messages::{DeleteMessageError, MessageRepository};

/// 1対1のスペースに投稿されたメッセージのみを選択する。
///
/// 順番は維持して、重複の除去や並べ替えはしない。
pub fn direct_messages<I>(events: I) -> impl Iterator<Item = MessageEvent>
where
    I: IntoIterator<Item = MessageEvent>,
{
    events.into_iter().filter(MessageEvent::is_direct)
}

/// 期間内に1対1のスペースに投稿されたメッセージを削除候補として収集する。
///
/// イベントはページごとに取得して、取得したページから順に選択する。
///
/// # Arguments
///
/// * `repository` - メッセージリポジトリ。
/// * `window` - イベントを取得する期間。
///
/// # Returns
///
/// 削除候補のメッセージ。
#[tracing::instrument(name = "Collect deletion candidates", skip(repository))]
pub async fn collect_deletion_candidates<R>(
    repository: &R,
    window: &EventWindow,
) -> anyhow::Result<Vec<MessageEvent>>
where
    R: MessageRepository + ?Sized,
{
    if window.is_inverted() {
        tracing::warn!("the start of the event window is after its end");
    }

    let mut candidates = Vec::new();
    let mut page = repository.first_page(window).await?;
    let mut pages = 1;
    loop {
        candidates.extend(direct_messages(page.items));
        match page.next {
            Some(cursor) => {
                page = repository.next_page(&cursor).await?;
                pages += 1;
            }
            None => break,
        }
    }
    tracing::info!(pages, candidates = candidates.len(), "collected deletion candidates");

    Ok(candidates)
}

/// 日時を表示用の文字列に変換する。
pub(crate) fn display_timestamp(timestamp: OffsetDateTime) -> anyhow::Result<String> {
    Ok(timestamp.format(&Rfc3339)?)
}

/// 回答が承認を示すか確認する。
///
/// 前後の空白を除去して小文字にした回答の最初の文字が`y`の場合に承認とみなす。
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().to_lowercase().starts_with('y')
}

/// 削除候補を表示して、削除してよいか操作者に確認する。
///
/// 1行のみ読み込み、入力が終了している場合は承認されなかったとみなす。
///
/// # Arguments
///
/// * `candidates` - 削除候補のメッセージ。
/// * `input` - 操作者の回答を読み込む入力。
/// * `output` - 削除候補を表示する出力。
///
/// # Returns
///
/// 承認された場合は`true`。
pub fn confirm_deletion<R, W>(
    candidates: &[MessageEvent],
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<bool>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "{}件のメッセージを削除します:", candidates.len())?;
    for message in candidates {
        writeln!(
            output,
            "{} {} ID: {}",
            display_timestamp(message.created)?,
            message.person_email,
            message.id
        )?;
    }
    write!(output, "削除を実行しますか? (y/n): ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    let approved = is_affirmative(&answer);
    tracing::info!(approved, candidates = candidates.len(), "deletion confirmation");

    Ok(approved)
}

/// メッセージを削除した結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// 削除した
    Deleted,
    /// 既に削除されていた
    AlreadyDeleted,
    /// 削除に失敗した
    Failed(String),
}

/// メッセージの削除結果を削除候補の順番で記録する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionReport {
    pub outcomes: Vec<(MessageId, DeleteOutcome)>,
}

impl DeletionReport {
    pub fn deleted(&self) -> usize {
        self.count(|outcome| matches!(outcome, DeleteOutcome::Deleted))
    }

    pub fn already_deleted(&self) -> usize {
        self.count(|outcome| matches!(outcome, DeleteOutcome::AlreadyDeleted))
    }

    pub fn failed(&self) -> usize {
        self.count(|outcome| matches!(outcome, DeleteOutcome::Failed(_)))
    }

    fn count<F>(&self, predicate: F) -> usize
    where
        F: Fn(&DeleteOutcome) -> bool,
    {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| predicate(outcome))
            .count()
    }
}

/// 削除候補のメッセージを順番に削除する。
///
/// 既に削除されているメッセージと、削除に失敗したメッセージは結果に記録して、次のメッセージの
/// 削除を継続する。
///
/// # Arguments
///
/// * `repository` - メッセージリポジトリ。
/// * `candidates` - 削除候補のメッセージ。
/// * `output` - 進捗を表示する出力。
///
/// # Returns
///
/// 削除結果。
#[tracing::instrument(name = "Delete messages", skip_all, fields(candidates = candidates.len()))]
pub async fn delete_messages<R, W>(
    repository: &R,
    candidates: Vec<MessageEvent>,
    output: &mut W,
) -> anyhow::Result<DeletionReport>
where
    R: MessageRepository + ?Sized,
    W: Write,
{
    let mut report = DeletionReport::default();
    for message in candidates {
        writeln!(
            output,
            "メッセージを削除しています: {} {} ID: {}",
            display_timestamp(message.created)?,
            message.person_email,
            message.id
        )?;
        let outcome = match repository.delete(&message.id).await {
            Ok(()) => DeleteOutcome::Deleted,
            Err(DeleteMessageError::NotFound(id)) => {
                tracing::info!(message_id = %id, "message already deleted");
                writeln!(output, "メッセージは既に削除されています。")?;
                DeleteOutcome::AlreadyDeleted
            }
            Err(DeleteMessageError::UnexpectedError(e)) => {
                tracing::error!(message_id = %message.id, error = ?e, "failed to delete message");
                writeln!(output, "{}", e)?;
                DeleteOutcome::Failed(e.to_string())
            }
        };
        report.outcomes.push((message.id, outcome));
    }
    tracing::info!(
        deleted = report.deleted(),
        already_deleted = report.already_deleted(),
        failed = report.failed(),
        "finished deleting messages"
    );

    Ok(report)
}
