use std::io::{BufRead, Write};

use domains::models::messages::EventWindow;
use domains::repositories::messages::MessageRepository;

use crate::messages::{
    collect_deletion_candidates, confirm_deletion, delete_messages, DeletionReport,
};

/// メッセージ削除の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurgeOutcome {
    /// 削除を実行した
    Completed(DeletionReport),
    /// 操作者が削除を承認しなかった
    Declined { candidates: usize },
}

/// 期間内に1対1のスペースに投稿されたメッセージを、操作者の承認を得てから削除する。
///
/// 操作者が承認しなかった場合は、メッセージを1件も削除しない。
///
/// # Arguments
///
/// * `repository` - メッセージリポジトリ。
/// * `window` - イベントを取得する期間。
/// * `input` - 操作者の回答を読み込む入力。
/// * `output` - 削除候補と進捗を表示する出力。
///
/// # Returns
///
/// メッセージ削除の結果。
#[tracing::instrument(name = "Purge direct messages", skip(repository, input, output))]
pub async fn purge_direct_messages<M, R, W>(
    repository: &M,
    window: &EventWindow,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<PurgeOutcome>
where
    M: MessageRepository + ?Sized,
    R: BufRead,
    W: Write,
{
    let candidates = collect_deletion_candidates(repository, window).await?;

    // 削除前に操作者の承認を得る
    if !confirm_deletion(&candidates, input, output)? {
        tracing::info!("deletion declined by operator");
        return Ok(PurgeOutcome::Declined {
            candidates: candidates.len(),
        });
    }

    let report = delete_messages(repository, candidates, output).await?;

    Ok(PurgeOutcome::Completed(report))
}
