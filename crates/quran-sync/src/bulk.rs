//! Per-chapter bulk sync, as run by the `sync` command.

use quran_core::{
  chapter::ChapterId,
  source::{CachePolicy, ContentSource},
  store::QuranStore,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::{Catalog, Result};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BulkOptions {
  /// Also sync chapter info (no locale) for each chapter.
  pub with_info: bool,
  /// Bypass the response cache.
  pub force:     bool,
}

/// Outcome of [`Catalog::sync_chapters`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BulkReport {
  pub synced: Vec<ChapterId>,
  /// Chapters that could not be synced, with the reason.
  pub failed: Vec<(ChapterId, String)>,
}

impl BulkReport {
  pub fn total(&self) -> usize { self.synced.len() + self.failed.len() }

  pub fn is_success(&self) -> bool { self.failed.is_empty() }
}

impl<S, A> Catalog<S, A>
where
  S: QuranStore,
  A: ContentSource,
{
  /// Sync each of `ids` individually. One chapter failing does not stop the
  /// rest; its error is recorded in the report. With
  /// [`BulkOptions::with_info`], a chapter whose info the upstream lacks
  /// counts as failed.
  pub async fn sync_chapters(
    &self,
    ids: &[ChapterId],
    language: &str,
    options: BulkOptions,
  ) -> BulkReport {
    let policy = if options.force { CachePolicy::Refresh } else { CachePolicy::Cached };
    let mut report = BulkReport::default();

    for &id in ids {
      match self.sync_one(id, language, options.with_info, policy).await {
        Ok(()) => report.synced.push(id),
        Err(reason) => {
          warn!(chapter_id = %id, language, %reason, "chapter sync failed");
          report.failed.push((id, reason));
        }
      }
    }

    info!(
      language,
      synced = report.synced.len(),
      failed = report.failed.len(),
      "bulk chapter sync finished"
    );
    report
  }

  async fn sync_one(
    &self,
    id: ChapterId,
    language: &str,
    with_info: bool,
    policy: CachePolicy,
  ) -> Result<(), String> {
    let found = self
      .sync_chapter(id, language, policy)
      .await
      .map_err(|e| e.to_string())?;
    if !found {
      return Err("chapter not found upstream".to_owned());
    }
    if with_info {
      let found = self
        .sync_info(id, language, None)
        .await
        .map_err(|e| e.to_string())?;
      if !found {
        return Err("chapter info not found upstream".to_owned());
      }
    }
    Ok(())
  }
}
