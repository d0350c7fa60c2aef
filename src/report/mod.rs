//! Persistence of the two per-day artifacts: the json record and the
//! markdown note.

pub mod markdown;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs4::tokio::AsyncFileExt;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::info;

use crate::{
    pipeline::integrate::IntegratedDailyRecord,
    utils::time::{daily_record_name, note_name},
};

pub struct ReportPaths {
    pub record: PathBuf,
    pub note: PathBuf,
}

/// Writes the day's record and note into `out_dir`, creating it first.
/// A rerun for the same day overwrites both files whole.
pub async fn write_artifacts(
    out_dir: &Path,
    record: &IntegratedDailyRecord,
) -> Result<ReportPaths> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("failed to create output directory {out_dir:?}"))?;

    let record_path = out_dir.join(daily_record_name(record.date));
    let json = serde_json::to_string_pretty(record)?;
    write_locked(&record_path, json.as_bytes())
        .await
        .with_context(|| format!("failed to write {record_path:?}"))?;

    let note_path = out_dir.join(note_name(record.date));
    write_locked(&note_path, markdown::render(record).as_bytes())
        .await
        .with_context(|| format!("failed to write {note_path:?}"))?;

    info!("Wrote {record_path:?} and {note_path:?}");
    Ok(ReportPaths {
        record: record_path,
        note: note_path,
    })
}

async fn write_locked(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path).await?;
    // Semi-safe acquire-release, matching how captures are read.
    file.lock_exclusive()?;
    let write = async {
        file.write_all(content).await?;
        file.flush().await
    }
    .await;
    file.unlock_async().await?;
    write
}

/// One-screen summary of a folded day.
pub fn print_summary(record: &IntegratedDailyRecord) {
    let overview = &record.combined_overview;

    println!("{} ({} data)", record.date, record.data_richness);
    for report in &record.per_source_summary {
        println!(
            "  {}: {} events, {:.1} minutes",
            report.kind, report.summary.total_events, report.summary.total_minutes
        );
    }
    if !overview.top_categories.is_empty() {
        let top = overview
            .top_categories
            .iter()
            .map(|c| format!("{} ({})", c.name, c.count))
            .collect::<Vec<_>>()
            .join(", ");
        println!("  top: {top}");
    }
    println!("  score: {:.1}", overview.productivity.overall);
    for insight in &overview.insights {
        println!("  - {insight}");
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::{
        config::ActivityConfig,
        pipeline::integrate::{integrate, DataRichness},
        utils::clock::MockClock,
    };

    use super::*;

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();

    fn empty_day() -> IntegratedDailyRecord {
        integrate(
            &ActivityConfig::default(),
            &MockClock::new(),
            Some(TEST_DATE),
            None,
            None,
        )
    }

    #[tokio::test]
    async fn artifacts_round_trip_through_disk() -> Result<()> {
        let dir = tempdir()?;
        let record = empty_day();

        let paths = write_artifacts(dir.path(), &record).await?;
        assert_eq!(
            paths.record.file_name().unwrap(),
            "daily_record_2025-03-15.json"
        );
        assert_eq!(paths.note.file_name().unwrap(), "2025-03-15.md");

        let stored: IntegratedDailyRecord =
            serde_json::from_str(&std::fs::read_to_string(&paths.record)?)?;
        assert_eq!(stored, record);
        assert_eq!(stored.data_richness, DataRichness::None);

        let note = std::fs::read_to_string(&paths.note)?;
        assert!(note.starts_with("# Daily Activity - 2025-03-15"));
        Ok(())
    }

    #[tokio::test]
    async fn rewriting_a_day_replaces_the_artifacts() -> Result<()> {
        let dir = tempdir()?;
        let record = empty_day();

        write_artifacts(dir.path(), &record).await?;
        let paths = write_artifacts(dir.path(), &record).await?;

        let stored: IntegratedDailyRecord =
            serde_json::from_str(&std::fs::read_to_string(&paths.record)?)?;
        assert_eq!(stored, record);
        Ok(())
    }
}
