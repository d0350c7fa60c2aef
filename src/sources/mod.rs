//! Access to the capture files the collectors drop on disk, one pair of
//! files per day.

pub mod records;

use std::{future::Future, io::ErrorKind, ops::Deref, path::PathBuf};

use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::{fs::File, io::AsyncReadExt};
use tracing::debug;

use crate::utils::time::{app_capture_name, browser_capture_name};

use self::records::{AppCapture, BrowserCapture};

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("no {kind} capture exists for {date}")]
    Unavailable { kind: &'static str, date: NaiveDate },
    #[error("failed to read capture file {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("capture file {path:?} is not valid json")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Interface for abstracting where capture files come from.
pub trait CaptureStore {
    /// Retrieves the application capture for a certain day.
    fn load_app_capture(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<AppCapture, SourceError>> + Send;

    /// Retrieves the browser capture for a certain day.
    fn load_browser_capture(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<BrowserCapture, SourceError>> + Send;
}

impl<T: Deref> CaptureStore for T
where
    T::Target: CaptureStore,
{
    fn load_app_capture(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<AppCapture, SourceError>> + Send {
        self.deref().load_app_capture(date)
    }

    fn load_browser_capture(
        &self,
        date: NaiveDate,
    ) -> impl Future<Output = Result<BrowserCapture, SourceError>> + Send {
        self.deref().load_browser_capture(date)
    }
}

/// The main realization of [CaptureStore], reading day-keyed json files
/// from a single directory.
pub struct FsCaptureStore {
    capture_dir: PathBuf,
}

impl FsCaptureStore {
    pub fn new(capture_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&capture_dir)?;

        Ok(Self { capture_dir })
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        file_name: String,
        kind: &'static str,
        date: NaiveDate,
    ) -> Result<T, SourceError> {
        let path = self.capture_dir.join(file_name);
        debug!("Reading {path:?}");

        let io_error = |source| SourceError::Io {
            path: path.clone(),
            source,
        };

        let mut file = match File::open(&path).await {
            Ok(v) => v,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SourceError::Unavailable { kind, date });
            }
            Err(e) => return Err(io_error(e)),
        };

        // Collectors may still be writing; a shared lock keeps a half-written
        // file from being parsed.
        file.lock_shared().map_err(io_error)?;
        let mut content = String::new();
        let read = file.read_to_string(&mut content).await;
        file.unlock_async().await.map_err(io_error)?;
        read.map_err(io_error)?;

        serde_json::from_str(&content).map_err(|source| SourceError::Parse { path, source })
    }
}

impl CaptureStore for FsCaptureStore {
    async fn load_app_capture(&self, date: NaiveDate) -> Result<AppCapture, SourceError> {
        self.read_json(app_capture_name(date), "apps", date).await
    }

    async fn load_browser_capture(&self, date: NaiveDate) -> Result<BrowserCapture, SourceError> {
        self.read_json(browser_capture_name(date), "browser", date)
            .await
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::sources::records::BrowserKind;

    use super::*;

    const TEST_DATE: NaiveDate = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();

    #[tokio::test]
    async fn missing_captures_report_unavailable() -> Result<()> {
        let dir = tempdir()?;
        let store = FsCaptureStore::new(dir.path().to_owned())?;

        let result = store.load_app_capture(TEST_DATE).await;
        assert!(matches!(
            result,
            Err(SourceError::Unavailable { kind: "apps", .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn valid_captures_parse() -> Result<()> {
        let dir = tempdir()?;
        let store = FsCaptureStore::new(dir.path().to_owned())?;

        std::fs::write(
            dir.path().join(app_capture_name(TEST_DATE)),
            r#"{
                "date": "2025-03-15",
                "running_apps": [
                    {"identifier": "com.apple.Safari", "display_name": "Safari", "active": true}
                ],
                "app_history": []
            }"#,
        )?;
        std::fs::write(
            dir.path().join(browser_capture_name(TEST_DATE)),
            r#"{"browser": "chrome", "visits": [{"url": "https://github.com"}]}"#,
        )?;

        let apps = store.load_app_capture(TEST_DATE).await?;
        assert_eq!(apps.date, Some(TEST_DATE));
        assert_eq!(apps.running_apps.len(), 1);

        let browser = store.load_browser_capture(TEST_DATE).await?;
        assert_eq!(browser.browser, BrowserKind::Chrome);
        assert_eq!(browser.visits.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_captures_report_parse_errors() -> Result<()> {
        let dir = tempdir()?;
        let store = FsCaptureStore::new(dir.path().to_owned())?;

        std::fs::write(dir.path().join(browser_capture_name(TEST_DATE)), "{nope")?;

        let result = store.load_browser_capture(TEST_DATE).await;
        assert!(matches!(result, Err(SourceError::Parse { .. })));
        Ok(())
    }
}
