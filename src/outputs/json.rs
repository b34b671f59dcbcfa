//! JSON output.
//!
//! Single-site and pattern runs produce an array of records; bulk and feed
//! runs produce a `{results, failures}` object.

use std::path::Path;

use serde::Serialize;
use tokio::fs;
use tokio::io::{self, AsyncWriteExt};
use tracing::{info, instrument};

use crate::error::{Result, StatementError};

const STDOUT: &str = "<stdout>";

/// Serialize `value` as pretty JSON to `output`, or to stdout when `None`.
///
/// Parent directories of `output` are created as needed.
#[instrument(level = "info", skip(value))]
pub async fn write_records<T>(value: &T, output: Option<&Path>) -> Result<()>
where
    T: Serialize + ?Sized,
{
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StatementError::io(parent, e))?;
            }
            fs::write(path, &json)
                .await
                .map_err(|e| StatementError::io(path, e))?;
            info!(path = %path.display(), bytes = json.len(), "wrote JSON");
        }
        None => {
            let mut stdout = io::stdout();
            stdout
                .write_all(json.as_bytes())
                .await
                .map_err(|e| StatementError::io(STDOUT, e))?;
            stdout
                .flush()
                .await
                .map_err(|e| StatementError::io(STDOUT, e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use crate::models::{Batch, PressRelease};
    use chrono::NaiveDate;

    #[tokio::test]
    async fn writes_batch_to_nested_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runs/2024-01-15/all.json");

        let batch = Batch {
            results: vec![PressRelease::new(
                "https://barr.house.gov/media-center/press-releases",
                "https://barr.house.gov/media-center/press-releases/barr-introduces-bill",
                "Barr Introduces Bill",
                NaiveDate::from_ymd_opt(2024, 1, 15),
                "barr.house.gov",
            )],
            failures: vec!["https://broken.senate.gov/news".into()],
        };
        write_records(&batch, Some(&path)).await.unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["results"][0]["date"], "2024-01-15");
        assert_eq!(written["results"][0]["domain"], "barr.house.gov");
        assert_eq!(written["failures"][0], "https://broken.senate.gov/news");
    }

    #[tokio::test]
    async fn writes_record_slice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        let records = vec![PressRelease::new("s", "https://x.gov/1", "One", None, "x.gov")];

        write_records(records.as_slice(), Some(&path)).await.unwrap();

        let written: Vec<PressRelease> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written, records);
    }

    #[tokio::test]
    async fn unencodable_value_is_a_serialize_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        // Non-string map keys have no JSON form.
        let value = BTreeMap::from([(vec![1u8], 1u8)]);

        let err = write_records(&value, Some(&path)).await.unwrap_err();
        assert!(matches!(err, StatementError::Serialize(_)));
        assert!(!path.exists());
    }
}
