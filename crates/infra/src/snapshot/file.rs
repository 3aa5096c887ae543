use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use stockroom_core::DomainError;

use super::dto::Snapshot;

/// Snapshot load/save error.
///
/// `Io` and `Malformed` are infrastructure failures; `Domain` carries a
/// rejection raised while the snapshot was being applied.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot: {0}")]
    Malformed(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl SnapshotError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

pub fn from_json(text: &str) -> Result<Snapshot, SnapshotError> {
    serde_json::from_str(text).map_err(|e| SnapshotError::malformed(e.to_string()))
}

/// Pretty-printed JSON, the on-disk format.
pub fn to_json(snapshot: &Snapshot) -> Result<String, SnapshotError> {
    serde_json::to_string_pretty(snapshot).map_err(|e| SnapshotError::malformed(e.to_string()))
}

fn io_error(path: &Path, source: std::io::Error) -> SnapshotError {
    SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Read any JSON document in the backup format, such as a bare list of
/// records or products.
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, SnapshotError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    serde_json::from_str(&text)
        .map_err(|e| SnapshotError::malformed(format!("{}: {e}", path.display())))
}

/// Write `value` pretty-printed to `path`.
pub fn write_json<T: Serialize + ?Sized>(
    path: impl AsRef<Path>,
    value: &T,
) -> Result<(), SnapshotError> {
    let path = path.as_ref();
    let text =
        serde_json::to_string_pretty(value).map_err(|e| SnapshotError::malformed(e.to_string()))?;
    fs::write(path, text).map_err(|e| io_error(path, e))?;
    tracing::debug!(path = %path.display(), "json written");
    Ok(())
}

pub fn read_snapshot(path: impl AsRef<Path>) -> Result<Snapshot, SnapshotError> {
    let path = path.as_ref();
    let snapshot: Snapshot = read_json(path)?;
    tracing::debug!(
        path = %path.display(),
        records = snapshot.records.len(),
        movements = snapshot.movements.len(),
        bills = snapshot.bills.len(),
        "snapshot read"
    );
    Ok(snapshot)
}

pub fn write_snapshot(path: impl AsRef<Path>, snapshot: &Snapshot) -> Result<(), SnapshotError> {
    write_json(path, snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::dto::CustomerDto;

    fn temp_path() -> PathBuf {
        std::env::temp_dir().join(format!("stockroom-snapshot-{}.json", uuid::Uuid::now_v7()))
    }

    #[test]
    fn write_then_read_same_file() {
        let path = temp_path();
        let snapshot = Snapshot {
            customers: vec![CustomerDto {
                name: "Ana".to_string(),
                number_id: "1".to_string(),
                id: "c-1".to_string(),
            }],
            ..Snapshot::default()
        };

        write_snapshot(&path, &snapshot).unwrap();
        let back = read_snapshot(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(back, snapshot);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_snapshot(temp_path()).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }

    #[test]
    fn bare_lists_round_trip() {
        let path = temp_path();
        let customers = vec![CustomerDto {
            name: "Ana".to_string(),
            number_id: "1".to_string(),
            id: "c-1".to_string(),
        }];

        write_json(&path, &customers).unwrap();
        let back: Vec<CustomerDto> = read_json(&path).unwrap();
        let wrong_shape = read_snapshot(&path).unwrap_err();
        let _ = fs::remove_file(&path);

        assert_eq!(back, customers);
        assert!(matches!(wrong_shape, SnapshotError::Malformed(_)));
    }

    #[test]
    fn garbage_is_malformed() {
        match from_json("{ not json") {
            Err(SnapshotError::Malformed(msg)) if !msg.is_empty() => {}
            other => panic!("Expected Malformed, got {other:?}"),
        }
    }
}
