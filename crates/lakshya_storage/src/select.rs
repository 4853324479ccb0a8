//! Path validation and query evaluation shared by the backends.

use lakshya_error::{StorageError, StorageErrorKind, StorageResult};
use lakshya_interface::{DocumentPath, Filter, Record};

/// Checks that a collection name or document id is a single safe segment.
///
/// # Errors
///
/// Returns `InvalidPath` for empty segments, separators, or `.`/`..`.
///
/// # Examples
///
/// ```
/// use lakshya_storage::validate_segment;
///
/// assert!(validate_segment("colleges").is_ok());
/// assert!(validate_segment("../etc").is_err());
/// ```
pub fn validate_segment(segment: &str) -> StorageResult<()> {
    let valid = !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(StorageError::new(StorageErrorKind::InvalidPath(format!(
            "'{}' is not a valid collection or document id",
            segment
        ))))
    }
}

pub(crate) fn validate_path(path: &DocumentPath) -> StorageResult<()> {
    validate_segment(&path.collection)?;
    validate_segment(&path.id)
}

/// Keep records matching every filter, ordered by id, truncated to `limit`.
pub(crate) fn select(
    mut records: Vec<Record>,
    filters: &[Filter],
    limit: Option<usize>,
) -> Vec<Record> {
    records.retain(|record| filters.iter().all(|filter| filter.matches(&record.data)));
    records.sort_by(|a, b| a.path.id.cmp(&b.path.id));
    if let Some(limit) = limit {
        records.truncate(limit);
    }
    records
}
