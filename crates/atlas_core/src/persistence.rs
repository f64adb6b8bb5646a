//! Guarded reads and writes of JSON values through a storage port.
//!
//! # Responsibility
//! - Parse and structurally validate stored values before handing them out.
//! - Refuse oversized writes and classify backend write failures.
//!
//! # Invariants
//! - A missing key is `Ok(None)`, not an error.
//! - Nothing here panics; every failure becomes a `PersistenceError`.
//! - Side effects are limited to the named key.

use crate::storage::{StorageError, StoragePort};
use crate::validation::{
    format_mib, ValidationError, ValidationErrorKind, ValidationResult, MAX_STORAGE_BYTES,
};
use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Failure of a guarded storage read or write.
#[derive(Debug)]
pub enum PersistenceError {
    /// Stored text is not valid JSON.
    CorruptedData { message: String },
    /// Stored JSON failed structural validation.
    InvalidData(ValidationError),
    /// Backend failed while reading.
    ReadFailure(StorageError),
    /// Serialized value exceeds [`MAX_STORAGE_BYTES`].
    DataTooLarge { size_bytes: usize },
    /// Backend reported a quota failure.
    StorageQuotaExceeded(StorageError),
    /// Any other write failure, including serialization.
    SaveFailure { message: String },
}

impl Display for PersistenceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CorruptedData { message } => {
                write!(f, "Corrupted data detected: {message}")
            }
            Self::InvalidData(err) if err.details.is_empty() => write!(f, "{}", err.error()),
            Self::InvalidData(err) => write!(f, "{}", err.details),
            Self::ReadFailure(err) => write!(f, "Failed to read data: {err}"),
            Self::DataTooLarge { size_bytes } => write!(
                f,
                "Data too large to save ({}; maximum is {})",
                format_mib(*size_bytes as u64),
                format_mib(MAX_STORAGE_BYTES as u64)
            ),
            Self::StorageQuotaExceeded(_) => write!(
                f,
                "Storage quota exceeded. Delete some projects to free up space."
            ),
            Self::SaveFailure { message } => write!(f, "Failed to save data: {message}"),
        }
    }
}

impl Error for PersistenceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidData(err) => Some(err),
            Self::ReadFailure(err) | Self::StorageQuotaExceeded(err) => Some(err),
            Self::CorruptedData { .. } | Self::DataTooLarge { .. } | Self::SaveFailure { .. } => {
                None
            }
        }
    }
}

/// Reads `key`, parses it as JSON, validates it and converts it to `T`.
///
/// # Errors
/// - `CorruptedData` when the stored text is not JSON.
/// - `InvalidData` when `validator` rejects the parsed value, or the value
///   does not convert into `T`.
/// - `ReadFailure` when the backend fails.
pub fn safe_parse_storage<T, S, V>(storage: &S, key: &str, validator: V) -> PersistenceResult<Option<T>>
where
    T: DeserializeOwned,
    S: StoragePort + ?Sized,
    V: Fn(&Value) -> ValidationResult<()>,
{
    let Some(raw) = storage
        .get_item(key)
        .map_err(PersistenceError::ReadFailure)?
    else {
        return Ok(None);
    };

    let value: Value = serde_json::from_str(&raw).map_err(|err| {
        warn!(
            "event=storage_read module=persistence status=error error_code=corrupted_data key={key}"
        );
        PersistenceError::CorruptedData {
            message: err.to_string(),
        }
    })?;

    if let Err(err) = validator(&value) {
        warn!(
            "event=storage_read module=persistence status=error error_code={} key={key}",
            err.kind.code()
        );
        return Err(PersistenceError::InvalidData(err));
    }

    let typed = serde_json::from_value(value).map_err(|err| {
        PersistenceError::InvalidData(ValidationError::new(
            ValidationErrorKind::InvalidProjectData,
            err.to_string(),
        ))
    })?;
    Ok(Some(typed))
}

/// Serializes `value` and writes it under `key`.
///
/// # Errors
/// - `DataTooLarge` before touching storage when the JSON exceeds [`MAX_STORAGE_BYTES`].
/// - `StorageQuotaExceeded` when the backend reports a quota failure.
/// - `SaveFailure` for serialization and every other backend failure.
pub fn safe_save_storage<T, S>(storage: &S, key: &str, value: &T) -> PersistenceResult<()>
where
    T: Serialize + ?Sized,
    S: StoragePort + ?Sized,
{
    let serialized = serde_json::to_string(value).map_err(|err| PersistenceError::SaveFailure {
        message: err.to_string(),
    })?;

    if serialized.len() > MAX_STORAGE_BYTES {
        warn!(
            "event=storage_write module=persistence status=error error_code=data_too_large key={key} size_bytes={}",
            serialized.len()
        );
        return Err(PersistenceError::DataTooLarge {
            size_bytes: serialized.len(),
        });
    }

    match storage.set_item(key, &serialized) {
        Ok(()) => {
            info!(
                "event=storage_write module=persistence status=ok key={key} size_bytes={}",
                serialized.len()
            );
            Ok(())
        }
        Err(err) if err.is_quota_exceeded() => Err(PersistenceError::StorageQuotaExceeded(err)),
        Err(err) => Err(PersistenceError::SaveFailure {
            message: err.to_string(),
        }),
    }
}

/// Removes `key`; a missing key is not an error.
pub fn remove_storage<S>(storage: &S, key: &str) -> PersistenceResult<()>
where
    S: StoragePort + ?Sized,
{
    storage
        .remove_item(key)
        .map_err(|err| PersistenceError::SaveFailure {
            message: err.to_string(),
        })
}
