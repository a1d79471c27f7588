//! Layout and field-value persistence.
//!
//! # Responsibility
//! - Define the storage contract the controller saves through.
//! - Persist card layouts and field values as JSON documents in SQLite.
//!
//! # Invariants
//! - Layouts are validated before every write and after every read.
//! - Corrupt or invalid documents surface as `InvalidData`, never as defaults.
//! - Project keys are normalized before they reach SQL.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::card::{CardLayout, ModelValidationError};
use crate::model::values::FieldValues;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CARD_LAYOUTS_TABLE: &str = "card_layouts";
const FIELD_VALUE_SETS_TABLE: &str = "field_value_sets";

static PROJECT_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._:-]{1,128}$").expect("valid project key regex"));

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    InvalidProjectKey(String),
    /// Persisted document parsed but violates layout invariants, or did not
    /// parse at all.
    InvalidData(String),
    Serialization(serde_json::Error),
    /// Connection was not migrated to the version this build expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidProjectKey(key) => write!(f, "invalid project key `{key}`"),
            Self::InvalidData(message) => write!(f, "invalid layout data: {message}"),
            Self::Serialization(err) => write!(f, "layout serialization failed: {err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "layout store requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidProjectKey(_) => None,
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

impl From<ModelValidationError> for StoreError {
    fn from(value: ModelValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

/// Storage contract used by the layout controller.
///
/// `None` from a load means "never saved"; callers fall back to defaults.
pub trait LayoutStore {
    fn load_card_layout(&self, project_key: &str) -> StoreResult<Option<CardLayout>>;
    fn save_card_layout(&mut self, project_key: &str, layout: &CardLayout) -> StoreResult<()>;
    fn load_field_values(&self, project_key: &str) -> StoreResult<Option<FieldValues>>;
    fn save_field_values(&mut self, project_key: &str, values: &FieldValues) -> StoreResult<()>;
}

/// Trims `raw` and checks it against the allowed project key alphabet.
pub fn normalize_project_key(raw: &str) -> StoreResult<String> {
    let trimmed = raw.trim();
    if PROJECT_KEY_RE.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(StoreError::InvalidProjectKey(raw.to_string()))
    }
}

/// SQLite-backed store owning its connection.
pub struct SqliteLayoutStore {
    conn: Connection,
}

impl SqliteLayoutStore {
    /// Wraps a connection opened through `db::open_db*`.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        ensure_store_connection_ready(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn load_document(&self, table: &str, project_key: &str) -> StoreResult<Option<String>> {
        let key = normalize_project_key(project_key)?;
        let document = self
            .conn
            .query_row(
                &format!("SELECT document FROM {table} WHERE project_key = ?1;"),
                [key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(document)
    }

    fn save_document(&self, table: &str, project_key: &str, document: &str) -> StoreResult<()> {
        let key = normalize_project_key(project_key)?;
        self.conn.execute(
            &format!(
                "INSERT INTO {table} (project_key, document, updated_at)
                 VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
                 ON CONFLICT(project_key) DO UPDATE SET
                    document = excluded.document,
                    updated_at = excluded.updated_at;"
            ),
            params![key, document],
        )?;
        debug!(
            "event=store_write module=repo status=ok table={table} bytes={}",
            document.len()
        );
        Ok(())
    }
}

impl LayoutStore for SqliteLayoutStore {
    fn load_card_layout(&self, project_key: &str) -> StoreResult<Option<CardLayout>> {
        let Some(document) = self.load_document(CARD_LAYOUTS_TABLE, project_key)? else {
            return Ok(None);
        };
        let layout: CardLayout = serde_json::from_str(&document).map_err(|err| {
            warn!(
                "event=store_read module=repo status=error table={CARD_LAYOUTS_TABLE} error_code=parse_failed"
            );
            StoreError::InvalidData(format!("card layout document: {err}"))
        })?;
        layout.validate()?;
        Ok(Some(layout))
    }

    fn save_card_layout(&mut self, project_key: &str, layout: &CardLayout) -> StoreResult<()> {
        layout.validate()?;
        let document = serde_json::to_string(layout)?;
        self.save_document(CARD_LAYOUTS_TABLE, project_key, &document)
    }

    fn load_field_values(&self, project_key: &str) -> StoreResult<Option<FieldValues>> {
        let Some(document) = self.load_document(FIELD_VALUE_SETS_TABLE, project_key)? else {
            return Ok(None);
        };
        let values = serde_json::from_str(&document).map_err(|err| {
            warn!(
                "event=store_read module=repo status=error table={FIELD_VALUE_SETS_TABLE} error_code=parse_failed"
            );
            StoreError::InvalidData(format!("field value document: {err}"))
        })?;
        Ok(Some(values))
    }

    fn save_field_values(&mut self, project_key: &str, values: &FieldValues) -> StoreResult<()> {
        let document = serde_json::to_string(values)?;
        self.save_document(FIELD_VALUE_SETS_TABLE, project_key, &document)
    }
}

fn ensure_store_connection_ready(conn: &Connection) -> StoreResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(StoreError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    for table in [CARD_LAYOUTS_TABLE, FIELD_VALUE_SETS_TABLE] {
        if !table_exists(conn, table)? {
            return Err(StoreError::InvalidData(format!("missing table `{table}`")));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StoreResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
