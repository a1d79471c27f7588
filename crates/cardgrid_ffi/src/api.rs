//! FFI use-case API for the Flutter layout screen.
//!
//! # Responsibility
//! - Expose the layout controller to Dart through an opaque session handle.
//! - Flatten controller outcomes into `ok + message` envelopes.
//!
//! # Invariants
//! - Exported functions never panic across the FFI boundary.
//! - Ids cross the boundary as UUID strings; cell keys as `"row-column"`.

use cardgrid_core::db::open_db;
use cardgrid_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CardId, CellKey, CellPitch, Confirmation, FieldId, FieldValue, GridPos, LayoutConfig,
    LayoutController, Point, SqliteLayoutStore, TransitionOutcome,
};
use log::warn;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, OnceLock};
use uuid::Uuid;

const LAYOUT_DB_FILE_NAME: &str = "cardgrid_layout.sqlite3";
const LAYOUT_DB_PATH_ENV: &str = "CARDGRID_DB_PATH";
static LAYOUT_DB_PATH: OnceLock<PathBuf> = OnceLock::new();

type Controller = LayoutController<SqliteLayoutStore>;

/// Health check for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes core logging once per process.
///
/// `level` is one of `trace|debug|info|warn|error`; `log_dir` must be an
/// absolute directory. Returns an empty string on success and the error
/// message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Generic result envelope for session actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutActionResponse {
    pub ok: bool,
    /// Id or cell key produced by the action, when there is one.
    pub value: Option<String>,
    pub message: String,
}

impl LayoutActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            value: None,
            message: message.into(),
        }
    }

    fn success_with(message: impl Into<String>, value: String) -> Self {
        Self {
            ok: true,
            value: Some(value),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            value: None,
            message: message.into(),
        }
    }
}

/// Opaque per-project layout session shared across Dart isolates.
#[flutter_rust_bridge::frb(opaque)]
pub struct LayoutSession {
    controller: Mutex<Controller>,
}

pub struct LayoutSessionOpenResponse {
    pub session: Option<LayoutSession>,
    pub message: String,
}

/// Opens the layout session for `project_key` on the shared layout database.
///
/// The database path comes from `CARDGRID_DB_PATH`, falling back to a file in
/// the system temp directory.
#[flutter_rust_bridge::frb(sync)]
pub fn layout_session_open(project_key: String) -> LayoutSessionOpenResponse {
    match open_session(project_key.as_str()) {
        Ok(session) => LayoutSessionOpenResponse {
            session: Some(session),
            message: "Layout loaded.".to_string(),
        },
        Err(message) => {
            warn!("event=session_open module=ffi status=error");
            LayoutSessionOpenResponse {
                session: None,
                message,
            }
        }
    }
}

fn open_session(project_key: &str) -> Result<LayoutSession, String> {
    let conn = open_db(resolve_layout_db_path())
        .map_err(|err| format!("layout DB open failed: {err}"))?;
    let store = SqliteLayoutStore::try_new(conn)
        .map_err(|err| format!("layout store init failed: {err}"))?;
    let controller = LayoutController::open(project_key, store, LayoutConfig::default())
        .map_err(|err| format!("layout_session_open failed: {err}"))?;
    Ok(LayoutSession {
        controller: Mutex::new(controller),
    })
}

impl LayoutSession {
    /// Current mode as `locked|layout_editing|info_editing`.
    #[flutter_rust_bridge::frb(sync)]
    pub fn mode(&self) -> String {
        match self.lock() {
            Ok(controller) => controller.mode().as_str().to_string(),
            Err(message) => message,
        }
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn enter_layout_edit(&self) -> LayoutActionResponse {
        self.with(|controller| Ok(transition_response(controller.enter_layout_edit())))
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn lock_layout(&self, confirmed: bool) -> LayoutActionResponse {
        self.with(|controller| {
            controller
                .lock_layout(confirmation(confirmed))
                .map(|()| LayoutActionResponse::success("Layout saved."))
                .map_err(|err| err.to_string())
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn enter_info_edit(&self) -> LayoutActionResponse {
        self.with(|controller| Ok(transition_response(controller.enter_info_edit())))
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn save_info(&self) -> LayoutActionResponse {
        self.with(|controller| {
            controller
                .save_info()
                .map(|()| LayoutActionResponse::success("Information saved."))
                .map_err(|err| err.to_string())
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn cancel_info_edit(&self) -> LayoutActionResponse {
        self.with(|controller| {
            controller
                .cancel_info_edit()
                .map(|()| LayoutActionResponse::success("Changes discarded."))
                .map_err(|err| err.to_string())
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn add_card(&self, title: String) -> LayoutActionResponse {
        self.with(|controller| {
            controller
                .add_card(title.as_str())
                .map(|id| LayoutActionResponse::success_with("Card added.", id.to_string()))
                .map_err(|err| err.to_string())
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn remove_card(&self, card_id: String, confirmed: bool) -> LayoutActionResponse {
        self.with(|controller| {
            let card_id = parse_card_id(&card_id)?;
            controller
                .remove_card(card_id, confirmation(confirmed))
                .map(|_| LayoutActionResponse::success("Card removed."))
                .map_err(|err| err.to_string())
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn rename_card(&self, card_id: String, title: String) -> LayoutActionResponse {
        self.with(|controller| {
            let card_id = parse_card_id(&card_id)?;
            controller
                .rename_card(card_id, title.as_str())
                .map(|()| LayoutActionResponse::success("Card renamed."))
                .map_err(|err| err.to_string())
        })
    }

    /// Drops a card on `(row, column)` as one drag gesture.
    #[flutter_rust_bridge::frb(sync)]
    pub fn move_card(&self, card_id: String, row: u32, column: u32) -> LayoutActionResponse {
        self.with(|controller| {
            let card_id = parse_card_id(&card_id)?;
            controller.begin_drag(card_id).map_err(|err| err.to_string())?;
            match controller.commit_drag(GridPos::new(row, column)) {
                Ok(_) => Ok(LayoutActionResponse::success("Card moved.")),
                Err(err) => {
                    controller.cancel_drag();
                    Err(err.to_string())
                }
            }
        })
    }

    /// Applies one resize gesture of `(delta_x_px, delta_y_px)`.
    ///
    /// The returned value is `"<column_span>x<row_span>"`.
    #[flutter_rust_bridge::frb(sync)]
    pub fn resize_card(
        &self,
        card_id: String,
        delta_x_px: f64,
        delta_y_px: f64,
        column_pitch_px: f64,
        row_pitch_px: f64,
    ) -> LayoutActionResponse {
        self.with(|controller| {
            let card_id = parse_card_id(&card_id)?;
            let start = Point::new(0.0, 0.0);
            let pitch = CellPitch::new(column_pitch_px, row_pitch_px);
            controller
                .begin_resize(card_id, start, pitch)
                .map_err(|err| err.to_string())?;
            // The gesture must be closed even when the update is refused.
            let spans = controller.update_resize(Point::new(delta_x_px, delta_y_px));
            let ended = controller.end_resize();
            let (column_span, row_span) = spans.map_err(|err| err.to_string())?;
            ended.map_err(|err| err.to_string())?;
            Ok(LayoutActionResponse::success_with(
                "Card resized.",
                format!("{column_span}x{row_span}"),
            ))
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn resize_canvas(&self, columns: u32, rows: u32) -> LayoutActionResponse {
        self.with(|controller| {
            controller
                .resize_canvas(columns, rows)
                .map(|()| LayoutActionResponse::success("Canvas resized."))
                .map_err(|err| err.to_string())
        })
    }

    /// Value is the number of fields unplaced by the resize.
    #[flutter_rust_bridge::frb(sync)]
    pub fn configure_sub_grid(
        &self,
        card_id: String,
        columns: u32,
        rows: u32,
    ) -> LayoutActionResponse {
        self.with(|controller| {
            let card_id = parse_card_id(&card_id)?;
            controller
                .configure_sub_grid(card_id, columns, rows)
                .map(|removed| {
                    LayoutActionResponse::success_with("Field grid updated.", removed.to_string())
                })
                .map_err(|err| err.to_string())
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn place_field(
        &self,
        card_id: String,
        field_id: String,
        row: u32,
        column: u32,
    ) -> LayoutActionResponse {
        self.with(|controller| {
            let card_id = parse_card_id(&card_id)?;
            let field_id = parse_field_id(&field_id)?;
            controller
                .place_field(card_id, field_id, row, column)
                .map(|key| LayoutActionResponse::success_with("Field placed.", key.to_string()))
                .map_err(|err| err.to_string())
        })
    }

    #[flutter_rust_bridge::frb(sync)]
    pub fn unplace_field(&self, card_id: String, cell_key: String) -> LayoutActionResponse {
        self.with(|controller| {
            let card_id = parse_card_id(&card_id)?;
            let key = parse_cell_key(&cell_key)?;
            controller
                .unplace_field(card_id, key)
                .map(|field_id| {
                    LayoutActionResponse::success_with("Field unplaced.", field_id.to_string())
                })
                .map_err(|err| err.to_string())
        })
    }

    /// Value is the resulting span.
    #[flutter_rust_bridge::frb(sync)]
    pub fn change_field_span(
        &self,
        card_id: String,
        cell_key: String,
        delta: i32,
    ) -> LayoutActionResponse {
        self.with(|controller| {
            let card_id = parse_card_id(&card_id)?;
            let key = parse_cell_key(&cell_key)?;
            controller
                .change_field_span(card_id, key, delta)
                .map(|span| LayoutActionResponse::success_with("Span changed.", span.to_string()))
                .map_err(|err| err.to_string())
        })
    }

    /// Sets a text value; an empty string clears the field.
    #[flutter_rust_bridge::frb(sync)]
    pub fn set_text_field_value(
        &self,
        card_id: String,
        field_id: String,
        text: String,
    ) -> LayoutActionResponse {
        self.with(|controller| {
            let card_id = parse_card_id(&card_id)?;
            let field_id = parse_field_id(&field_id)?;
            let value = if text.trim().is_empty() {
                FieldValue::Empty
            } else {
                FieldValue::Text(text)
            };
            controller
                .set_field_value(card_id, field_id, value)
                .map(|()| LayoutActionResponse::success("Value updated."))
                .map_err(|err| err.to_string())
        })
    }

    /// Canvas, cards, values and mode as one JSON document for rendering.
    #[flutter_rust_bridge::frb(sync)]
    pub fn layout_snapshot_json(&self) -> LayoutActionResponse {
        self.with(|controller| {
            let layout = serde_json::to_value(controller.layout()).map_err(|err| err.to_string())?;
            let values = serde_json::to_value(controller.values()).map_err(|err| err.to_string())?;
            let mut snapshot = serde_json::Map::new();
            snapshot.insert(
                "project_key".to_string(),
                controller.project_key().to_string().into(),
            );
            snapshot.insert("mode".to_string(), controller.mode().as_str().into());
            snapshot.insert("layout".to_string(), layout);
            snapshot.insert("values".to_string(), values);
            Ok(LayoutActionResponse::success_with(
                "Snapshot ready.",
                serde_json::Value::Object(snapshot).to_string(),
            ))
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Controller>, String> {
        self.controller
            .lock()
            .map_err(|_| "layout session is unavailable after a panic".to_string())
    }

    fn with(
        &self,
        f: impl FnOnce(&mut Controller) -> Result<LayoutActionResponse, String>,
    ) -> LayoutActionResponse {
        let mut controller = match self.lock() {
            Ok(controller) => controller,
            Err(message) => return LayoutActionResponse::failure(message),
        };
        f(&mut *controller).unwrap_or_else(LayoutActionResponse::failure)
    }
}

fn transition_response(outcome: TransitionOutcome) -> LayoutActionResponse {
    match outcome {
        TransitionOutcome::Entered => LayoutActionResponse::success("Editing."),
        TransitionOutcome::AlreadyActive => LayoutActionResponse::success("Already editing."),
        TransitionOutcome::Blocked { active } => LayoutActionResponse::failure(format!(
            "Finish {} first.",
            active.as_str()
        )),
    }
}

fn confirmation(confirmed: bool) -> Confirmation {
    if confirmed {
        Confirmation::Confirmed
    } else {
        Confirmation::Declined
    }
}

fn parse_card_id(raw: &str) -> Result<CardId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid card id `{raw}`"))
}

fn parse_field_id(raw: &str) -> Result<FieldId, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid field id `{raw}`"))
}

fn parse_cell_key(raw: &str) -> Result<CellKey, String> {
    raw.trim().parse::<CellKey>().map_err(|err| err.to_string())
}

fn resolve_layout_db_path() -> PathBuf {
    LAYOUT_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(LAYOUT_DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(LAYOUT_DB_FILE_NAME)
        })
        .clone()
}
