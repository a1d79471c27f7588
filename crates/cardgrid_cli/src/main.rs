//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `cardgrid_core` linkage without the Flutter runtime.
//! - Open an in-memory store and print the default layout for a demo project.

use cardgrid_core::{open_db_in_memory, LayoutConfig, LayoutController, SqliteLayoutStore};
use std::process::ExitCode;

const DEMO_PROJECT_KEY: &str = "demo";

fn main() -> ExitCode {
    println!("cardgrid_core ping={}", cardgrid_core::ping());
    println!("cardgrid_core version={}", cardgrid_core::core_version());

    match print_default_layout() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("cardgrid_cli error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn print_default_layout() -> Result<(), String> {
    let conn = open_db_in_memory().map_err(|err| err.to_string())?;
    let store = SqliteLayoutStore::try_new(conn).map_err(|err| err.to_string())?;
    let controller = LayoutController::open(DEMO_PROJECT_KEY, store, LayoutConfig::default())
        .map_err(|err| err.to_string())?;

    let canvas = controller.canvas_model().canvas();
    println!(
        "project={} mode={} canvas={}x{} cards={}",
        controller.project_key(),
        controller.mode().as_str(),
        canvas.columns,
        canvas.rows,
        controller.cards().len()
    );
    for card in controller.cards() {
        println!(
            "  card at r{}c{} span={}x{} fields={}",
            card.grid_row,
            card.grid_column,
            card.column_span,
            card.row_span,
            card.fields.len()
        );
    }
    Ok(())
}
