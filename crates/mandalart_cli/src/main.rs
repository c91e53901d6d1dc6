//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `mandalart_core` linkage.
//! - Start file logging (`MANDALART_LOG_LEVEL`, `MANDALART_LOG_DIR`).
//! - Print the 9x9 role layout for quick manual inspection.
//!
//! Legend: `U` ultimate goal, `S` sub-goal, `M` mirror center, `.` action item.

use mandalart_core::grid::{is_mirror_center, BLOCK_SIZE, GRID_SIZE};
use mandalart_core::{
    default_log_dir, default_log_level, init_logging, CellRole, GridIndex, LogSettings,
    LoggingError,
};
use std::path::PathBuf;

fn main() {
    let level = std::env::var("MANDALART_LOG_LEVEL").ok();
    let log_dir = std::env::var("MANDALART_LOG_DIR").ok();
    match log_settings(level.as_deref(), log_dir.as_deref()).and_then(|settings| {
        init_logging(&settings)?;
        Ok(settings)
    }) {
        Ok(settings) => println!("mandalart_core log_dir={}", settings.log_dir.display()),
        Err(err) => eprintln!("mandalart_core logging disabled: {err}"),
    }

    println!("mandalart_core ping={}", mandalart_core::ping());
    println!("mandalart_core version={}", mandalart_core::core_version());
    print!("{}", render_layout());
}

fn log_settings(level: Option<&str>, log_dir: Option<&str>) -> Result<LogSettings, LoggingError> {
    let level = match level {
        Some(value) => LogSettings::parse_level(value)?,
        None => default_log_level(),
    };
    let log_dir = log_dir
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(default_log_dir, PathBuf::from);
    Ok(LogSettings::new(level, log_dir))
}

fn glyph(index: GridIndex) -> char {
    match index.role() {
        CellRole::UltimateGoal => 'U',
        CellRole::SubGoal => 'S',
        CellRole::ActionItem if is_mirror_center(index) => 'M',
        CellRole::ActionItem => '.',
    }
}

fn render_layout() -> String {
    let mut out = String::new();
    for (position, index) in GridIndex::all().enumerate() {
        let col = position % GRID_SIZE;
        if col > 0 {
            out.push(' ');
            if col % BLOCK_SIZE == 0 {
                out.push_str("| ");
            }
        }
        out.push(glyph(index));
        if col == GRID_SIZE - 1 {
            out.push('\n');
            let row = position / GRID_SIZE;
            if row % BLOCK_SIZE == BLOCK_SIZE - 1 && row < GRID_SIZE - 1 {
                out.push_str("------+-------+------\n");
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{log_settings, render_layout};
    use mandalart_core::{default_log_dir, default_log_level, LoggingError};

    #[test]
    fn log_settings_fall_back_to_defaults() {
        let settings = log_settings(None, Some("  ")).unwrap();
        assert_eq!(settings.level, default_log_level());
        assert_eq!(settings.log_dir, default_log_dir());
    }

    #[test]
    fn log_settings_reject_unknown_level() {
        assert!(matches!(
            log_settings(Some("chatty"), None),
            Err(LoggingError::InvalidLevel(_))
        ));
    }

    #[test]
    fn layout_marks_center_block_and_mirrors() {
        let layout = render_layout();
        let lines: Vec<&str> = layout.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], ". . . | . . . | . . .");
        assert_eq!(lines[1], ". M . | . M . | . M .");
        assert_eq!(lines[3], "------+-------+------");
        assert_eq!(lines[4], ". . . | S S S | . . .");
        assert_eq!(lines[5], ". M . | S U S | . M .");
        assert_eq!(layout.matches('M').count(), 8);
    }
}
