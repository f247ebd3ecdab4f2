// src/app/mod.rs — window state: background schedule load + generate-and-open

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use eframe::egui as eg;
use tracing::{error, info};

use crate::config::AppConfig;

// ---- Local modules ----
pub mod error;
pub mod fetch;
pub mod fonts;
pub mod loader;
pub mod output;
pub mod report;
pub mod schedule;
pub mod types;
pub mod ui;
pub mod utils;

pub use error::ScheduleError;
pub use fetch::{HttpScheduleSource, ScheduleSource};
pub use report::{build_report, Report};
pub use schedule::Schedule;
pub use types::{DateChoice, LoadMsg, LoadPhase, Loaded};

pub struct ShowsheetApp {
    config: AppConfig,
    source: Option<Arc<dyn ScheduleSource>>,

    // load state
    phase: LoadPhase,
    status: String,
    generation: u64,
    load_tx: Sender<LoadMsg>,
    load_rx: Receiver<LoadMsg>,

    // data (UI thread only)
    schedule: Option<Schedule>,
    dates: Vec<DateChoice>,
    selected: usize,

    today: String,
    error_dialog: Option<String>,
    last_saved: Option<PathBuf>,

    // one-time init guard
    did_init: bool,
}

impl ShowsheetApp {
    pub fn new(config: AppConfig) -> Self {
        let source: Option<Arc<dyn ScheduleSource>> = match HttpScheduleSource::new(&config) {
            Ok(s) => {
                let s: Arc<dyn ScheduleSource> = Arc::new(s);
                Some(s)
            }
            Err(e) => {
                error!("cannot prepare schedule client: {e}");
                None
            }
        };
        Self::with_source(config, source)
    }

    pub fn with_source(config: AppConfig, source: Option<Arc<dyn ScheduleSource>>) -> Self {
        let (load_tx, load_rx) = mpsc::channel();
        Self {
            config,
            source,
            phase: LoadPhase::Loading,
            status: types::STATUS_LOADING.to_string(),
            generation: 0,
            load_tx,
            load_rx,
            schedule: None,
            dates: Vec::new(),
            selected: 0,
            today: utils::today_label(),
            error_dialog: None,
            last_saved: None,
            did_init: false,
        }
    }

    fn set_status<S: Into<String>>(&mut self, s: S) {
        self.status = s.into();
    }

    // ---- read-only view for the UI and tests ----
    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn dates(&self) -> &[DateChoice] {
        &self.dates
    }

    pub fn selected_date(&self) -> Option<&str> {
        self.dates.get(self.selected).map(|d| d.value.as_str())
    }

    pub fn select_date(&mut self, iso: &str) -> bool {
        match self.dates.iter().position(|d| d.value == iso) {
            Some(idx) => {
                self.selected = idx;
                true
            }
            None => false,
        }
    }

    pub fn can_generate(&self) -> bool {
        self.phase == LoadPhase::Ready && self.selected_date().is_some()
    }

    pub fn retry_visible(&self) -> bool {
        self.phase == LoadPhase::Failed
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_dialog.as_deref()
    }

    pub fn last_saved(&self) -> Option<&PathBuf> {
        self.last_saved.as_ref()
    }

    fn output_dir(&self) -> PathBuf {
        self.config
            .output_dir
            .clone()
            .unwrap_or_else(output::desktop_dir)
    }

    /// Build the sheet for the selected date and write it. Does not open it.
    pub fn generate(&mut self) -> Result<PathBuf, ScheduleError> {
        let date = self
            .selected_date()
            .map(str::to_string)
            .ok_or_else(|| ScheduleError::DocumentBuild("no date selected".into()))?;
        let schedule = self
            .schedule
            .as_ref()
            .ok_or_else(|| ScheduleError::DocumentBuild("schedule not loaded".into()))?;

        let report = build_report(schedule, &date)?;
        info!("generating sheet:\n{}", report.summary());
        let bytes = report.to_docx_bytes()?;

        let filename = output::output_filename(&self.config.file_prefix, &date);
        let path = output::save_unique(&self.output_dir(), &filename, &bytes)?;
        self.last_saved = Some(path.clone());
        Ok(path)
    }

    /// The button action: generate, then open. Failures before opening raise the dialog.
    pub fn generate_and_open(&mut self) {
        match self.generate() {
            Ok(path) => {
                self.set_status(format!("已保存：{}", path.display()));
                output::open_or_log(&path);
            }
            Err(e) => {
                error!("document generation failed: {e}");
                self.error_dialog = Some(e.to_string());
            }
        }
    }

    pub fn dismiss_error(&mut self) {
        self.error_dialog = None;
    }
}

impl eframe::App for ShowsheetApp {
    fn update(&mut self, ctx: &eg::Context, _frame: &mut eframe::Frame) {
        if !self.did_init {
            self.did_init = true;
            self.start_load(Some(ctx));
        }
        self.poll_load();
        self.render(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::schedule::tests::sample_payload;

    fn ready_app(out: &std::path::Path) -> ShowsheetApp {
        let config = AppConfig {
            output_dir: Some(out.to_path_buf()),
            ..AppConfig::default()
        };
        let mut app = ShowsheetApp::with_source(config, None);
        app.generation = 1;
        let schedule = Schedule::from_payload(&sample_payload()).unwrap();
        let dates = schedule.available_dates();
        assert!(app.apply_load(LoadMsg {
            generation: 1,
            result: Ok(Loaded { schedule, dates }),
        }));
        app
    }

    #[test]
    fn generate_writes_suffixed_files_repeatedly() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = ready_app(tmp.path());
        assert!(app.select_date("2024-03-09"));

        let first = app.generate().unwrap();
        assert_eq!(first, tmp.path().join("中影影城排片_20240309.docx"));
        let second = app.generate().unwrap();
        assert_eq!(second, tmp.path().join("中影影城排片_20240309_1.docx"));
        assert_eq!(app.phase(), LoadPhase::Ready);
        assert_eq!(app.last_saved(), Some(&second));

        let bytes = std::fs::read(&first).unwrap();
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn generate_without_schedule_is_a_build_error() {
        let mut app = ShowsheetApp::with_source(AppConfig::default(), None);
        let err = app.generate().unwrap_err();
        assert!(matches!(err, ScheduleError::DocumentBuild(_)));
    }

    #[test]
    fn unknown_date_is_not_selectable() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = ready_app(tmp.path());
        assert!(!app.select_date("2030-01-01"));
        assert_eq!(app.selected_date(), Some("2024-03-08"));
    }
}
