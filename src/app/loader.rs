// src/app/loader.rs — background schedule load, one worker per attempt
use std::sync::mpsc::{Sender, TryRecvError};
use std::sync::Arc;

use eframe::egui as eg;
use tracing::{debug, info, warn};

use super::error::ScheduleError;
use super::fetch::ScheduleSource;
use super::schedule::Schedule;
use super::types::{
    DateChoice, LoadMsg, LoadPhase, Loaded, STATUS_FETCH_FAILED, STATUS_LOADING, STATUS_NO_DATES,
    STATUS_READY,
};

/// Fetch, parse and extract dates. Runs on the worker thread.
pub(crate) fn load_schedule(source: &dyn ScheduleSource) -> Result<Loaded, ScheduleError> {
    let payload = source.fetch()?;
    let schedule = Schedule::from_payload(&payload)?;
    let dates = schedule.available_dates();
    if dates.is_empty() {
        return Err(ScheduleError::NoData);
    }
    Ok(Loaded { schedule, dates })
}

/// Spawn the worker for load `generation`. The UI is woken once the result is queued.
pub(crate) fn spawn_schedule_load(
    tx: Sender<LoadMsg>,
    source: Arc<dyn ScheduleSource>,
    generation: u64,
    repaint: Option<eg::Context>,
) {
    std::thread::spawn(move || {
        let result = load_schedule(source.as_ref());
        if let Err(e) = &result {
            warn!("schedule load #{generation} failed: {e}");
        }
        // receiver gone means the window closed
        let _ = tx.send(LoadMsg { generation, result });
        if let Some(ctx) = repaint {
            ctx.request_repaint();
        }
    });
}

fn status_for(err: &ScheduleError) -> &'static str {
    match err {
        ScheduleError::NoData => STATUS_NO_DATES,
        _ => STATUS_FETCH_FAILED,
    }
}

impl crate::app::ShowsheetApp {
    /// Enter `Loading` and start a fresh worker. Any older in-flight load becomes stale.
    pub fn start_load(&mut self, ctx: Option<&eg::Context>) {
        self.generation += 1;
        self.phase = LoadPhase::Loading;
        self.set_status(STATUS_LOADING);
        self.dates.clear();
        self.selected = 0;

        let Some(source) = self.source.clone() else {
            self.phase = LoadPhase::Failed;
            self.set_status(STATUS_FETCH_FAILED);
            return;
        };

        info!("starting schedule load #{}", self.generation);
        spawn_schedule_load(
            self.load_tx.clone(),
            source,
            self.generation,
            ctx.cloned(),
        );
    }

    /// Drain finished loads. Returns true if anything changed.
    pub fn poll_load(&mut self) -> bool {
        let mut changed = false;
        loop {
            match self.load_rx.try_recv() {
                Ok(msg) => changed |= self.apply_load(msg),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    /// Apply one worker result. Results from superseded loads are dropped.
    pub fn apply_load(&mut self, msg: LoadMsg) -> bool {
        if msg.generation != self.generation {
            debug!(
                "dropping stale load #{} (current #{})",
                msg.generation, self.generation
            );
            return false;
        }

        match msg.result {
            Ok(Loaded { schedule, dates }) => {
                self.dates = dates.into_iter().map(DateChoice::new).collect();
                self.selected = 0;
                self.schedule = Some(schedule);
                self.phase = LoadPhase::Ready;
                self.set_status(STATUS_READY);
                info!("schedule ready: {} dates", self.dates.len());
            }
            Err(e) => {
                self.phase = LoadPhase::Failed;
                self.set_status(status_for(&e));
            }
        }
        true
    }
}
