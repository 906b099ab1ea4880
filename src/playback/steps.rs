use crate::error::ScrollSyncError;
use crate::model::Step;
use parking_lot::Mutex;
use tracing::{debug, info};

/// Index of the step containing `position`.
///
/// Ranges are half-open, so at a shared boundary the later step wins.
pub fn active_step_index(steps: &[Step], position: f64) -> Option<usize> {
    steps.iter().position(|step| step.contains(position))
}

/// The scrollable list of steps on the review screen
pub trait StepList: Send + Sync {
    fn scroll_to_index(&self, index: usize) -> Result<(), ScrollSyncError>;
}

/// One rendered step row
#[derive(Debug, Clone, PartialEq)]
pub struct StepRow {
    pub label: String,
    pub active: bool,
    pub seek_target: f64,
}

/// Keeps the step list scrolled to the step under the playhead
pub struct StepSynchronizer {
    list: Box<dyn StepList>,
    scrolled: Option<usize>,
}

impl StepSynchronizer {
    pub fn new(list: Box<dyn StepList>) -> Self {
        Self {
            list,
            scrolled: None,
        }
    }

    /// Last index the list was successfully scrolled to; the first step
    /// until the first scroll lands
    pub fn current_index(&self) -> usize {
        self.scrolled.unwrap_or(0)
    }

    /// Run on every render pass. Returns the newly scrolled-to index when it
    /// changed. The first pass scrolls even to the first step, and a failed
    /// scroll is logged and retried on the next pass.
    pub fn sync(&mut self, steps: &[Step], position: f64) -> Option<usize> {
        if steps.is_empty() {
            return None;
        }

        let active = match active_step_index(steps, position) {
            Some(index) => index,
            None if self.scrolled.is_none() => 0,
            None => return None,
        };
        if self.scrolled == Some(active) {
            return None;
        }

        match self.list.scroll_to_index(active) {
            Ok(()) => {
                debug!("Active step {:?} -> {}", self.scrolled, active);
                self.scrolled = Some(active);
                Some(active)
            }
            Err(e) => {
                info!("Scroll to step {} failed: {}", active, e);
                None
            }
        }
    }

    pub fn rows(steps: &[Step], position: f64) -> Vec<StepRow> {
        let active = active_step_index(steps, position);
        steps
            .iter()
            .enumerate()
            .map(|(index, step)| StepRow {
                label: format!("{}: {}", index + 1, step.description),
                active: active == Some(index),
                seek_target: step.seek_target(),
            })
            .collect()
    }
}

/// Step list stand-in that only scrolls within its laid-out rows
#[derive(Debug)]
pub struct MockStepList {
    laid_out: Mutex<usize>,
    scrolls: Mutex<Vec<usize>>,
}

impl MockStepList {
    pub fn new(laid_out: usize) -> Self {
        Self {
            laid_out: Mutex::new(laid_out),
            scrolls: Mutex::new(Vec::new()),
        }
    }

    pub fn set_laid_out(&self, laid_out: usize) {
        *self.laid_out.lock() = laid_out;
    }

    pub fn scrolls(&self) -> Vec<usize> {
        self.scrolls.lock().clone()
    }
}

impl StepList for MockStepList {
    fn scroll_to_index(&self, index: usize) -> Result<(), ScrollSyncError> {
        let laid_out = *self.laid_out.lock();
        if laid_out == 0 {
            return Err(ScrollSyncError::NotMounted);
        }
        if index >= laid_out {
            return Err(ScrollSyncError::OutOfLayout { index, laid_out });
        }
        self.scrolls.lock().push(index);
        Ok(())
    }
}

impl<T: StepList + ?Sized> StepList for std::sync::Arc<T> {
    fn scroll_to_index(&self, index: usize) -> Result<(), ScrollSyncError> {
        (**self).scroll_to_index(index)
    }
}
