//! Progress reporting utilities using indicatif.
//!
//! [`Progress`] implements [`ProgressCallback`] and draws one terminal
//! indicator per phase:
//! - `reading`: a spinner counting input lines (the total is unknown up front)
//! - `grouping`: a bar over the unique records

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};

/// Progress callback for the load and grouping phases.
///
/// Implement this trait to receive progress updates while records are read
/// and grouped.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ("reading" or "grouping")
    /// * `total` - Number of items to process, or 0 when unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called as items are processed.
    ///
    /// # Arguments
    ///
    /// * `current` - Items processed so far
    /// * `detail` - Optional detail text, may be empty
    fn on_progress(&self, current: usize, detail: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);

    /// Called to update the progress message.
    fn on_message(&self, _message: &str) {}
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    reading: Mutex<Option<ProgressBar>>,
    grouping: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is drawn.
    ///
    /// # Examples
    ///
    /// ```
    /// use linegroup::progress::Progress;
    ///
    /// let progress = Progress::new(false);
    /// assert!(!progress.is_quiet());
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            multi: MultiProgress::new(),
            reading: Mutex::new(None),
            grouping: Mutex::new(None),
            quiet,
        }
    }

    /// Check if drawing is disabled.
    #[must_use]
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    fn reading_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} lines")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn grouping_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    fn slot(&self, phase: &str) -> Option<&Mutex<Option<ProgressBar>>> {
        match phase {
            "reading" => Some(&self.reading),
            "grouping" => Some(&self.grouping),
            _ => None,
        }
    }

    /// The bar of the latest active phase.
    fn active(&self) -> Option<ProgressBar> {
        [&self.grouping, &self.reading]
            .into_iter()
            .find_map(|slot| slot.lock().ok().and_then(|bar| bar.clone()))
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let bar = match phase {
            "reading" => {
                let pb = self.multi.add(ProgressBar::new_spinner());
                pb.set_style(Self::reading_style());
                pb.set_message("Reading records");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
            _ => {
                let pb = self.multi.add(ProgressBar::new(total as u64));
                pb.set_style(Self::grouping_style());
                pb.set_message(if phase == "grouping" {
                    "Grouping".to_string()
                } else {
                    phase.to_string()
                });
                pb
            }
        };

        if let Some(slot) = self.slot(phase) {
            if let Ok(mut guard) = slot.lock() {
                *guard = Some(bar);
            }
        }
    }

    fn on_progress(&self, current: usize, detail: &str) {
        if self.quiet {
            return;
        }

        if let Some(pb) = self.active() {
            pb.set_position(current as u64);
            if !detail.is_empty() {
                pb.set_message(detail.to_string());
            }
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }

        let finished = match phase {
            "reading" => "Reading complete",
            "grouping" => "Grouping complete",
            _ => return,
        };
        let bar = self
            .slot(phase)
            .and_then(|slot| slot.lock().ok().and_then(|mut guard| guard.take()));
        if let Some(pb) = bar {
            pb.finish_with_message(finished);
        }
    }

    fn on_message(&self, message: &str) {
        if self.quiet {
            return;
        }

        if let Some(pb) = self.active() {
            pb.set_message(message.to_string());
        }
    }
}
