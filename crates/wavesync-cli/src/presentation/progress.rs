//! Progress rendering for install runs.
//!
//! Fed from [`InstallEvent`]s. A terminal gets an indicatif bar; anything
//! else gets one line per state change and per 10% step.

use std::io::{self, IsTerminal};
use std::time::Duration;

use indicatif::{HumanBytes, ProgressBar, ProgressDrawTarget, ProgressStyle};
use wavesync_core::{InstallEvent, InstallKind, InstallProgress, InstallState};

const PLAIN_STEP_PERCENT: u64 = 10;

/// Renders install events, picking terminal or plain output.
pub struct InstallProgressPrinter {
    inner: ProgressRender,
}

enum ProgressRender {
    Fancy(FancyProgress),
    Plain(PlainProgress),
}

impl InstallProgressPrinter {
    /// Create a printer, auto-detecting terminal capability.
    pub fn new(kind: InstallKind) -> Self {
        let inner = if io::stdout().is_terminal() {
            ProgressRender::Fancy(FancyProgress::new(kind))
        } else {
            ProgressRender::Plain(PlainProgress::new(kind))
        };
        Self { inner }
    }

    /// Apply one event.
    pub fn handle(&mut self, event: &InstallEvent) {
        match (&mut self.inner, event) {
            (ProgressRender::Fancy(inner), InstallEvent::StateChanged { state }) => {
                inner.state(*state);
            }
            (ProgressRender::Fancy(inner), InstallEvent::Progress(progress)) => {
                inner.progress(progress);
            }
            (ProgressRender::Plain(inner), InstallEvent::StateChanged { state }) => {
                inner.state(*state);
            }
            (ProgressRender::Plain(inner), InstallEvent::Progress(progress)) => {
                inner.progress(progress);
            }
        }
    }

    /// Finish and clear the display.
    pub fn finish(&self) {
        if let ProgressRender::Fancy(inner) = &self.inner {
            inner.bar.finish_and_clear();
        }
    }
}

struct FancyProgress {
    bar: ProgressBar,
    kind: InstallKind,
    saw_length: bool,
}

impl FancyProgress {
    fn new(kind: InstallKind) -> Self {
        let bar = ProgressBar::with_draw_target(None, ProgressDrawTarget::stdout());
        bar.set_style(spinner_style());
        bar.set_message(format!("{kind}: connecting"));
        bar.enable_steady_tick(Duration::from_millis(120));
        Self {
            bar,
            kind,
            saw_length: false,
        }
    }

    fn state(&self, state: InstallState) {
        self.bar.set_message(format!("{}: {}", self.kind, state_label(state)));
    }

    fn progress(&mut self, progress: &InstallProgress) {
        if progress.total_bytes_to_download == 0 {
            self.bar.tick();
            return;
        }
        if !self.saw_length {
            self.bar.set_style(bar_style());
            self.saw_length = true;
        }
        self.bar.set_length(progress.total_bytes_to_download);
        self.bar.set_position(progress.downloaded_bytes);
        self.bar.set_message(format!(
            "{} {}/{} files",
            self.kind, progress.downloaded_count, progress.total_count_to_download
        ));
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template(
        "{msg} {bar:28.cyan/blue} {bytes:>9} / {total_bytes:>9} @ {binary_bytes_per_sec} ETA {eta}",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar())
}

struct PlainProgress {
    kind: InstallKind,
    last_step: Option<u64>,
}

impl PlainProgress {
    const fn new(kind: InstallKind) -> Self {
        Self {
            kind,
            last_step: None,
        }
    }

    fn state(&self, state: InstallState) {
        println!("{}: {}", self.kind, state_label(state));
    }

    fn progress(&mut self, progress: &InstallProgress) {
        let step = percent_step(progress);
        if self.last_step != Some(step) {
            self.last_step = Some(step);
            println!("{}: {}", self.kind, describe(progress));
        }
    }
}

const fn state_label(state: InstallState) -> &'static str {
    match state {
        InstallState::Preparing => "checking local files",
        InstallState::Download => "downloading",
        InstallState::Completed => "done",
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent_step(progress: &InstallProgress) -> u64 {
    let percent = progress.percentage().clamp(0.0, 100.0) as u64;
    percent / PLAIN_STEP_PERCENT * PLAIN_STEP_PERCENT
}

/// One-line summary of a progress snapshot.
pub fn describe(progress: &InstallProgress) -> String {
    format!(
        "{}/{} files, {} / {} ({:.1}%)",
        progress.downloaded_count,
        progress.total_count_to_download,
        HumanBytes(progress.downloaded_bytes),
        HumanBytes(progress.total_bytes_to_download),
        progress.percentage()
    )
}
