//! Live progress display
//!
//! The progress bar and every other line of output share one terminal. All
//! writes go through the same `MultiProgress`: discovery lines are printed
//! above the bar with `println`, and tracing events are written while the bar
//! is suspended, so neither side tears the other. When stderr is not a
//! terminal indicatif hides the bar and drops its `println` output, so
//! discovery lines are written to stdout instead.

use crate::oracle::ElementRef;
use crate::state::StatusSnapshot;
use console::style;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{self, Write};
use tracing_subscriber::fmt::MakeWriter;

const BAR_TEMPLATE: &str =
    "Pairing | {bar:40} | {percent}% | {pos}/{len} | Time Elapsed: {elapsed_precise} | {msg}";

fn pairing_style() -> ProgressStyle {
    ProgressStyle::with_template(BAR_TEMPLATE)
        .map(|s| s.progress_chars("=> "))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}

/// Renders crawl progress and discovery lines
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    multi: MultiProgress,
    bar: ProgressBar,
    /// Drop discovery lines entirely (quiet mode, tests)
    silent: bool,
}

impl ProgressReporter {
    /// Creates a reporter drawing into `multi`
    pub fn new(multi: MultiProgress) -> Self {
        let bar = multi.add(ProgressBar::new(0));
        bar.set_style(pairing_style());
        Self {
            multi,
            bar,
            silent: false,
        }
    }

    /// A reporter that prints nothing at all (quiet mode, tests)
    pub fn hidden() -> Self {
        Self {
            silent: true,
            ..Self::new(MultiProgress::with_draw_target(ProgressDrawTarget::hidden()))
        }
    }

    /// Whether lines bypass the bar and go straight to stdout
    fn writes_to_stdout(&self) -> bool {
        !self.silent && self.multi.is_hidden()
    }

    /// Sets the number of pairs the bar counts towards
    pub fn set_total(&self, total: u64) {
        self.bar.set_length(total);
    }

    /// Marks one pair as handled and refreshes the counters
    pub fn advance(&self, status: StatusSnapshot) {
        self.bar.set_message(status.to_string());
        self.bar.inc(1);
    }

    /// Prints a discovery line above the bar
    pub fn discovery(&self, line: &DiscoveryLine<'_>) {
        self.println(line.render());
    }

    /// Prints a plain line above the bar
    pub fn println(&self, text: impl AsRef<str>) {
        if self.silent {
            return;
        }
        if self.writes_to_stdout() {
            println!("{}", text.as_ref());
        } else if self.multi.println(text).is_err() {
            tracing::debug!("Failed to print line above progress bar");
        }
    }

    /// Leaves the bar in its final state
    pub fn finish(&self) {
        self.bar.finish();
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

/// What a discovery line says
#[derive(Debug)]
pub struct DiscoveryLine<'a> {
    pub status: StatusSnapshot,
    /// Globally new according to the oracle
    pub is_discovery: bool,
    pub first: &'a ElementRef,
    pub second: &'a ElementRef,
    pub result: &'a ElementRef,
}

impl DiscoveryLine<'_> {
    /// Formats the line with terminal colors
    pub fn render(&self) -> String {
        let counters = format!(
            "({} {} {} {})",
            style(format!("F: {}", self.status.new_elements_found)).green(),
            style(format!("D: {}", self.status.new_discoveries)).magenta(),
            style(format!("R: {}", self.status.new_recipes_found)).blue(),
            style(format!("T: {}", self.status.total_attempted)).yellow(),
        );
        let tag = if self.is_discovery {
            style("[DISCOVERY]").magenta()
        } else {
            style("[FOUND]").green()
        };
        format!(
            "{} {} {} {} + {} {} = {} {}",
            counters,
            tag,
            self.first.icon,
            self.first.text,
            self.second.icon,
            self.second.text,
            self.result.icon,
            self.result.text
        )
    }
}

/// `MakeWriter` for tracing that suspends the progress bar around each event
#[derive(Debug, Clone)]
pub struct ProgressWriter {
    multi: MultiProgress,
}

impl ProgressWriter {
    pub fn new(multi: MultiProgress) -> Self {
        Self { multi }
    }
}

impl<'a> MakeWriter<'a> for ProgressWriter {
    type Writer = SuspendedStderr;

    fn make_writer(&'a self) -> Self::Writer {
        SuspendedStderr {
            multi: self.multi.clone(),
            buf: Vec::new(),
        }
    }
}

/// Buffers one tracing event, then writes it to stderr with the bar hidden
pub struct SuspendedStderr {
    multi: MultiProgress,
    buf: Vec<u8>,
}

impl Write for SuspendedStderr {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for SuspendedStderr {
    fn drop(&mut self) {
        if self.buf.is_empty() {
            return;
        }
        let buf = std::mem::take(&mut self.buf);
        self.multi.suspend(|| {
            let _ = io::stderr().write_all(&buf);
        });
    }
}
