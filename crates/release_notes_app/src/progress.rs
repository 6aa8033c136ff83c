use std::io::{self, Write};

use harvest_logging::harvest_warn;
use release_notes_engine::{HarvestEvent, ProgressSink};

/// Prints harvest progress to stdout in the familiar one-line-per-version form.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn emit(&self, event: HarvestEvent) {
        if let Err(err) = write_event(&mut io::stdout().lock(), &event) {
            harvest_warn!("Could not write progress to stdout: {}", err);
        }
    }
}

fn write_event(out: &mut impl Write, event: &HarvestEvent) -> io::Result<()> {
    out.write_all(render(event).as_bytes())?;
    out.flush()
}

/// Text for one event. `VersionStarted` leaves the line open for its result.
pub fn render(event: &HarvestEvent) -> String {
    match event {
        HarvestEvent::Started => "Fetching release notes...\n".to_string(),
        HarvestEvent::LanguageStarted { name } => format!("\nFetching {name} releases...\n"),
        HarvestEvent::VersionStarted { version } => format!("  {version}... "),
        HarvestEvent::VersionSkipped { version, reason } => {
            format!("  {version}... ERROR: {reason}\n")
        }
        HarvestEvent::VersionFinished { chars, .. } => format!("✓ ({chars} chars)\n"),
    }
}

pub fn summary(count: usize, path: &str) -> String {
    format!("\n✓ Cached {count} releases to {path}\n")
}
