//! Human-readable run summary.

use std::io::{self, Write};

use bytesize::ByteSize;
use yansi::{Paint, Style};

use crate::dedup::RunStats;

/// Plain-text summary written to stderr at the end of a run.
#[derive(Debug, Clone)]
pub struct TextSummary<'a> {
    stats: &'a RunStats,
    dry_run: bool,
    color: bool,
}

impl<'a> TextSummary<'a> {
    /// Create a summary for `stats`.
    #[must_use]
    pub fn new(stats: &'a RunStats, dry_run: bool) -> Self {
        Self {
            stats,
            dry_run,
            color: true,
        }
    }

    /// Enable or disable ANSI colors.
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn style(&self, style: Style) -> Style {
        if self.color {
            style
        } else {
            Style::new()
        }
    }

    /// Write the summary.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        let s = self.stats;
        let header = self.style(Style::new().bold());
        let good = self.style(Style::new().green());
        let warn = self.style(Style::new().yellow());
        let bad = self.style(Style::new().red().bold());

        let title = if self.dry_run {
            "Dry run summary (nothing was changed)"
        } else {
            "Summary"
        };
        writeln!(w, "{}", title.paint(header))?;
        writeln!(w, "  Files processed:    {}", s.files_processed)?;
        writeln!(w, "  New content:        {}", s.new_content)?;
        writeln!(w, "  Real hardlinks:     {}", s.real_hardlinks)?;
        writeln!(
            w,
            "  Duplicates:         {}",
            s.duplicates_relinked.paint(good)
        )?;
        writeln!(
            w,
            "  Orphaned hardlinks: {}",
            s.orphans_relinked.paint(good)
        )?;

        let skipped = s.stat_errors + s.read_errors + s.scan_errors + s.verify_mismatches;
        let skipped_style = if skipped > 0 { warn } else { Style::new() };
        writeln!(w, "  Skipped:            {}", skipped.paint(skipped_style))?;
        if skipped > 0 {
            writeln!(
                w,
                "    (stat: {}, read: {}, enumeration: {}, verify mismatch: {})",
                s.stat_errors, s.read_errors, s.scan_errors, s.verify_mismatches
            )?;
        }

        let failure_style = if s.link_failures > 0 { warn } else { Style::new() };
        writeln!(
            w,
            "  Link failures:      {}",
            s.link_failures.paint(failure_style)
        )?;
        if s.sources_lost > 0 {
            writeln!(w, "  Sources lost:       {}", s.sources_lost.paint(bad))?;
        }

        let verb = if self.dry_run {
            "Reclaimable"
        } else {
            "Reclaimed"
        };
        let label = format!("{}:", verb);
        writeln!(
            w,
            "  {:<20}{}",
            label,
            ByteSize::b(s.bytes_reclaimed).to_string().paint(good)
        )?;
        Ok(())
    }
}
