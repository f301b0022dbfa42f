//! Terminal overlay renderer for faultline.
//!
//! Reference implementation of the `Overlay` trait: draws the unresolved
//! records as a bordered table on any writer, prints detail blocks for
//! expanded rows, and keeps copied stacks in an inspectable buffer so the
//! host can bridge them to a real clipboard. Styling is applied only when
//! the sink is a terminal.

use std::io::{self, Stderr, Write};

use owo_colors::OwoColorize;

use faultline::{ErrorKind, ErrorRecord, Overlay, StackLocation};

/// Horizontal rule used between table sections.
const HR: &str =
    "────────────────────────────────────────────────────────────────────────";

/// Widest message the table shows before truncating.
const MESSAGE_WIDTH: usize = 48;

/// Console overlay writing to an arbitrary sink.
pub struct ConsoleOverlay<W: Write + Send> {
    out: W,
    styled: bool,
    visible: bool,
    copied: Vec<String>,
}

impl ConsoleOverlay<Stderr> {
    /// Overlay on stderr, styled when stderr is a TTY.
    pub fn stderr() -> Self {
        let styled = atty::is(atty::Stream::Stderr);
        Self::with_style(io::stderr(), styled)
    }
}

impl<W: Write + Send> ConsoleOverlay<W> {
    /// Unstyled overlay on `out`. Tests render into a `Vec<u8>`.
    pub fn new(out: W) -> Self {
        Self::with_style(out, false)
    }

    pub fn with_style(out: W, styled: bool) -> Self {
        Self {
            out,
            styled,
            visible: false,
            copied: Vec::new(),
        }
    }

    /// Stacks the user asked to copy, oldest first.
    pub fn copied(&self) -> &[String] {
        &self.copied
    }

    /// Consume the overlay and hand back the sink, for buffer inspection.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn kind_label(&self, kind: ErrorKind) -> String {
        let label = kind.to_string();
        if !self.styled {
            return label;
        }
        match kind {
            ErrorKind::Exception => label.red().to_string(),
            ErrorKind::UnhandledRejection => label.yellow().to_string(),
            ErrorKind::FetchError => label.magenta().to_string(),
            ErrorKind::Unspecified => label.dimmed().to_string(),
        }
    }

    fn draw(&mut self, view: &[&ErrorRecord]) -> io::Result<()> {
        writeln!(self.out, "{HR}")?;
        if view.is_empty() {
            writeln!(self.out, "  no unresolved errors")?;
            writeln!(self.out, "{HR}")?;
            return Ok(());
        }

        writeln!(
            self.out,
            "  {:<3} {:<20} {:<width$} location",
            "#",
            "kind",
            "message",
            width = MESSAGE_WIDTH
        )?;
        for (index, record) in view.iter().enumerate() {
            let kind = self.kind_label(record.kind);
            let message = console::truncate_str(&record.message, MESSAGE_WIDTH, "…");
            writeln!(
                self.out,
                "  {:<3} {:<20} {:<width$} {}:{}",
                index,
                kind,
                message,
                record.url,
                record.line,
                width = MESSAGE_WIDTH
            )?;
        }
        writeln!(self.out, "{HR}")?;
        Ok(())
    }
}

impl<W: Write + Send> Overlay for ConsoleOverlay<W> {
    fn render(&mut self, view: &[&ErrorRecord]) {
        if !self.visible {
            return;
        }
        // A broken sink must never take the host down with it.
        let _ = self.draw(view);
    }

    fn show(&mut self) {
        self.visible = true;
        let _ = writeln!(self.out, "── error console ──");
    }

    fn hide(&mut self) {
        self.visible = false;
        let _ = writeln!(self.out, "── error console hidden ──");
    }

    fn toggle_details(&mut self, index: usize, location: &StackLocation) {
        let _ = writeln!(
            self.out,
            "  [{index}] url: {}  line: {}  column: {}",
            location.url, location.line, location.column
        );
    }

    fn copy_stack(&mut self, stack: &str) {
        if stack.is_empty() {
            return;
        }
        self.copied.push(stack.to_string());
        let _ = writeln!(self.out, "  stack copied ({} chars)", stack.len());
    }
}
