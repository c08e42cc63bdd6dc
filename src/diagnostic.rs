use crate::span::Pos;

/// A rendered report: severity, message, position, optional notes.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub pos: Pos,
    pub notes: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Error,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, pos: Pos) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            pos,
            notes: Vec::new(),
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Render the diagnostic to stderr using ariadne, labeling the
    /// offending position within `source`.
    pub fn render(&self, source: &str) {
        use ariadne::{Color, Label, Report, ReportKind, Source};

        let offset = byte_offset(source, self.pos.line, self.pos.column);
        let filename = self.pos.source.to_string();

        let mut report = Report::build(ReportKind::Error, filename.clone(), offset)
            .with_message(&self.message)
            .with_label(
                Label::new((filename.clone(), offset..offset + 1))
                    .with_message(&self.message)
                    .with_color(Color::Red),
            );

        for note in &self.notes {
            report = report.with_note(note);
        }

        report
            .finish()
            .eprint((filename, Source::from(source)))
            .ok();
    }
}

/// Translate a 1-based (line, column) into a byte offset into `source`.
fn byte_offset(source: &str, line: u32, column: u32) -> usize {
    let mut offset = 0;
    for (i, l) in source.split('\n').enumerate() {
        if (i as u32) + 1 == line {
            return offset + (column.saturating_sub(1)) as usize;
        }
        offset += l.len() + 1;
    }
    offset
}
