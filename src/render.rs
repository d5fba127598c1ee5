//! Text rendering of step records.
//!
//! Every step becomes two lines: the state label right-justified, a colon, and the tape
//! symbols concatenated; then a caret under the head.
//!
//! ```text
//!   s1: BB
//!       ^
//! ```

use crate::machine::StepRecord;
use crate::types::{MachineError, Symbol, LABEL_WIDTH};
use std::fmt::Write;

/// Formats step records as two-line text blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceRenderer {
    /// Width the state label is right-justified to.
    pub label_width: usize,
    /// Prefix the first line of each block with the step index.
    pub numbered: bool,
}

impl Default for TraceRenderer {
    fn default() -> Self {
        Self {
            label_width: LABEL_WIDTH,
            numbered: false,
        }
    }
}

impl TraceRenderer {
    pub fn numbered(self) -> Self {
        Self {
            numbered: true,
            ..self
        }
    }

    /// Renders one step as two lines joined by `\n`, without a trailing newline.
    ///
    /// The caret sits `head` columns right of a fixed margin of the label width plus 2,
    /// whatever the length of `state`.
    pub fn render<S: Symbol>(&self, index: usize, state: &str, tape: &[S], head: usize) -> String {
        let mut text = String::new();
        let mut margin = self.label_width + 2;
        if self.numbered {
            let _ = write!(text, "{index:>4} ");
            margin += 5;
        }
        let _ = write!(text, "{state:>width$}: ", width = self.label_width);

        for symbol in tape {
            let _ = write!(text, "{symbol}");
        }
        text.push('\n');
        text.push_str(&" ".repeat(margin + head));
        text.push('^');
        text
    }

    pub fn render_record<S: Symbol>(&self, record: &StepRecord<S>) -> String {
        self.render(record.index, &record.state, &record.tape, record.head)
    }

    /// Renders every record of a run, one block per line pair.
    ///
    /// Stops at the first error and returns it.
    pub fn render_all<S, I>(&self, records: I) -> Result<String, MachineError>
    where
        S: Symbol,
        I: IntoIterator<Item = Result<StepRecord<S>, MachineError>>,
    {
        let mut out = String::new();
        for record in records {
            out.push_str(&self.render_record(&record?));
            out.push('\n');
        }
        Ok(out)
    }
}

/// Renders one step with the default layout.
pub fn render<S: Symbol>(index: usize, state: &str, tape: &[S], head: usize) -> String {
    TraceRenderer::default().render(index, state, tape, head)
}
