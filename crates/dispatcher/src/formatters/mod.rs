//! Formatter implementations
//!
//! Contains PlainFormatter and JsonFormatter, plus the swappable cell the
//! worker reads its formatter from.

mod json;
mod plain;

pub use self::json::JsonFormatter;
pub use self::plain::PlainFormatter;

use std::sync::Arc;

use contracts::{Formatter, FormatterKind};
use parking_lot::RwLock;

/// Build the formatter named by configuration
pub fn create_formatter(kind: FormatterKind) -> Arc<dyn Formatter> {
    match kind {
        FormatterKind::Plain => Arc::new(PlainFormatter::new()),
        FormatterKind::Json => Arc::new(JsonFormatter::new()),
    }
}

/// Formatter handle shared by the dispatcher and its worker
///
/// Replacing it is last-writer-wins; a record already handed the previous
/// `Arc` finishes with that formatter.
pub(crate) struct SharedFormatter {
    current: RwLock<Arc<dyn Formatter>>,
}

impl SharedFormatter {
    pub(crate) fn new(formatter: Arc<dyn Formatter>) -> Self {
        Self {
            current: RwLock::new(formatter),
        }
    }

    pub(crate) fn current(&self) -> Arc<dyn Formatter> {
        Arc::clone(&self.current.read())
    }

    pub(crate) fn replace(&self, formatter: Arc<dyn Formatter>) -> Arc<dyn Formatter> {
        std::mem::replace(&mut *self.current.write(), formatter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{Level, LogRecord};

    #[test]
    fn test_replace_swaps_formatter() {
        let shared = SharedFormatter::new(create_formatter(FormatterKind::Plain));
        let mut record = LogRecord::new("app", Level::Info, "hello");

        shared.current().format(&mut record).unwrap();
        assert!(!record.formatted.starts_with('{'));

        shared.replace(create_formatter(FormatterKind::Json));
        shared.current().format(&mut record).unwrap();
        assert!(record.formatted.starts_with('{'));
    }
}
