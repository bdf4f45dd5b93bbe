//! Fidelity tracking - know what was substituted or dropped while reading.

/// Result of a conversion step, including warnings about recovered problems.
#[derive(Debug)]
pub struct ConversionResult<T> {
    /// The conversion output.
    pub value: T,
    /// Problems that were recovered from instead of failing.
    pub warnings: Vec<Warning>,
}

impl<T> ConversionResult<T> {
    /// Create a successful result with no warnings.
    pub fn ok(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Create a result with warnings.
    pub fn with_warnings(value: T, warnings: Vec<Warning>) -> Self {
        Self { value, warnings }
    }

    /// Check if there are any warnings.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Transform the value, keeping the warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ConversionResult<U> {
        ConversionResult {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

/// A recovered problem.
#[derive(Debug, Clone, PartialEq)]
pub struct Warning {
    pub severity: Severity,
    pub kind: WarningKind,
    /// Human-readable message.
    pub message: String,
}

impl Warning {
    /// Create a new warning and log it.
    pub fn new(severity: Severity, kind: WarningKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match severity {
            Severity::Info => tracing::debug!(?kind, "{message}"),
            Severity::Minor | Severity::Major => tracing::warn!(?kind, "{message}"),
        }
        Self {
            severity,
            kind,
            message,
        }
    }
}

/// Severity of a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Information only, nothing lost.
    Info,
    /// Rendering may differ slightly from upstream.
    Minor,
    /// Content was replaced or dropped.
    Major,
}

/// Kind of recovered problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarningKind {
    /// Block type not supported, replaced by a placeholder.
    UnimplementedBlock(String),
    /// Text subtype not supported, rendered as plain text.
    UnknownSubtype(String),
    /// Formatting kind not supported; HTML rendering of this block will fail.
    UnknownFormatting(String),
    /// Layout entry type not supported, dropped.
    UnknownLayout(String),
    /// Layout referenced a block index that does not exist, dropped.
    LayoutIndexOutOfRange(usize),
    /// Optional field had an unexpected shape, ignored.
    IgnoredField(String),
}
