//! Diagnostics channel for numerical and configuration notices.
//!
//! Model sets report recoverable events (a geometry replaced, a non-finite
//! value zeroed, an fdm edge case short-circuited) to an injectable
//! [`DiagnosticsSink`] instead of process-wide logging state. The default
//! [`TracingSink`] forwards to `tracing`; [`MemorySink`] keeps them for
//! inspection.

use std::fmt;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Severity of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DiagnosticLevel {
    Debug,
    Info,
    Warn,
}

/// Category of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// A geometry component replaced an existing one
    GeometryOverwritten,

    /// A non-finite value was zeroed before aggregation
    NonFiniteZeroed,

    /// An fdm inversion returned a sentinel without solving
    FdmEdgeCase,

    /// A forced, unverified bracket was used in a root search
    BracketFallback,

    /// Summary of an adiabatic contraction solve
    AdiabaticContraction,
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DiagnosticKind::GeometryOverwritten => "geometry_overwritten",
            DiagnosticKind::NonFiniteZeroed => "non_finite_zeroed",
            DiagnosticKind::FdmEdgeCase => "fdm_edge_case",
            DiagnosticKind::BracketFallback => "bracket_fallback",
            DiagnosticKind::AdiabaticContraction => "adiabatic_contraction",
        };
        f.write_str(name)
    }
}

/// One reported event
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub level: DiagnosticLevel,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(level: DiagnosticLevel, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            level,
            kind,
            message: message.into(),
        }
    }

    pub fn warn(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Warn, kind, message)
    }

    pub fn info(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Info, kind, message)
    }

    pub fn debug(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self::new(DiagnosticLevel::Debug, kind, message)
    }
}

/// Receiver of diagnostics
pub trait DiagnosticsSink: fmt::Debug + Send + Sync {
    fn emit(&self, diagnostic: Diagnostic);
}

/// Forwards diagnostics to `tracing` at their level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn emit(&self, diagnostic: Diagnostic) {
        let kind = diagnostic.kind.to_string();
        match diagnostic.level {
            DiagnosticLevel::Debug => debug!(kind = %kind, "{}", diagnostic.message),
            DiagnosticLevel::Info => info!(kind = %kind, "{}", diagnostic.message),
            DiagnosticLevel::Warn => warn!(kind = %kind, "{}", diagnostic.message),
        }
    }
}

/// Collects diagnostics in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of diagnostics of the given kind
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .iter()
            .filter(|d| d.kind == kind)
            .count()
    }

    pub fn clear(&self) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl DiagnosticsSink for MemorySink {
    fn emit(&self, diagnostic: Diagnostic) {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(diagnostic);
    }
}
