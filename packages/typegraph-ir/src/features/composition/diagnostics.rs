//! Advisory diagnostics emitted during composition
//!
//! Resolution failures are represented in-band (`None` bindings). The conditions
//! below are the only ones worth telling a user about; none of them changes the
//! shape of the composed output.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A bare name matched more than one type across the visible modules
    AmbiguousReference {
        name: String,
        candidates: Vec<String>,
    },

    /// An extension whose base type is not part of the input
    UnknownExtension {
        name: String,
        inherited_types: Vec<String>,
    },

    /// Typealiases that point at each other
    CyclicTypealias { chain: Vec<String> },

    /// A base type matched more than one module under strict conformance lookup
    AmbiguousConformance {
        type_name: String,
        base: String,
        candidates: Vec<String>,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::AmbiguousReference { name, candidates } => write!(
                f,
                "Ambiguous type {name}, found {}. Specify module name at declaration site to disambiguate.",
                candidates.join(", ")
            ),
            Diagnostic::UnknownExtension {
                name,
                inherited_types,
            } => {
                let clause = if inherited_types.is_empty() {
                    String::new()
                } else {
                    format!(": {}", inherited_types.join(", "))
                };
                write!(
                    f,
                    "Found \"extension {name}{clause}\" of type for which there is no original type declaration information."
                )
            }
            Diagnostic::CyclicTypealias { chain } => {
                write!(f, "Cyclic typealias chain {}", chain.join(" -> "))
            }
            Diagnostic::AmbiguousConformance {
                type_name,
                base,
                candidates,
            } => write!(
                f,
                "Ambiguous base type {base} of {type_name}, found {}",
                candidates.join(", ")
            ),
        }
    }
}

/// Receiver for diagnostics, threaded through every resolver
pub trait DiagnosticsSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Accumulates diagnostics in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }

    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Sorted, de-duplicated diagnostics
    pub fn into_sorted(self) -> Vec<Diagnostic> {
        let mut diagnostics = self.diagnostics.into_inner();
        diagnostics.sort();
        diagnostics.dedup();
        diagnostics
    }
}

impl DiagnosticsSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }
}

/// Forwards every diagnostic to `tracing::warn!`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        tracing::warn!(target: "typegraph::composition", "{}", diagnostic);
    }
}

/// Collects locally and forwards to an optional caller sink
pub(crate) struct Reporter<'a> {
    collected: CollectingSink,
    downstream: Option<&'a dyn DiagnosticsSink>,
}

impl<'a> Reporter<'a> {
    pub(crate) fn new(downstream: Option<&'a dyn DiagnosticsSink>) -> Self {
        Self {
            collected: CollectingSink::new(),
            downstream,
        }
    }

    pub(crate) fn into_sorted(self) -> Vec<Diagnostic> {
        self.collected.into_sorted()
    }
}

impl DiagnosticsSink for Reporter<'_> {
    fn report(&self, diagnostic: Diagnostic) {
        if let Some(downstream) = self.downstream {
            downstream.report(diagnostic.clone());
        }
        self.collected.report(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let ambiguous = Diagnostic::AmbiguousReference {
            name: "Widget".to_string(),
            candidates: vec!["M1.Widget".to_string(), "M2.Widget".to_string()],
        };
        assert_eq!(
            ambiguous.to_string(),
            "Ambiguous type Widget, found M1.Widget, M2.Widget. Specify module name at declaration site to disambiguate."
        );

        let unknown = Diagnostic::UnknownExtension {
            name: "Ghost".to_string(),
            inherited_types: vec!["Equatable".to_string()],
        };
        assert!(unknown.to_string().contains("extension Ghost: Equatable"));
    }

    #[test]
    fn test_collecting_sink_sorts_and_dedups() {
        let sink = CollectingSink::new();
        let cyclic = Diagnostic::CyclicTypealias {
            chain: vec!["A".to_string(), "B".to_string(), "A".to_string()],
        };
        let unknown = Diagnostic::UnknownExtension {
            name: "Ghost".to_string(),
            inherited_types: Vec::new(),
        };
        sink.report(unknown.clone());
        sink.report(cyclic.clone());
        sink.report(unknown.clone());
        assert_eq!(sink.len(), 3);

        assert_eq!(sink.into_sorted(), vec![unknown, cyclic]);
    }

    #[test]
    fn test_reporter_forwards() {
        let downstream = CollectingSink::new();
        let reporter = Reporter::new(Some(&downstream));
        reporter.report(Diagnostic::CyclicTypealias {
            chain: vec!["A".to_string()],
        });
        assert_eq!(downstream.len(), 1);
        assert_eq!(reporter.into_sorted().len(), 1);
    }
}
