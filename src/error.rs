//! Error handling for the dashboard generation orchestrator.

use thiserror::Error;

use dashboard_engine::CatalogError;
use dashboard_types::TableId;

/// Top-level error kinds (§7). Catalog failures propagate unchanged via
/// `#[from]`; the other two name the orchestrator's own "empty result"
/// paths are *not* errors (see `orchestrate`) - this enum only covers
/// genuine failures.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("catalog adapter failed: {0}")]
    Catalog(#[from] CatalogError),

    #[error("rule library failed to load: {0}")]
    RuleLibrary(String),

    #[error("dashboard renderer failed: {0}")]
    RenderFailed(String),
}

/// Why no dashboard was produced - distinct from `DashboardError`,
/// because "no applicable rule" and "every card was empty or denied"
/// are expected, silent outcomes (§7), not failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoDashboard {
    NoApplicableRule { table_id: TableId },
    NoSurvivingCards,
}

impl std::fmt::Display for NoDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NoDashboard::NoApplicableRule { table_id } => {
                write!(f, "no rule applies to table {table_id}")
            }
            NoDashboard::NoSurvivingCards => write!(f, "no card instantiation survived"),
        }
    }
}
