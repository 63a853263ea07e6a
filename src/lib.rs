//! Automatic analytical dashboard generation.
//!
//! Ties the rule-selection/dimension-binding/card-expansion engine in
//! `dashboard_engine` together with the external collaborators (rule
//! library, renderer) and error handling a full deployment needs.

pub mod error;
pub mod orchestrator;
pub mod renderer;
pub mod rule_library;

pub use error::{DashboardError, NoDashboard};
pub use orchestrator::generate_dashboard;
pub use renderer::{DashboardId, DashboardMetadata, DashboardRenderer, RecordingRenderer};
pub use rule_library::{load_ga_dimensions, RuleLibrary, StaticRuleLibrary, YamlRuleLibrary};
