//! The dashboard renderer collaborator (§6).

use dashboard_types::InstantiatedCard;
use uuid::Uuid;

use crate::error::DashboardError;

/// Presentation metadata for the dashboard as a whole, already
/// substituted (§4.9 step 4).
#[derive(Debug, Clone)]
pub struct DashboardMetadata {
    pub title: String,
    pub description: String,
}

/// Opaque handle returned by the renderer collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardId(pub Uuid);

/// `create_dashboard(metadata, cards) -> dashboard_id` (§6). Persistence,
/// authorization, and actual rendering all live on the other side of
/// this trait - out of scope here (§1).
pub trait DashboardRenderer {
    fn create_dashboard(
        &self,
        metadata: DashboardMetadata,
        cards: Vec<InstantiatedCard>,
    ) -> Result<DashboardId, DashboardError>;
}

/// A renderer double for tests: just records what it was given.
#[derive(Default)]
pub struct RecordingRenderer {
    pub calls: std::sync::Mutex<Vec<(DashboardMetadata, Vec<InstantiatedCard>)>>,
}

impl DashboardRenderer for RecordingRenderer {
    fn create_dashboard(
        &self,
        metadata: DashboardMetadata,
        cards: Vec<InstantiatedCard>,
    ) -> Result<DashboardId, DashboardError> {
        let id = DashboardId(Uuid::new_v4());
        self.calls.lock().unwrap().push((metadata, cards));
        Ok(id)
    }
}
