use serde::{Deserialize, Serialize};

use crate::{StructuredQuery, Visualization};

/// One materialized card instance: a concrete query plus presentation
/// metadata, produced by the card expander (C8) for a single candidate
/// binding combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstantiatedCard {
    pub card_id: String,
    pub title: String,
    pub description: String,
    pub visualization: Visualization,
    pub query: StructuredQuery,
    pub score: f64,
}
