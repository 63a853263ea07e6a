use serde::{Deserialize, Serialize};

use crate::{DatabaseId, FieldId, SemanticType, TableId};

/// A table, as seen by the catalog adapter (C2).
///
/// `link` is a transient annotation: when this table was reached by
/// following a foreign key off the root table, it records which field on
/// the root table that was. It is `None` for the root table itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub display_name: String,
    pub internal_name: String,
    pub database_id: DatabaseId,
    pub entity_type: SemanticType,
    pub link: Option<FieldId>,
}

impl Table {
    pub fn new(
        id: TableId,
        database_id: DatabaseId,
        display_name: impl Into<String>,
        internal_name: impl Into<String>,
        entity_type: SemanticType,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            internal_name: internal_name.into(),
            database_id,
            entity_type,
            link: None,
        }
    }

    pub fn with_link(mut self, link: FieldId) -> Self {
        self.link = Some(link);
        self
    }
}
