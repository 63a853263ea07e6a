use serde::{Deserialize, Serialize};

use crate::{FieldId, SemanticType, TableId};

/// A column in a table, as seen by the catalog adapter (C2).
///
/// Read-only for the duration of a single dashboard generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: FieldId,
    pub table_id: TableId,
    pub display_name: String,
    pub internal_name: String,
    pub base_type: SemanticType,
    pub special_type: Option<SemanticType>,
    pub fk_target_field_id: Option<FieldId>,
}

impl Field {
    pub fn new(
        id: FieldId,
        table_id: TableId,
        display_name: impl Into<String>,
        internal_name: impl Into<String>,
        base_type: SemanticType,
    ) -> Self {
        Self {
            id,
            table_id,
            display_name: display_name.into(),
            internal_name: internal_name.into(),
            base_type,
            special_type: None,
            fk_target_field_id: None,
        }
    }

    pub fn with_special_type(mut self, special_type: SemanticType) -> Self {
        self.special_type = Some(special_type);
        self
    }

    pub fn with_fk_target(mut self, target: FieldId) -> Self {
        self.fk_target_field_id = Some(target);
        self
    }

    /// `internal_name` compared case-insensitively, as used by the
    /// numeric-key invariant and "GA dimension" exact-name matching.
    pub fn name_eq_ignore_case(&self, other: &str) -> bool {
        self.internal_name.eq_ignore_ascii_case(other)
    }
}
