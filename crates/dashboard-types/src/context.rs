use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{DatabaseId, DefDef, DimensionDef, Field, FieldId, Rule, Table};

/// A field candidate once it has matched a dimension's predicate pack,
/// carrying the table's `link` annotation forward (§3: "each of which
/// carries a back-pointer `link` copied from its table").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundField {
    pub field: Field,
    pub link: Option<FieldId>,
}

/// A dimension after binding (§4.4): its declaration plus every field
/// that matched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedDimension {
    pub definition: DimensionDef,
    pub matches: Vec<BoundField>,
}

impl ResolvedDimension {
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// The per-run binding environment (§3). Constructed once by the
/// orchestrator (C9) and shared read-only by C5-C8 thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub root_table: Table,
    pub rule: Rule,
    pub tables: Vec<Table>,
    pub database_id: DatabaseId,
    #[serde(default)]
    pub dimensions: HashMap<String, ResolvedDimension>,
    #[serde(default)]
    pub metrics: HashMap<String, DefDef>,
    #[serde(default)]
    pub filters: HashMap<String, DefDef>,
}

impl Context {
    pub fn new(root_table: Table, rule: Rule, tables: Vec<Table>, database_id: DatabaseId) -> Self {
        Self {
            root_table,
            rule,
            tables,
            database_id,
            dimensions: HashMap::new(),
            metrics: HashMap::new(),
            filters: HashMap::new(),
        }
    }
}
