use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::query::QueryForm;

/// An insertion-ordered identifier -> value map.
///
/// `Rule.dimensions` and `Rule.cards` need their declaration order
/// preserved (card output order and dimension binding order both feed
/// determinism, §8 property 8), which a `HashMap` can't give us. A real
/// ordered map crate would be overkill for this; a `Vec` of pairs with
/// linear lookup is exactly as much structure as the spec needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderedMap<V>(pub Vec<(String, V)>);

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        self.0.push((key.into(), value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &V)> {
        self.0.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.iter().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Which table a dimension's field-type refers to: the root table, or a
/// table linked to it by foreign key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldTypeSpec {
    /// `[field-type]` - match directly against the root table's fields.
    Root(String),
    /// `[table-type, field-type]` - match fields of any linked table
    /// whose `entity_type` is-a `table_type`.
    Linked { table_type: String, field_type: String },
}

impl FieldTypeSpec {
    /// The field-spec half, used against the predicate pack regardless
    /// of whether this is rooted or linked.
    pub fn field_spec(&self) -> &str {
        match self {
            FieldTypeSpec::Root(f) => f,
            FieldTypeSpec::Linked { field_type, .. } => field_type,
        }
    }
}

/// A dimension placeholder as declared in a rule, before binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionDef {
    pub field_type: FieldTypeSpec,
    #[serde(default)]
    pub named: Option<String>,
    #[serde(default)]
    pub links_to: Option<String>,
    pub score: u32,
}

/// One overloaded metric or filter definition. `metrics` and `filters`
/// share this shape (§3): a template expression plus a score, applicable
/// only when every dimension it mentions has bound matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefDef {
    pub template: TemplateExpr,
    pub score: u32,
}

/// A metric/filter's expression: either a structured-query fragment or a
/// native-SQL string carrying `[[id]]` placeholders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateExpr {
    Structured(QueryForm),
    Native(String),
}

/// A chart's visualization hints. Mostly opaque (per §3), except the two
/// key paths the card expander resolves against bound dimensions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Visualization {
    #[serde(default, rename = "map.latitude_column")]
    pub map_latitude_column: Option<String>,
    #[serde(default, rename = "map.longitude_column")]
    pub map_longitude_column: Option<String>,
    #[serde(flatten)]
    pub other: HashMap<String, serde_json::Value>,
}

/// One card specification (§3): what it needs bound, how it's scored,
/// and its presentation metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardSpec {
    #[serde(default)]
    pub metrics: Vec<String>,
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(default)]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub order_by: Vec<(String, crate::query::Direction)>,
    pub score: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub visualization: Visualization,
}

/// An in-memory rule (§3), immutable for the duration of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub table_type: String,
    #[serde(default)]
    pub dimensions: OrderedMap<DimensionDef>,
    #[serde(default)]
    pub metrics: HashMap<String, Vec<DefDef>>,
    #[serde(default)]
    pub filters: HashMap<String, Vec<DefDef>>,
    #[serde(default)]
    pub cards: OrderedMap<CardSpec>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub max_score: u32,
}
