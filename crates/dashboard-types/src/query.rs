use serde::{Deserialize, Serialize};

use crate::{DatabaseId, FieldId, TableId};

/// Aggregation unit used when wrapping a temporal field reference.
/// `Day` is the default when a dimension doesn't specify one (S4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalUnit {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl Default for TemporalUnit {
    fn default() -> Self {
        TemporalUnit::Day
    }
}

/// Sort direction for a card's `order_by` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Ascending,
    Descending,
}

/// Sum-typed AST for the structured-query fragments the rule engine
/// builds and substitutes into. Kept as an explicit enum (not a generic
/// JSON tree) per the one piece of structure every fragment in this
/// system actually needs: field references, FK hops, datetime wrapping,
/// dimension placeholders pre-substitution, order-by targets, boolean
/// conjunction, and opaque aggregation/filter calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum QueryForm {
    /// `[:field-id id]`
    FieldId(FieldId),
    /// A bare table reference - used when a dimension identifier is
    /// itself an entity reference bound to a whole table rather than a
    /// field (e.g. `[:dimension "this"]`).
    TableRef(TableId),
    /// `[:fk-> link target]`
    FkArrow { link: FieldId, target: FieldId },
    /// `[:datetime-field ref unit]`
    DatetimeField {
        field: Box<QueryForm>,
        unit: TemporalUnit,
    },
    /// `[:dimension "id"]` - a placeholder awaiting substitution (C7).
    Dimension(String),
    /// `[:aggregate-field i]` - an order-by target pointing at the i-th
    /// metric in a card rather than at a dimension.
    AggregateField(usize),
    /// `[:and f1 f2 ...]`
    And(Vec<QueryForm>),
    /// A generic aggregation or filter call, e.g. `["count"]`,
    /// `["sum", <ref>]`, `["=", <ref>, <literal>]`.
    Call(String, Vec<QueryForm>),
    /// An embedded literal value (numbers, strings, booleans) that
    /// passes through substitution unchanged.
    Literal(serde_json::Value),
}

/// One resolved order-by entry: `(direction, target)`.
pub type OrderBy = (Direction, QueryForm);

/// The `query` body of a structured query (§6 query tree format).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StructuredQueryBody {
    pub source_table: Option<TableId>,
    pub filter: Option<QueryForm>,
    pub breakout: Vec<QueryForm>,
    pub aggregation: Vec<QueryForm>,
    pub limit: Option<u64>,
    pub order_by: Vec<OrderBy>,
}

/// A fully materialized query, structured or native, as produced by the
/// card expander (C8) and handed to the renderer collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StructuredQuery {
    Query {
        database: DatabaseId,
        query: StructuredQueryBody,
    },
    Native {
        database: DatabaseId,
        native: NativeQuery,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NativeQuery {
    pub query: String,
}

/// One of the three rendering forms a bound field or table resolves to
/// (C3). `Unknown` models the "unrecognized input passes through
/// unchanged" fallback of §4.3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reference {
    Structured(QueryForm),
    Text(String),
    Native(String),
}

impl Reference {
    pub fn as_structured(&self) -> Option<&QueryForm> {
        match self {
            Reference::Structured(form) => Some(form),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reference::Text(s) | Reference::Native(s) => Some(s),
            _ => None,
        }
    }
}
