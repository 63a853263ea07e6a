//! Dashboard Types - Level 1 Foundation Types
//!
//! Pure data structures for the automatic dashboard generation engine:
//! semantic types, fields, tables, the rule model, and the structured
//! query AST. No business logic lives here beyond constructors and
//! trivial accessors.
//!
//! ## Architecture Level: LEVEL 1 (Foundation)
//!
//! Every other crate in this workspace depends on this one; this crate
//! depends on nothing in the workspace. Keep it that way - the type
//! lattice, dimension binder, and card expander all build on top of
//! these types without this crate knowing about any of them.

mod context;
mod field;
mod ids;
mod instantiated;
mod query;
mod rule;
mod semantic_type;
mod table;

pub use context::{BoundField, Context, ResolvedDimension};
pub use field::Field;
pub use ids::{DatabaseId, FieldId, TableId};
pub use instantiated::InstantiatedCard;
pub use query::{
    Direction, NativeQuery, OrderBy, QueryForm, Reference, StructuredQuery, StructuredQueryBody,
    TemporalUnit,
};
pub use rule::{
    CardSpec, DefDef, DimensionDef, FieldTypeSpec, OrderedMap, Rule, TemplateExpr, Visualization,
};
pub use semantic_type::SemanticType;
pub use table::Table;
