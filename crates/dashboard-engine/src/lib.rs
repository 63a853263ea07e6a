//! Dashboard rule engine: the type lattice, catalog adapter, reference
//! resolver, dimension binder, overload resolver, template substituter,
//! and card expander (components C1-C8).

pub mod access;
pub mod binder;
pub mod catalog;
pub mod expander;
pub mod lattice;
pub mod overload;
pub mod reference;
pub mod rule_select;
pub mod template;

pub use access::{AccessPolicy, AllowAll, CurrentUserPermissions};
pub use binder::{bind_all_dimensions, bind_dimension, is_numeric_key, merge_dimension_bindings, GaDimensions};
pub use catalog::{fields_of, link_only, linked_tables, tables_of_type, Catalog, CatalogError};
pub use expander::expand_card;
pub use lattice::TypeLattice;
pub use overload::{def_score, is_applicable, resolve_all, resolve_overload};
pub use reference::{resolve, Entity, TemplateType};
pub use rule_select::{best_matching_rule, entity_ref_candidates, resolve_entity_ref};
pub use template::{referenced_dimensions, substitute_string, substitute_structured, BoundEntity, Bindings};
