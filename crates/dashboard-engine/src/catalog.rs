//! C2: read-only view over the schema.

use thiserror::Error;

use dashboard_types::{Field, FieldId, Table, TableId};

use crate::lattice::TypeLattice;

/// Failures the catalog-adapter collaborator can surface. Propagated to
/// the caller unchanged (§7).
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown table: {0}")]
    UnknownTable(TableId),
    #[error("unknown field: {0}")]
    UnknownField(FieldId),
    #[error("catalog backend error: {0}")]
    Backend(String),
}

/// Minimum capabilities a catalog adapter collaborator must provide
/// (§6): field/table lookup and FK-graph traversal.
pub trait Catalog {
    fn select_fields(&self, table_id: TableId) -> Result<Vec<Field>, CatalogError>;
    fn select_table(&self, table_id: TableId) -> Result<Table, CatalogError>;
    fn select_field(&self, field_id: FieldId) -> Result<Field, CatalogError>;
}

/// All fields of a table (C2).
pub fn fields_of(catalog: &dyn Catalog, table_id: TableId) -> Result<Vec<Field>, CatalogError> {
    catalog.select_fields(table_id)
}

/// For each field of `root` with a non-null `fk_target_field_id`, yield
/// the target field's owning table, annotated with the field that links
/// to it. Multiple FKs to the same table yield multiple distinct
/// annotated entries - they are not deduplicated.
pub fn linked_tables(catalog: &dyn Catalog, root: &Table) -> Result<Vec<Table>, CatalogError> {
    let mut linked = Vec::new();
    for field in fields_of(catalog, root.id)? {
        if let Some(target_field_id) = field.fk_target_field_id {
            let target_field = catalog.select_field(target_field_id)?;
            let target_table = catalog.select_table(target_field.table_id)?;
            linked.push(target_table.with_link(field.id));
        }
    }
    Ok(linked)
}

/// True when every field of `table` has a `special_type` that is-a `PK`
/// or `FK`. A table with no fields at all also returns true - there is
/// no field to fail the check against, so vacuously every field (zero of
/// them) satisfies it. This mirrors the documented Clojure behavior this
/// rule is ported from, where the "all fields match" scan over an empty
/// sequence is truthy; a table with genuinely zero fields is therefore
/// link-only by this definition even though it isn't really a join
/// table. Null `special_type` is explicitly non-matching (not an error,
/// not a wildcard) - see S5.
pub fn link_only(
    catalog: &dyn Catalog,
    lattice: &TypeLattice,
    table: &Table,
) -> Result<bool, CatalogError> {
    let pk = "PK".into();
    let fk = "FK".into();
    Ok(fields_of(catalog, table.id)?.iter().all(|f| match &f.special_type {
        Some(st) => lattice.is_a(st, &pk) || lattice.is_a(st, &fk),
        None => false,
    }))
}

/// All tables in `candidates` whose `entity_type` is-a `table_type`.
/// Used both by the dimension binder (`links_to`) and the card expander
/// (entity-reference candidate sets).
pub fn tables_of_type<'a>(
    table_type: &str,
    lattice: &TypeLattice,
    candidates: &'a [Table],
) -> Vec<&'a Table> {
    let table_type = table_type.into();
    candidates
        .iter()
        .filter(|t| lattice.is_a(&t.entity_type, &table_type))
        .collect()
}
