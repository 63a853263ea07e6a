//! C5: the dimension binder.
//!
//! For each dimension symbol in a rule, produces the set of matching
//! fields of the root table (or a linked table), applying the
//! not-numeric-key / field-spec / named predicate pack and resolving
//! `links_to` and overload merging.

use std::collections::HashMap;

use dashboard_types::{BoundField, DimensionDef, Field, FieldTypeSpec, ResolvedDimension, Table};
use regex::Regex;

use crate::catalog::{fields_of, tables_of_type, Catalog, CatalogError};
use crate::lattice::TypeLattice;

/// The fixed set of field-specs that must be matched by exact
/// internal-name equality instead of type ancestry (§6). Supplied by
/// the rule loader.
pub trait GaDimensions {
    fn is_ga_dimension(&self, spec: &str) -> bool;
}

impl GaDimensions for std::collections::HashSet<String> {
    fn is_ga_dimension(&self, spec: &str) -> bool {
        self.contains(spec)
    }
}

/// `base_type`/`special_type` is-a `Number`, AND (`special_type` is-a
/// `PK`|`FK`, OR internal name is `"id"`) - numeric keys are ineligible
/// as dimension candidates regardless of rule constraints (§3 invariant).
pub fn is_numeric_key(field: &Field, lattice: &TypeLattice) -> bool {
    let number = "Number".into();
    if !lattice.is_a(&field.base_type, &number) {
        return false;
    }
    let pk_or_fk = field
        .special_type
        .as_ref()
        .map(|st| lattice.is_a(st, &"PK".into()) || lattice.is_a(st, &"FK".into()))
        .unwrap_or(false);
    pk_or_fk || field.name_eq_ignore_case("id")
}

/// The predicate pack (§4.4): field-spec match (literal GA-dimension
/// name, or type ancestry) AND `named` regex, both ANDed with
/// not-numeric-key.
fn matches_predicate_pack(
    field: &Field,
    field_spec: &str,
    named: Option<&str>,
    lattice: &TypeLattice,
    ga: &dyn GaDimensions,
) -> bool {
    if is_numeric_key(field, lattice) {
        return false;
    }

    let field_spec_matches = if ga.is_ga_dimension(field_spec) {
        field.name_eq_ignore_case(field_spec)
    } else {
        let spec_type = field_spec.into();
        field
            .special_type
            .as_ref()
            .map(|st| lattice.is_a(st, &spec_type))
            .unwrap_or(false)
            || lattice.is_a(&field.base_type, &spec_type)
    };
    if !field_spec_matches {
        return false;
    }

    match named {
        Some(pattern) => Regex::new(&format!("(?i){pattern}"))
            .map(|re| re.is_match(&field.internal_name))
            .unwrap_or(false),
        None => true,
    }
}

/// Candidate fields for one dimension definition, before `links_to`
/// filtering (§4.4 steps 2-3).
fn field_candidates(
    def: &DimensionDef,
    root_table: &Table,
    tables: &[Table],
    catalog: &dyn Catalog,
    lattice: &TypeLattice,
    ga: &dyn GaDimensions,
) -> Result<Vec<BoundField>, CatalogError> {
    let field_spec = def.field_type.field_spec();
    match &def.field_type {
        FieldTypeSpec::Root(_) => {
            let candidates = fields_of(catalog, root_table.id)?
                .into_iter()
                .filter(|f| matches_predicate_pack(f, field_spec, def.named.as_deref(), lattice, ga))
                .map(|field| BoundField { field, link: None })
                .collect();
            Ok(candidates)
        }
        FieldTypeSpec::Linked { table_type, .. } => {
            let mut out = Vec::new();
            for table in tables_of_type(table_type, lattice, tables) {
                for field in fields_of(catalog, table.id)? {
                    if matches_predicate_pack(&field, field_spec, def.named.as_deref(), lattice, ga) {
                        out.push(BoundField {
                            field,
                            link: table.link,
                        });
                    }
                }
            }
            Ok(out)
        }
    }
}

/// Bind one dimension definition (§4.4 steps 1-3).
pub fn bind_dimension(
    def: &DimensionDef,
    root_table: &Table,
    tables: &[Table],
    catalog: &dyn Catalog,
    lattice: &TypeLattice,
    ga: &dyn GaDimensions,
) -> Result<Vec<BoundField>, CatalogError> {
    let mut candidates = field_candidates(def, root_table, tables, catalog, lattice, ga)?;

    if let Some(links_to) = &def.links_to {
        let target_table_ids: Vec<_> = tables_of_type(links_to, lattice, tables)
            .into_iter()
            .map(|t| t.id)
            .collect();
        candidates.retain(|bf| match bf.link {
            Some(link_field_id) => {
                // `link` is the id of the FK field on the root table; a
                // match requires some table of the `links_to` type to be
                // the table that field points into. The catalog already
                // resolved that relationship when it built `tables`, so
                // we check whether any matching table's own `link`
                // annotation equals this candidate's link field.
                tables
                    .iter()
                    .any(|t| t.link == Some(link_field_id) && target_table_ids.contains(&t.id))
            }
            None => false,
        });
    }

    Ok(candidates)
}

/// Merge two overloaded bindings for the same dimension identifier
/// (§4.4 "Overload merging"): non-empty beats empty; otherwise keep the
/// higher score, ties broken by keeping the left (first-seen).
pub fn merge_dimension_bindings(
    left: ResolvedDimension,
    right: ResolvedDimension,
) -> ResolvedDimension {
    match (left.matches.is_empty(), right.matches.is_empty()) {
        (true, false) => right,
        (false, true) => left,
        _ => {
            if right.definition.score > left.definition.score {
                right
            } else {
                left
            }
        }
    }
}

/// Bind every dimension identifier in the rule against the context's
/// tables (§4.4, §4.9 step 3). Identifiers that appear more than once in
/// a rule's `dimensions` map are merged with `merge_dimension_bindings`.
pub fn bind_all_dimensions(
    dimensions: &dashboard_types::OrderedMap<DimensionDef>,
    root_table: &Table,
    tables: &[Table],
    catalog: &dyn Catalog,
    lattice: &TypeLattice,
    ga: &dyn GaDimensions,
) -> Result<HashMap<String, ResolvedDimension>, CatalogError> {
    let mut out: HashMap<String, ResolvedDimension> = HashMap::new();
    for (id, def) in dimensions.iter() {
        let matches = bind_dimension(def, root_table, tables, catalog, lattice, ga)?;
        let resolved = ResolvedDimension {
            definition: def.clone(),
            matches,
        };
        match out.remove(id) {
            Some(existing) => out.insert(id.clone(), merge_dimension_bindings(existing, resolved)),
            None => out.insert(id.clone(), resolved),
        };
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_types::{DatabaseId, FieldId, SemanticType, TableId};
    use std::collections::HashSet;

    struct MemCatalog {
        fields: HashMap<TableId, Vec<Field>>,
    }
    impl Catalog for MemCatalog {
        fn select_fields(&self, table_id: TableId) -> Result<Vec<Field>, CatalogError> {
            Ok(self.fields.get(&table_id).cloned().unwrap_or_default())
        }
        fn select_table(&self, id: TableId) -> Result<Table, CatalogError> {
            Err(CatalogError::UnknownTable(id))
        }
        fn select_field(&self, id: FieldId) -> Result<Field, CatalogError> {
            self.fields
                .values()
                .flatten()
                .find(|f| f.id == id)
                .cloned()
                .ok_or(CatalogError::UnknownField(id))
        }
    }

    fn no_ga() -> HashSet<String> {
        HashSet::new()
    }

    #[test]
    fn numeric_key_excluded_from_candidates() {
        let db = DatabaseId::new();
        let root = TableId::new();
        let pk = Field::new(FieldId::new(), root, "Id", "id", SemanticType::from("Number"));
        let amount = Field::new(FieldId::new(), root, "Amount", "amount", "Number".into());
        let mut fields = HashMap::new();
        fields.insert(root, vec![pk, amount.clone()]);
        let catalog = MemCatalog { fields };

        let lattice = TypeLattice::new();
        let root_table = Table::new(root, db, "Orders", "orders", "Orders".into());
        let def = DimensionDef {
            field_type: FieldTypeSpec::Root("Number".to_string()),
            named: None,
            links_to: None,
            score: 100,
        };
        let ga = no_ga();
        let matches = bind_dimension(&def, &root_table, &[], &catalog, &lattice, &ga).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].field.id, amount.id);
    }

    #[test]
    fn two_numeric_fields_both_match_s2() {
        let db = DatabaseId::new();
        let root = TableId::new();
        let a = Field::new(FieldId::new(), root, "A", "a", SemanticType::from("Number"));
        let b = Field::new(FieldId::new(), root, "B", "b", SemanticType::from("Number"));
        let mut fields = HashMap::new();
        fields.insert(root, vec![a, b]);
        let catalog = MemCatalog { fields };
        let lattice = TypeLattice::new();
        let root_table = Table::new(root, db, "Root", "root", "Generic".into());
        let def = DimensionDef {
            field_type: FieldTypeSpec::Root("Number".to_string()),
            named: None,
            links_to: None,
            score: 100,
        };
        let ga = no_ga();
        let matches = bind_dimension(&def, &root_table, &[], &catalog, &lattice, &ga).unwrap();
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn merge_prefers_nonempty_over_empty() {
        let empty = ResolvedDimension {
            definition: DimensionDef {
                field_type: FieldTypeSpec::Root("Number".into()),
                named: None,
                links_to: None,
                score: 10,
            },
            matches: Vec::new(),
        };
        let non_empty = ResolvedDimension {
            definition: DimensionDef {
                field_type: FieldTypeSpec::Root("Number".into()),
                named: None,
                links_to: None,
                score: 5,
            },
            matches: vec![BoundField {
                field: Field::new(FieldId::new(), TableId::new(), "A", "a", "Number".into()),
                link: None,
            }],
        };
        let merged = merge_dimension_bindings(empty, non_empty);
        assert_eq!(merged.matches.len(), 1);
    }

    #[test]
    fn merge_prefers_higher_score_when_both_nonempty() {
        let field_a = BoundField {
            field: Field::new(FieldId::new(), TableId::new(), "A", "a", "Number".into()),
            link: None,
        };
        let low = ResolvedDimension {
            definition: DimensionDef {
                field_type: FieldTypeSpec::Root("Number".into()),
                named: None,
                links_to: None,
                score: 10,
            },
            matches: vec![field_a.clone()],
        };
        let high = ResolvedDimension {
            definition: DimensionDef {
                field_type: FieldTypeSpec::Root("Number".into()),
                named: None,
                links_to: None,
                score: 50,
            },
            matches: vec![field_a],
        };
        let merged = merge_dimension_bindings(low, high);
        assert_eq!(merged.definition.score, 50);
    }
}
