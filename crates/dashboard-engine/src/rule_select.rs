//! §4.8: best-matching rule selection, and entity-reference resolution
//! (`->entity`, §6) shared by the template substituter and card expander.

use dashboard_types::{Context, Rule, Table};

use crate::lattice::TypeLattice;

/// Among `rules`, retain those applicable to `root_entity_type` (the
/// rule's `table_type` is an ancestor of it), then pick the most
/// specific one (longest ancestor chain). Ties broken by keeping the
/// first candidate encountered, for determinism (§8 property 2).
pub fn best_matching_rule<'a>(
    root_entity_type: &dashboard_types::SemanticType,
    rules: &'a [Rule],
    lattice: &TypeLattice,
) -> Option<&'a Rule> {
    rules
        .iter()
        .filter(|r| lattice.is_a(root_entity_type, &r.table_type.clone().into()))
        .fold(None, |best, r| {
            let count = lattice.ancestor_count(&r.table_type.clone().into());
            match &best {
                Some((best_count, _)) if *best_count >= count => best,
                _ => Some((count, r)),
            }
        })
        .map(|(_, r)| r)
}

/// Resolve an entity-reference identifier (`"this"`, a semantic-type
/// name, or historically `"GenericTable"`) against the tables available
/// in `context`. `"this"` always means the root table; anything else is
/// treated as a table-type name and matched by `is_a` against context
/// tables, taking the first match.
pub fn resolve_entity_ref<'a>(
    name: &str,
    context: &'a Context,
    lattice: &TypeLattice,
) -> Option<&'a Table> {
    if name == "this" {
        return Some(&context.root_table);
    }
    let table_type = name.into();
    context
        .tables
        .iter()
        .find(|t| lattice.is_a(&t.entity_type, &table_type))
}

/// All tables in `context` matching an entity-reference table-type, used
/// by the card expander when a "used dimension" is itself an entity
/// reference rather than a bound dimension identifier (§4.7 step 5).
pub fn entity_ref_candidates<'a>(
    name: &str,
    context: &'a Context,
    lattice: &TypeLattice,
) -> Vec<&'a Table> {
    if name == "this" {
        return vec![&context.root_table];
    }
    let table_type = name.into();
    context
        .tables
        .iter()
        .filter(|t| lattice.is_a(&t.entity_type, &table_type))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_types::{DatabaseId, OrderedMap, SemanticType, TableId};

    fn rule(table_type: &str, max_score: u32) -> Rule {
        Rule {
            table_type: table_type.to_string(),
            dimensions: OrderedMap::new(),
            metrics: Default::default(),
            filters: Default::default(),
            cards: OrderedMap::new(),
            title: String::new(),
            description: String::new(),
            max_score,
        }
    }

    #[test]
    fn picks_most_specific_applicable_rule() {
        let mut lattice = TypeLattice::new();
        lattice.declare("Orders", "Generic");

        let generic = rule("Generic", 100);
        let orders = rule("Orders", 100);
        let rules = vec![generic, orders.clone()];

        let chosen = best_matching_rule(&SemanticType::from("Orders"), &rules, &lattice).unwrap();
        assert_eq!(chosen.table_type, "Orders");
    }

    #[test]
    fn tie_on_ancestor_count_keeps_first_candidate() {
        let lattice = TypeLattice::new();
        let first = rule("Orders", 10);
        let second = rule("Orders", 20);
        let rules = vec![first, second];

        let chosen = best_matching_rule(&SemanticType::from("Orders"), &rules, &lattice).unwrap();
        assert_eq!(chosen.max_score, 10);
    }

    #[test]
    fn no_applicable_rule_returns_none() {
        let lattice = TypeLattice::new();
        let rules = vec![rule("Customers", 100)];
        assert!(best_matching_rule(&SemanticType::from("Orders"), &rules, &lattice).is_none());
    }

    #[test]
    fn this_resolves_to_root_table() {
        let db = DatabaseId::new();
        let root = Table::new(TableId::new(), db, "Orders", "orders", "Orders".into());
        let rule = rule("Orders", 100);
        let context = Context::new(root.clone(), rule, vec![root.clone()], db);
        let lattice = TypeLattice::new();
        let resolved = resolve_entity_ref("this", &context, &lattice).unwrap();
        assert_eq!(resolved.id, root.id);
    }
}
