//! C9: the dashboard orchestrator.
//!
//! A pure function from `(root_table, rules, catalog, access policy,
//! current user permissions)` to `(dashboard handle | absent result)`
//! (§5): picks the best rule, drives dimension/metric/filter binding,
//! expands every card, merges identifier collisions, and hands the
//! survivors to the renderer collaborator.

use std::collections::HashMap;

use dashboard_engine::{
    best_matching_rule, bind_all_dimensions, linked_tables, resolve_all, substitute_string,
    AccessPolicy, Bindings, Catalog, CurrentUserPermissions, GaDimensions, TemplateType, TypeLattice,
};
use dashboard_types::{Context, InstantiatedCard, Table};

use crate::error::{DashboardError, NoDashboard};
use crate::renderer::{DashboardMetadata, DashboardId, DashboardRenderer};
use crate::rule_library::RuleLibrary;

/// Generate a dashboard for `root_table`, or report why none was
/// produced (§7: absent result, not an error, for the two expected
/// empty outcomes).
pub fn generate_dashboard(
    root_table: &Table,
    rule_library: &dyn RuleLibrary,
    catalog: &dyn Catalog,
    lattice: &TypeLattice,
    ga_dimensions: &dyn GaDimensions,
    access_policy: &dyn AccessPolicy,
    user_permissions: &CurrentUserPermissions,
    renderer: &dyn DashboardRenderer,
) -> Result<Result<DashboardId, NoDashboard>, DashboardError> {
    let rules = rule_library.rules()?;

    let rule = match best_matching_rule(&root_table.entity_type, &rules, lattice) {
        Some(r) => r.clone(),
        None => {
            return Ok(Err(NoDashboard::NoApplicableRule {
                table_id: root_table.id,
            }))
        }
    };
    tracing::info!(table_type = %rule.table_type, table_id = %root_table.id, "rule chosen");

    let tables = build_table_set(root_table, catalog)?;
    let mut context = Context::new(root_table.clone(), rule, tables.clone(), root_table.database_id);

    context.dimensions = bind_all_dimensions(
        &context.rule.dimensions,
        root_table,
        &tables,
        catalog,
        lattice,
        ga_dimensions,
    )?;
    tracing::info!(
        dimension_count = context.dimensions.len(),
        bound = context.dimensions.values().filter(|d| !d.is_empty()).count(),
        "dimension bindings summary"
    );

    context.metrics = resolve_all(&context.rule.metrics, &context.dimensions);
    context.filters = resolve_all(&context.rule.filters, &context.dimensions);
    tracing::info!(
        metrics = context.metrics.len(),
        filters = context.filters.len(),
        "metric/filter definitions chosen"
    );

    let empty_bindings = Bindings::new();
    let title = substitute_string(
        &context.rule.title,
        TemplateType::Text,
        &empty_bindings,
        &context,
        lattice,
        catalog,
    )?;
    let description = substitute_string(
        &context.rule.description,
        TemplateType::Text,
        &empty_bindings,
        &context,
        lattice,
        catalog,
    )?;

    let mut groups: HashMap<String, Vec<InstantiatedCard>> = HashMap::new();
    for (card_id, card) in context.rule.cards.iter() {
        let instances = dashboard_engine::expand_card(
            card_id,
            card,
            &context,
            lattice,
            catalog,
            access_policy,
            user_permissions,
        )?;
        merge_group(&mut groups, card_id.clone(), instances);
    }

    let survivors: Vec<InstantiatedCard> = groups.into_values().flatten().collect();
    if survivors.is_empty() {
        return Ok(Err(NoDashboard::NoSurvivingCards));
    }

    let metadata = DashboardMetadata { title, description };
    let id = renderer.create_dashboard(metadata, survivors)?;
    Ok(Ok(id))
}

fn build_table_set(root_table: &Table, catalog: &dyn Catalog) -> Result<Vec<Table>, DashboardError> {
    let mut tables = vec![root_table.clone()];
    tables.extend(linked_tables(catalog, root_table)?);
    Ok(tables)
}

/// §4.9 step 6: when a later card identifier collides with one already
/// in `groups`, keep whichever group's *best* instantiation scores
/// higher - not just the first element of each group, since
/// instantiation order is not guaranteed to be score-descending (§9
/// Open Question).
fn merge_group(groups: &mut HashMap<String, Vec<InstantiatedCard>>, id: String, incoming: Vec<InstantiatedCard>) {
    match groups.remove(&id) {
        None => {
            groups.insert(id, incoming);
        }
        Some(existing) => {
            let existing_best = existing.iter().map(|c| c.score).fold(f64::MIN, f64::max);
            let incoming_best = incoming.iter().map(|c| c.score).fold(f64::MIN, f64::max);
            let winner = if incoming_best > existing_best { incoming } else { existing };
            groups.insert(id, winner);
        }
    }
}
