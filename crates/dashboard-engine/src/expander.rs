//! C8: the card expander.
//!
//! Enumerates the Cartesian product of candidate bindings for one card
//! spec, builds a query per combination, scores it, and filters by
//! access policy.

use dashboard_types::{
    CardSpec, Context, Direction, InstantiatedCard, NativeQuery, OrderBy, QueryForm,
    StructuredQuery, StructuredQueryBody, TemplateExpr,
};

use crate::access::{AccessPolicy, CurrentUserPermissions};
use crate::catalog::{Catalog, CatalogError};
use crate::lattice::TypeLattice;
use crate::reference::TemplateType;
use crate::rule_select::entity_ref_candidates;
use crate::template::{referenced_dimensions, substitute_string, substitute_structured, BoundEntity, Bindings};

/// §4.7 step 1: resolve one `order_by` entry to its structured-query
/// target, pre-substitution.
fn resolve_order_by_entry(identifier: &str, direction: Direction, card: &CardSpec) -> OrderBy {
    if card.dimensions.iter().any(|d| d == identifier) {
        (direction, QueryForm::Dimension(identifier.to_string()))
    } else {
        let index = card.metrics.iter().position(|m| m == identifier).unwrap_or(0);
        (direction, QueryForm::AggregateField(index))
    }
}

/// §4.7 step 3: the card's composite score.
fn compute_score(card: &CardSpec, context: &Context) -> f64 {
    if card.query.is_some() {
        return card.score as f64;
    }

    let mut scores = Vec::new();
    for dim_id in &card.dimensions {
        if let Some(resolved) = context.dimensions.get(dim_id) {
            scores.push(resolved.definition.score as f64);
        }
    }
    for metric_id in &card.metrics {
        if let Some(def) = context.metrics.get(metric_id) {
            scores.push(def.score as f64);
        }
    }
    for filter_id in &card.filters {
        if let Some(def) = context.filters.get(filter_id) {
            scores.push(def.score as f64);
        }
    }

    let mean = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };

    let scale = if context.rule.max_score == 0 {
        0.0
    } else {
        card.score as f64 / context.rule.max_score as f64
    };
    mean * scale
}

/// §4.7 step 4: union of dimension identifiers referenced by the card's
/// dimension list, metrics, filters, and (for native cards) its query
/// template.
fn used_dimensions(card: &CardSpec, context: &Context) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    let mut push = |id: &str, seen: &mut std::collections::HashSet<String>, out: &mut Vec<String>| {
        if seen.insert(id.to_string()) {
            out.push(id.to_string());
        }
    };

    for id in &card.dimensions {
        push(id, &mut seen, &mut out);
    }
    for metric_id in &card.metrics {
        if let Some(def) = context.metrics.get(metric_id) {
            for id in referenced_dimensions(&def.template) {
                push(&id, &mut seen, &mut out);
            }
        }
    }
    for filter_id in &card.filters {
        if let Some(def) = context.filters.get(filter_id) {
            for id in referenced_dimensions(&def.template) {
                push(&id, &mut seen, &mut out);
            }
        }
    }
    if let Some(query) = &card.query {
        for id in referenced_dimensions(&TemplateExpr::Native(query.clone())) {
            push(&id, &mut seen, &mut out);
        }
    }
    out
}

/// Build the candidate set for one used-dimension identifier: either
/// the context's resolved `matches`, or - if it's an entity reference -
/// the matching tables in context.
fn candidate_set(id: &str, context: &Context, lattice: &TypeLattice) -> Vec<BoundEntity> {
    if let Some(resolved) = context.dimensions.get(id) {
        resolved
            .matches
            .iter()
            .cloned()
            .map(BoundEntity::Field)
            .collect()
    } else {
        entity_ref_candidates(id, context, lattice)
            .into_iter()
            .cloned()
            .map(BoundEntity::Table)
            .collect()
    }
}

/// Lazily enumerates the Cartesian product of a set of named candidate
/// lists as a mixed-radix counter, rather than materializing the full
/// product up front (§9 "Cartesian product memory").
struct CartesianBindings {
    sets: Vec<(String, Vec<BoundEntity>)>,
    indices: Vec<usize>,
    done: bool,
}

impl CartesianBindings {
    fn new(sets: Vec<(String, Vec<BoundEntity>)>) -> Self {
        let done = sets.iter().any(|(_, v)| v.is_empty());
        let indices = vec![0; sets.len()];
        Self { sets, indices, done }
    }
}

impl Iterator for CartesianBindings {
    type Item = Bindings;

    fn next(&mut self) -> Option<Bindings> {
        if self.done {
            return None;
        }

        let result: Bindings = self
            .sets
            .iter()
            .zip(&self.indices)
            .map(|((id, values), &i)| (id.clone(), values[i].clone()))
            .collect();

        let mut carry = true;
        for (slot, (_, values)) in self.sets.iter().enumerate() {
            if !carry {
                break;
            }
            self.indices[slot] += 1;
            if self.indices[slot] >= values.len() {
                self.indices[slot] = 0;
            } else {
                carry = false;
            }
        }
        if carry {
            self.done = true;
        }
        Some(result)
    }
}

fn build_structured_query(
    card: &CardSpec,
    bindings: &Bindings,
    context: &Context,
    lattice: &TypeLattice,
    catalog: &dyn Catalog,
) -> Result<StructuredQuery, CatalogError> {
    let mut breakout = Vec::new();
    for id in &card.dimensions {
        let form = substitute_structured(&QueryForm::Dimension(id.clone()), bindings, lattice, catalog)?;
        breakout.push(form);
    }

    let mut aggregation = Vec::new();
    for id in &card.metrics {
        if let Some(def) = context.metrics.get(id) {
            if let TemplateExpr::Structured(form) = &def.template {
                aggregation.push(substitute_structured(form, bindings, lattice, catalog)?);
            }
        }
    }

    let mut filter_forms = Vec::new();
    for id in &card.filters {
        if let Some(def) = context.filters.get(id) {
            if let TemplateExpr::Structured(form) = &def.template {
                filter_forms.push(substitute_structured(form, bindings, lattice, catalog)?);
            }
        }
    }
    let filter = match filter_forms.len() {
        0 => None,
        1 => filter_forms.pop(),
        _ => Some(QueryForm::And(filter_forms)),
    };

    let mut order_by = Vec::new();
    for (identifier, direction) in &card.order_by {
        let (direction, form) = resolve_order_by_entry(identifier, *direction, card);
        let substituted = substitute_structured(&form, bindings, lattice, catalog)?;
        order_by.push((direction, substituted));
    }

    Ok(StructuredQuery::Query {
        database: context.database_id,
        query: StructuredQueryBody {
            source_table: Some(context.root_table.id),
            filter,
            breakout,
            aggregation,
            limit: card.limit,
            order_by,
        },
    })
}

fn build_native_query(
    query: &str,
    bindings: &Bindings,
    context: &Context,
    lattice: &TypeLattice,
    catalog: &dyn Catalog,
) -> Result<StructuredQuery, CatalogError> {
    let substituted = substitute_string(query, TemplateType::Native, bindings, context, lattice, catalog)?;
    Ok(StructuredQuery::Native {
        database: context.database_id,
        native: NativeQuery { query: substituted },
    })
}

fn substitute_visualization(
    visualization: &dashboard_types::Visualization,
    bindings: &Bindings,
) -> dashboard_types::Visualization {
    let mut out = visualization.clone();
    out.map_latitude_column = out
        .map_latitude_column
        .and_then(|id| column_name_for(&id, bindings));
    out.map_longitude_column = out
        .map_longitude_column
        .and_then(|id| column_name_for(&id, bindings));
    out
}

fn column_name_for(identifier: &str, bindings: &Bindings) -> Option<String> {
    match bindings.get(identifier) {
        Some(BoundEntity::Field(bf)) => Some(bf.field.internal_name.clone()),
        Some(BoundEntity::Table(t)) => Some(t.internal_name.clone()),
        None => Some(identifier.to_string()),
    }
}

/// Expand one card spec against a bound context (§4.7).
pub fn expand_card(
    card_id: &str,
    card: &CardSpec,
    context: &Context,
    lattice: &TypeLattice,
    catalog: &dyn Catalog,
    access_policy: &dyn AccessPolicy,
    user_permissions: &CurrentUserPermissions,
) -> Result<Vec<InstantiatedCard>, CatalogError> {
    let score = compute_score(card, context);
    let used = used_dimensions(card, context);

    let sets: Vec<(String, Vec<BoundEntity>)> = used
        .iter()
        .map(|id| (id.clone(), candidate_set(id, context, lattice)))
        .collect();

    let mut instances = Vec::new();
    for bindings in CartesianBindings::new(sets) {
        let query = match &card.query {
            Some(native) => build_native_query(native, &bindings, context, lattice, catalog)?,
            None => build_structured_query(card, &bindings, context, lattice, catalog)?,
        };

        if !access_policy.has_permissions(&query, user_permissions) {
            tracing::debug!(card_id, "candidate query denied by access policy");
            continue;
        }

        let card_title = substitute_string(&card.title, TemplateType::Text, &bindings, context, lattice, catalog)?;
        let card_description =
            substitute_string(&card.description, TemplateType::Text, &bindings, context, lattice, catalog)?;

        instances.push(InstantiatedCard {
            card_id: card_id.to_string(),
            title: card_title,
            description: card_description,
            visualization: substitute_visualization(&card.visualization, &bindings),
            query,
            score,
        });
    }

    Ok(instances)
}
