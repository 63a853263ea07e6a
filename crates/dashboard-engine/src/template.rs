//! C7: template substituter.
//!
//! Two substitution targets: `[[identifier]]` tokens in free-text and
//! native-query strings, and `[:dimension id]` placeholders in
//! structured-query fragments.

use std::collections::HashMap;

use dashboard_types::{BoundField, QueryForm, Reference, TemplateExpr, Table};
use regex::Regex;

use crate::catalog::{Catalog, CatalogError};
use crate::lattice::TypeLattice;
use crate::reference::{resolve, Entity, TemplateType};
use crate::rule_select::resolve_entity_ref;
use dashboard_types::Context;

/// One concrete binding chosen for a single card instantiation: either a
/// field (with its link annotation) or a whole table (for entity-ref
/// dimensions).
#[derive(Debug, Clone)]
pub enum BoundEntity {
    Field(BoundField),
    Table(Table),
}

pub type Bindings = HashMap<String, BoundEntity>;

fn token_pattern() -> Regex {
    Regex::new(r"\[\[([A-Za-z0-9_.\-]+)\]\]").expect("static pattern")
}

/// Dimension identifiers a metric/filter/native-card template
/// references (used by the overload resolver C6 and the card expander's
/// "used dimensions" step).
pub fn referenced_dimensions(template: &TemplateExpr) -> Vec<String> {
    match template {
        TemplateExpr::Native(s) => token_pattern()
            .captures_iter(s)
            .map(|c| c[1].to_string())
            .collect(),
        TemplateExpr::Structured(form) => {
            let mut out = Vec::new();
            collect_dimension_refs(form, &mut out);
            out
        }
    }
}

fn collect_dimension_refs(form: &QueryForm, out: &mut Vec<String>) {
    match form {
        QueryForm::Dimension(id) => out.push(id.clone()),
        QueryForm::DatetimeField { field, .. } => collect_dimension_refs(field, out),
        QueryForm::And(forms) | QueryForm::Call(_, forms) => {
            for f in forms {
                collect_dimension_refs(f, out);
            }
        }
        QueryForm::FieldId(_)
        | QueryForm::TableRef(_)
        | QueryForm::FkArrow { .. }
        | QueryForm::AggregateField(_)
        | QueryForm::Literal(_) => {}
    }
}

fn entity_of<'a>(bound: &'a BoundEntity) -> Entity<'a> {
    match bound {
        BoundEntity::Field(bf) => Entity::Field(&bf.field, bf.link),
        BoundEntity::Table(t) => Entity::Table(t),
    }
}

/// Substitute `[[identifier]]` tokens in a string template (§4.6).
///
/// Resolution order per token: (1) `bindings`, (2) parse as an entity
/// reference and take the first matching table in `context`, (3) leave
/// the raw identifier unchanged.
pub fn substitute_string(
    template: &str,
    template_type: TemplateType,
    bindings: &Bindings,
    context: &Context,
    lattice: &TypeLattice,
    catalog: &dyn Catalog,
) -> Result<String, CatalogError> {
    let pattern = token_pattern();
    let mut result = String::with_capacity(template.len());
    let mut last_end = 0;

    for cap in pattern.captures_iter(template) {
        let whole = cap.get(0).unwrap();
        let id = &cap[1];
        result.push_str(&template[last_end..whole.start()]);

        let spliced = if let Some(bound) = bindings.get(id) {
            let reference = resolve(template_type, &entity_of(bound), lattice, catalog)?;
            rendered(&reference)
        } else if let Some(table) = resolve_entity_ref(id, context, lattice) {
            let reference = resolve(template_type, &Entity::Table(table), lattice, catalog)?;
            rendered(&reference)
        } else {
            whole.as_str().to_string()
        };
        result.push_str(&spliced);
        last_end = whole.end();
    }
    result.push_str(&template[last_end..]);
    Ok(result)
}

fn rendered(reference: &Reference) -> String {
    match reference {
        Reference::Text(s) | Reference::Native(s) => s.clone(),
        Reference::Structured(_) => String::new(),
    }
}

/// Tree-walk a structured-query fragment post-order, replacing
/// `[:dimension id]` with the structured reference of `bindings[id]`;
/// everything else passes through unchanged (§4.6).
pub fn substitute_structured(
    form: &QueryForm,
    bindings: &Bindings,
    lattice: &TypeLattice,
    catalog: &dyn Catalog,
) -> Result<QueryForm, CatalogError> {
    Ok(match form {
        QueryForm::Dimension(id) => match bindings.get(id) {
            Some(bound) => {
                let reference = resolve(TemplateType::Structured, &entity_of(bound), lattice, catalog)?;
                reference.as_structured().cloned().unwrap_or_else(|| form.clone())
            }
            None => form.clone(),
        },
        QueryForm::DatetimeField { field, unit } => QueryForm::DatetimeField {
            field: Box::new(substitute_structured(field, bindings, lattice, catalog)?),
            unit: *unit,
        },
        QueryForm::And(forms) => {
            let mut out = Vec::with_capacity(forms.len());
            for f in forms {
                out.push(substitute_structured(f, bindings, lattice, catalog)?);
            }
            QueryForm::And(out)
        }
        QueryForm::Call(name, forms) => {
            let mut out = Vec::with_capacity(forms.len());
            for f in forms {
                out.push(substitute_structured(f, bindings, lattice, catalog)?);
            }
            QueryForm::Call(name.clone(), out)
        }
        other => other.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_types::{DatabaseId, Field, FieldId, Rule, SemanticType, TableId};

    struct NoopCatalog;
    impl Catalog for NoopCatalog {
        fn select_fields(&self, id: TableId) -> Result<Vec<Field>, CatalogError> {
            Err(CatalogError::UnknownTable(id))
        }
        fn select_table(&self, id: TableId) -> Result<Table, CatalogError> {
            Err(CatalogError::UnknownTable(id))
        }
        fn select_field(&self, id: FieldId) -> Result<Field, CatalogError> {
            Err(CatalogError::UnknownField(id))
        }
    }

    fn sample_context() -> Context {
        let db = DatabaseId::new();
        let root_id = TableId::new();
        let root = Table::new(root_id, db, "Orders", "orders", "Orders".into());
        let rule = Rule {
            table_type: "Orders".to_string(),
            dimensions: Default::default(),
            metrics: Default::default(),
            filters: Default::default(),
            cards: Default::default(),
            title: String::new(),
            description: String::new(),
            max_score: 100,
        };
        Context::new(root.clone(), rule, vec![root], db)
    }

    #[test]
    fn template_closure_for_bound_identifier() {
        let catalog = NoopCatalog;
        let lattice = TypeLattice::new();
        let context = sample_context();
        let field = Field::new(
            FieldId::new(),
            context.root_table.id,
            "Amount",
            "amount",
            SemanticType::from("Number"),
        );
        let mut bindings = Bindings::new();
        bindings.insert(
            "D".to_string(),
            BoundEntity::Field(BoundField { field, link: None }),
        );
        let out = substitute_string(
            "Total [[D]] by day",
            TemplateType::Text,
            &bindings,
            &context,
            &lattice,
            &catalog,
        )
        .unwrap();
        assert_eq!(out, "Total Amount by day");
        assert!(!out.contains("[["));
    }

    #[test]
    fn template_closure_for_entity_reference() {
        let catalog = NoopCatalog;
        let lattice = TypeLattice::new();
        let context = sample_context();
        let bindings = Bindings::new();
        let out = substitute_string(
            "Dashboard for [[this]]",
            TemplateType::Text,
            &bindings,
            &context,
            &lattice,
            &catalog,
        )
        .unwrap();
        assert_eq!(out, "Dashboard for Orders");
    }

    #[test]
    fn unresolvable_identifier_left_unchanged() {
        let catalog = NoopCatalog;
        let lattice = TypeLattice::new();
        let context = sample_context();
        let bindings = Bindings::new();
        let out = substitute_string(
            "see [[nope]]",
            TemplateType::Text,
            &bindings,
            &context,
            &lattice,
            &catalog,
        )
        .unwrap();
        assert_eq!(out, "see [[nope]]");
    }

    #[test]
    fn structured_dimension_replaced_other_forms_passthrough() {
        let catalog = NoopCatalog;
        let lattice = TypeLattice::new();
        let table_id = TableId::new();
        let field = Field::new(FieldId::new(), table_id, "Amount", "amount", "Number".into());
        let mut bindings = Bindings::new();
        bindings.insert(
            "D".to_string(),
            BoundEntity::Field(BoundField {
                field: field.clone(),
                link: None,
            }),
        );
        let form = QueryForm::Call("sum".to_string(), vec![QueryForm::Dimension("D".to_string())]);
        let out = substitute_structured(&form, &bindings, &lattice, &catalog).unwrap();
        match out {
            QueryForm::Call(name, args) => {
                assert_eq!(name, "sum");
                assert_eq!(args[0], QueryForm::FieldId(field.id));
            }
            other => panic!("unexpected form: {other:?}"),
        }
    }
}
