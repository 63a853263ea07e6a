//! C6: overload resolver for metrics and filters.

use std::collections::HashMap;

use dashboard_types::{DefDef, ResolvedDimension, TemplateExpr};

use crate::template::referenced_dimensions;

/// A definition is applicable iff every dimension identifier it
/// references has a non-empty `matches` in the bound context (§4.5).
pub fn is_applicable(def: &DefDef, dimensions: &HashMap<String, ResolvedDimension>) -> bool {
    referenced_dimensions(&def.template).iter().all(|id| {
        dimensions
            .get(id)
            .map(|resolved| !resolved.is_empty())
            .unwrap_or(false)
    })
}

/// Pick the winning definition among a set of overloads for one
/// identifier (§4.5):
/// - exactly one applicable -> that one
/// - multiple applicable -> highest score
/// - none applicable -> highest score among the lot (fallback)
pub fn resolve_overload<'a>(
    candidates: &'a [DefDef],
    dimensions: &HashMap<String, ResolvedDimension>,
) -> Option<&'a DefDef> {
    let applicable: Vec<&DefDef> = candidates.iter().filter(|d| is_applicable(d, dimensions)).collect();
    let pool = if applicable.is_empty() {
        candidates.iter().collect::<Vec<_>>()
    } else {
        applicable
    };
    pool.into_iter().max_by_key(|d| d.score)
}

/// Resolve every metric/filter identifier in a rule's overload map
/// (§4.9 step 3).
pub fn resolve_all(
    defs: &HashMap<String, Vec<DefDef>>,
    dimensions: &HashMap<String, ResolvedDimension>,
) -> HashMap<String, DefDef> {
    defs.iter()
        .filter_map(|(id, overloads)| {
            resolve_overload(overloads, dimensions).map(|winner| (id.clone(), winner.clone()))
        })
        .collect()
}

/// Extract the `score` out of a definition's template, for the card
/// score aggregation in §4.7 step 3 - metrics/filters only carry a
/// score on the definition itself, not the template.
pub fn def_score(def: &DefDef) -> u32 {
    def.score
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_types::{DimensionDef, FieldTypeSpec};

    fn def_referencing(score: u32, dims: &[&str]) -> DefDef {
        DefDef {
            template: TemplateExpr::Native(
                dims.iter().map(|d| format!("[[{d}]]")).collect::<Vec<_>>().join(" "),
            ),
            score,
        }
    }

    fn empty_resolved() -> ResolvedDimension {
        ResolvedDimension {
            definition: DimensionDef {
                field_type: FieldTypeSpec::Root("Number".into()),
                named: None,
                links_to: None,
                score: 10,
            },
            matches: Vec::new(),
        }
    }

    fn nonempty_resolved() -> ResolvedDimension {
        use dashboard_types::{BoundField, Field, FieldId, TableId};
        ResolvedDimension {
            definition: DimensionDef {
                field_type: FieldTypeSpec::Root("Number".into()),
                named: None,
                links_to: None,
                score: 10,
            },
            matches: vec![BoundField {
                field: Field::new(FieldId::new(), TableId::new(), "A", "a", "Number".into()),
                link: None,
            }],
        }
    }

    #[test]
    fn s6_inapplicable_loses_to_applicable() {
        let mut dims = HashMap::new();
        dims.insert("D".to_string(), empty_resolved());

        let m1 = def_referencing(50, &["D"]); // references D, which has no matches -> inapplicable
        let m2 = def_referencing(50, &[]); // references nothing -> applicable

        let winner = resolve_overload(&[m1.clone(), m2.clone()], &dims).unwrap();
        assert_eq!(winner.template, m2.template);
    }

    #[test]
    fn multiple_applicable_picks_highest_score() {
        let mut dims = HashMap::new();
        dims.insert("D".to_string(), nonempty_resolved());

        let low = def_referencing(10, &["D"]);
        let high = def_referencing(90, &["D"]);
        let winner = resolve_overload(&[low, high.clone()], &dims).unwrap();
        assert_eq!(winner.score, 90);
    }

    #[test]
    fn none_applicable_falls_back_to_highest_score() {
        let dims = HashMap::new();
        let low = def_referencing(10, &["Missing"]);
        let high = def_referencing(20, &["Missing"]);
        let winner = resolve_overload(&[low, high.clone()], &dims).unwrap();
        assert_eq!(winner.score, 20);
    }
}
