//! C3: reference resolver.
//!
//! Dispatches on `(template_type, entity-kind)` - a 3x2 match, modeled
//! directly instead of generalized, per the source's own dispatch shape.

use dashboard_types::{Field, QueryForm, Reference, Table, TemporalUnit};

use crate::catalog::{Catalog, CatalogError};
use crate::lattice::TypeLattice;

/// Which rendering form a reference should take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateType {
    Structured,
    Text,
    Native,
}

/// Either side of the 3x2 dispatch table: a bound field or a bound table.
#[derive(Debug, Clone)]
pub enum Entity<'a> {
    Field(&'a Field, Option<dashboard_types::FieldId>),
    Table(&'a Table),
}

/// Resolve `entity` into the requested rendering form (§4.3).
pub fn resolve(
    template_type: TemplateType,
    entity: &Entity<'_>,
    lattice: &TypeLattice,
    catalog: &dyn Catalog,
) -> Result<Reference, CatalogError> {
    match (template_type, entity) {
        (TemplateType::Structured, Entity::Field(field, link)) => {
            Ok(Reference::Structured(structured_field_ref(field, *link, lattice)))
        }
        (TemplateType::Structured, Entity::Table(table)) => {
            Ok(Reference::Structured(QueryForm::TableRef(table.id)))
        }
        (TemplateType::Text, Entity::Field(field, _)) => {
            Ok(Reference::Text(field.display_name.clone()))
        }
        (TemplateType::Text, Entity::Table(table)) => {
            Ok(Reference::Text(table.display_name.clone()))
        }
        (TemplateType::Native, Entity::Field(field, _)) => {
            let table = catalog.select_table(field.table_id)?;
            Ok(Reference::Native(format!(
                "{}.{}",
                table.internal_name, field.internal_name
            )))
        }
        (TemplateType::Native, Entity::Table(table)) => {
            Ok(Reference::Native(table.internal_name.clone()))
        }
    }
}

fn structured_field_ref(
    field: &Field,
    link: Option<dashboard_types::FieldId>,
    lattice: &TypeLattice,
) -> QueryForm {
    let base = if let Some(link_field) = link {
        QueryForm::FkArrow {
            link: link_field,
            target: field.id,
        }
    } else if let Some(fk_target) = field.fk_target_field_id {
        QueryForm::FkArrow {
            link: field.id,
            target: fk_target,
        }
    } else {
        QueryForm::FieldId(field.id)
    };

    if lattice.is_a(&field.base_type, &"Temporal".into()) {
        QueryForm::DatetimeField {
            field: Box::new(base),
            unit: TemporalUnit::default(),
        }
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_types::{DatabaseId, FieldId, SemanticType, TableId};

    struct NoopCatalog {
        table: Table,
    }
    impl Catalog for NoopCatalog {
        fn select_fields(&self, _: TableId) -> Result<Vec<Field>, CatalogError> {
            Ok(Vec::new())
        }
        fn select_table(&self, _: TableId) -> Result<Table, CatalogError> {
            Ok(self.table.clone())
        }
        fn select_field(&self, id: FieldId) -> Result<Field, CatalogError> {
            Err(CatalogError::UnknownField(id))
        }
    }

    #[test]
    fn temporal_field_wraps_in_datetime_field_day() {
        let lattice = {
            let mut l = TypeLattice::new();
            l.declare("Temporal/DateTime", "Temporal");
            l
        };
        let table_id = TableId::new();
        let field = Field::new(
            FieldId::new(),
            table_id,
            "Created At",
            "created_at",
            SemanticType::from("Temporal/DateTime"),
        );
        let form = structured_field_ref(&field, None, &lattice);
        match form {
            QueryForm::DatetimeField { unit, .. } => assert_eq!(unit, TemporalUnit::Day),
            other => panic!("expected DatetimeField, got {other:?}"),
        }
    }

    #[test]
    fn linked_field_wraps_in_fk_arrow() {
        let lattice = TypeLattice::new();
        let table_id = TableId::new();
        let link_field = FieldId::new();
        let field = Field::new(
            FieldId::new(),
            table_id,
            "Name",
            "name",
            SemanticType::from("Text"),
        );
        let form = structured_field_ref(&field, Some(link_field), &lattice);
        match form {
            QueryForm::FkArrow { link, target } => {
                assert_eq!(link, link_field);
                assert_eq!(target, field.id);
            }
            other => panic!("expected FkArrow, got {other:?}"),
        }
    }

    #[test]
    fn native_reference_is_table_dot_field() {
        let db = DatabaseId::new();
        let table_id = TableId::new();
        let table = Table::new(table_id, db, "Customers", "customers", "Customers".into());
        let field = Field::new(FieldId::new(), table_id, "Name", "name", "Text".into());
        let catalog = NoopCatalog { table };
        let lattice = TypeLattice::new();
        let entity = Entity::Field(&field, None);
        let reference = resolve(TemplateType::Native, &entity, &lattice, &catalog).unwrap();
        assert_eq!(reference.as_text(), Some("customers.name"));
    }
}
