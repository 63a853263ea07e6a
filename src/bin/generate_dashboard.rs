//! CLI entry point: run the orchestrator against an in-memory demo
//! schema and print the resulting dashboard as JSON.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use clap::Parser;

use auto_dashboard::{generate_dashboard, load_ga_dimensions, RecordingRenderer, YamlRuleLibrary};
use dashboard_engine::{AllowAll, Catalog, CatalogError, CurrentUserPermissions, TypeLattice};
use dashboard_types::{DatabaseId, Field, FieldId, SemanticType, Table, TableId};

#[derive(Parser)]
#[command(name = "generate-dashboard", about = "Generate an automatic dashboard for a demo table")]
struct Cli {
    /// Directory of `*.yaml` rule definitions.
    #[arg(long)]
    rules_dir: PathBuf,

    /// Optional flat YAML file of GA dimension field-spec literals.
    #[arg(long)]
    ga_dimensions: Option<PathBuf>,

    /// Which demo table to generate a dashboard for.
    #[arg(long, default_value = "orders")]
    table: String,
}

struct DemoCatalog {
    tables: HashMap<TableId, Table>,
    fields: HashMap<TableId, Vec<Field>>,
}

impl Catalog for DemoCatalog {
    fn select_fields(&self, table_id: TableId) -> Result<Vec<Field>, CatalogError> {
        self.fields
            .get(&table_id)
            .cloned()
            .ok_or(CatalogError::UnknownTable(table_id))
    }

    fn select_table(&self, table_id: TableId) -> Result<Table, CatalogError> {
        self.tables
            .get(&table_id)
            .cloned()
            .ok_or(CatalogError::UnknownTable(table_id))
    }

    fn select_field(&self, field_id: FieldId) -> Result<Field, CatalogError> {
        self.fields
            .values()
            .flatten()
            .find(|f| f.id == field_id)
            .cloned()
            .ok_or(CatalogError::UnknownField(field_id))
    }
}

fn demo_schema() -> (DemoCatalog, Table, Table) {
    let db = DatabaseId::new();
    let orders_id = TableId::new();
    let customers_id = TableId::new();

    let customers = Table::new(customers_id, db, "Customers", "customers", SemanticType::from("Customers"));
    let orders = Table::new(orders_id, db, "Orders", "orders", SemanticType::from("Orders"));

    let customer_pk = FieldId::new();
    let customer_fields = vec![Field::new(customer_pk, customers_id, "Id", "id", SemanticType::from("Number"))
        .with_special_type("PK".into())];

    let order_fields = vec![
        Field::new(FieldId::new(), orders_id, "Id", "id", SemanticType::from("Number")).with_special_type("PK".into()),
        Field::new(FieldId::new(), orders_id, "Customer Id", "customer_id", SemanticType::from("Number"))
            .with_special_type("FK".into())
            .with_fk_target(customer_pk),
        Field::new(FieldId::new(), orders_id, "Total", "total", SemanticType::from("Number")),
        Field::new(FieldId::new(), orders_id, "Created At", "created_at", SemanticType::from("DateTime")),
    ];

    let mut tables = HashMap::new();
    tables.insert(orders_id, orders.clone());
    tables.insert(customers_id, customers.clone());

    let mut fields = HashMap::new();
    fields.insert(orders_id, order_fields);
    fields.insert(customers_id, customer_fields);

    (DemoCatalog { tables, fields }, orders, customers)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let (catalog, orders, customers) = demo_schema();
    let root_table = match cli.table.as_str() {
        "customers" => customers,
        _ => orders,
    };

    let rule_library = YamlRuleLibrary::new(&cli.rules_dir);
    let ga_dimensions: HashSet<String> = match &cli.ga_dimensions {
        Some(path) => load_ga_dimensions(path)?,
        None => HashSet::new(),
    };

    let mut lattice = TypeLattice::new();
    lattice.declare("Orders", "Generic");
    lattice.declare("Customers", "Generic");
    lattice.declare("PK", "Key");
    lattice.declare("FK", "Key");

    let access = AllowAll;
    let permissions = CurrentUserPermissions(serde_json::Value::Null);
    let renderer = RecordingRenderer::default();

    let outcome = generate_dashboard(
        &root_table,
        &rule_library,
        &catalog,
        &lattice,
        &ga_dimensions,
        &access,
        &permissions,
        &renderer,
    )?;

    match outcome {
        Ok(dashboard_id) => {
            let calls = renderer.calls.lock().unwrap();
            let (metadata, cards) = calls.last().expect("renderer was called on success");
            let output = serde_json::json!({
                "dashboard_id": dashboard_id.0,
                "title": metadata.title,
                "description": metadata.description,
                "cards": cards,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Err(reason) => {
            println!("no dashboard generated: {reason}");
        }
    }

    Ok(())
}
