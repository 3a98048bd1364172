//! Output formatters for inferred schemas and associations.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use relmap_core::{JoinPath, ResolvedAssociations, Schema, UnsupportedType};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// One relation to print.
#[derive(Debug, Clone, Copy)]
pub struct RelationReport<'a> {
    /// The relation's schema.
    pub schema: &'a Schema,
    /// Resolved associations, when they were requested.
    pub associations: Option<&'a ResolvedAssociations>,
}

/// Trait for formatting output.
pub trait Formatter {
    /// Format the relations and the degraded columns found while inferring
    /// them.
    fn format_report(&self, relations: &[RelationReport<'_>], degraded: &[UnsupportedType])
        -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_report(
        &self,
        relations: &[RelationReport<'_>],
        degraded: &[UnsupportedType],
    ) -> String {
        let mut sections = Vec::new();

        for report in relations {
            sections.push(format_schema_as_table(report.schema));
            if let Some(associations) = report.associations {
                if !associations.is_empty() {
                    sections.push(format_associations_as_table(associations));
                }
            }
        }

        if sections.is_empty() {
            sections.push("No relations".to_string());
        }

        if !degraded.is_empty() {
            let warnings: Vec<String> = degraded
                .iter()
                .map(|warning| format!("warning: {} (degraded to any)", warning))
                .collect();
            sections.push(warnings.join("\n"));
        }

        sections.join("\n\n")
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_report(
        &self,
        relations: &[RelationReport<'_>],
        degraded: &[UnsupportedType],
    ) -> String {
        let relations: Vec<serde_json::Value> = relations
            .iter()
            .map(|report| {
                let mut obj = serde_json::Map::new();
                obj.insert(
                    "schema".to_string(),
                    serde_json::to_value(report.schema).unwrap_or_default(),
                );
                if let Some(associations) = report.associations {
                    obj.insert(
                        "associations".to_string(),
                        serde_json::to_value(associations).unwrap_or_default(),
                    );
                }
                serde_json::Value::Object(obj)
            })
            .collect();

        let degraded: Vec<serde_json::Value> = degraded
            .iter()
            .map(|warning| {
                serde_json::json!({
                    "relation": warning.relation,
                    "column": warning.column,
                    "native_type": warning.native_type,
                })
            })
            .collect();

        let report = serde_json::json!({
            "relations": relations,
            "degraded": degraded,
        });
        serde_json::to_string_pretty(&report).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Format a schema's attributes, followed by its indexes.
fn format_schema_as_table(schema: &Schema) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        "Attribute",
        "Type",
        "Null",
        "Key",
        "Default",
        "References",
    ]);

    for attr in schema.attributes() {
        table.add_row(vec![
            Cell::new(&attr.name),
            Cell::new(attr.ty),
            Cell::new(if attr.nullable { "YES" } else { "NO" }),
            Cell::new(if attr.primary_key { "PK" } else { "" }),
            Cell::new(attr.default.as_deref().unwrap_or("")),
            Cell::new(attr.references.as_deref().unwrap_or("")),
        ]);
    }

    let mut output = format!("{}\n{}\n{} attribute(s)", schema.name(), table, schema.len());

    if !schema.indexes().is_empty() {
        let mut indexes = Table::new();
        indexes.set_header(vec!["Index", "Attributes", "Unique", "Using"]);
        for index in schema.indexes() {
            indexes.add_row(vec![
                Cell::new(index.name.as_deref().unwrap_or("-")),
                Cell::new(index.column_names().join(", ")),
                Cell::new(if index.unique { "YES" } else { "NO" }),
                Cell::new(index.kind.as_deref().unwrap_or("")),
            ]);
        }
        output.push('\n');
        output.push_str(&indexes.to_string());
    }

    output
}

/// Format resolved associations with their join columns.
fn format_associations_as_table(associations: &ResolvedAssociations) -> String {
    let mut table = Table::new();
    table.set_header(vec!["Association", "Kind", "Target", "Via", "Join"]);

    for association in associations {
        let via = match &association.join {
            JoinPath::Direct { owner, .. } => owner.clone(),
            JoinPath::Through { through, .. } => through.clone(),
        };
        let join: Vec<String> = association
            .join_columns()
            .into_iter()
            .map(|(left, right)| format!("{} = {}", left, right))
            .collect();

        table.add_row(vec![
            Cell::new(association.name()),
            Cell::new(association.kind()),
            Cell::new(&association.target.relation),
            Cell::new(via),
            Cell::new(join.join("\n")),
        ]);
    }

    format!("{}\n{} association(s)", table, associations.len())
}
