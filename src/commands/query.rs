//! Query command implementation

use crate::error::Result;
use crate::queries::{self, CATALOG};
use crate::warehouse::{QueryOutput, Warehouse};

/// Run one named catalog query
pub async fn cmd_query(warehouse: &Warehouse, name: &str) -> Result<QueryOutput> {
    queries::run(warehouse, name).await
}

/// List the available catalog queries
pub fn print_query_list() {
    println!("Available queries:");
    let width = CATALOG.iter().map(|q| q.name.len()).max().unwrap_or(0);
    for query in CATALOG {
        println!("  {:<width$}  {}", query.name, query.description);
    }
}

/// Render a query result as an aligned text table
pub fn print_query_output(output: &QueryOutput) {
    if output.rows.is_empty() {
        println!("(no rows)");
        return;
    }

    let rendered: Vec<Vec<String>> = output
        .rows
        .iter()
        .map(|row| row.iter().map(render_value).collect())
        .collect();

    let mut widths: Vec<usize> = output.columns.iter().map(|c| c.len()).collect();
    for row in &rendered {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() && cell.len() > widths[i] {
                widths[i] = cell.len();
            }
        }
    }

    let header = output
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{:<width$}", c, width = widths[i]))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", header);
    println!("{}", "-".repeat(header.len()));

    for row in &rendered {
        let line = row
            .iter()
            .enumerate()
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths.get(i).copied().unwrap_or(0)))
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", line);
    }
    println!("({} rows)", output.rows.len());
}

fn render_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_value() {
        assert_eq!(render_value(&json!("abc")), "abc");
        assert_eq!(render_value(&json!(42)), "42");
        assert_eq!(render_value(&json!(1.5)), "1.5");
        assert_eq!(render_value(&json!(null)), "");
    }
}
