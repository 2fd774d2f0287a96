use super::schema::{ColumnType, PrimaryKey, TableSchema};

/// Generate CREATE TABLE SQL for a table schema
pub fn generate_create_table(schema: &TableSchema) -> String {
    let mut sql = format!("CREATE TABLE IF NOT EXISTS {} (\n", schema.name);
    let mut columns = Vec::new();

    for col in schema.columns {
        let sql_type = match col.col_type {
            ColumnType::Integer => "INTEGER",
            ColumnType::Text => "TEXT",
        };

        let pk = match &schema.primary_key {
            PrimaryKey::Natural(name) if *name == col.name => " PRIMARY KEY",
            PrimaryKey::AutoIncrement(name) if *name == col.name => " PRIMARY KEY AUTOINCREMENT",
            _ => "",
        };
        let default = col
            .default
            .map(|d| format!(" DEFAULT {}", d))
            .unwrap_or_default();

        columns.push(format!(
            "    {} {}{} NOT NULL{}",
            col.name, sql_type, pk, default
        ));
    }

    for fk in schema.foreign_keys {
        let on_delete = if fk.cascade_delete { " ON DELETE CASCADE" } else { "" };
        columns.push(format!(
            "    FOREIGN KEY ({}) REFERENCES {}({}){}",
            fk.column, fk.references_table, fk.references_column, on_delete
        ));
    }

    sql.push_str(&columns.join(",\n"));
    sql.push_str("\n)");

    sql
}

/// Generate CREATE INDEX statements for foreign key columns
pub fn generate_indexes(schema: &TableSchema) -> Vec<String> {
    schema
        .foreign_keys
        .iter()
        .map(|fk| {
            format!(
                "CREATE INDEX IF NOT EXISTS idx_{}_{} ON {}({})",
                schema.name, fk.column, schema.name, fk.column
            )
        })
        .collect()
}
