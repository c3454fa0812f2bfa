use std::collections::HashMap;
use tokio_postgres::Client;

use crate::db::{Column, Dialect, Table};
use crate::error::Result;

const TABLES_QUERY: &str = "
    SELECT c.relname::text AS table_name,
           COALESCE(obj_description(c.oid, 'pg_class'), '') AS table_comment
    FROM pg_class c
    JOIN pg_namespace n ON n.oid = c.relnamespace
    WHERE n.nspname = $1
      AND c.relkind IN ('r', 'p')
    ORDER BY c.relname";

const COLUMNS_QUERY: &str = "
    SELECT c.table_name::text,
           c.column_name::text,
           c.udt_name::text,
           c.is_nullable = 'YES' AS is_nullable,
           pk.column_name IS NOT NULL AS is_primary_key,
           (c.is_identity = 'YES' OR COALESCE(c.column_default, '') LIKE 'nextval(%') AS is_identity,
           COALESCE(col_description(
               format('%I.%I', c.table_schema, c.table_name)::regclass,
               c.ordinal_position::int
           ), '') AS column_comment,
           c.character_maximum_length::int8 AS length
    FROM information_schema.columns c
    LEFT JOIN (
        SELECT kcu.table_name, kcu.column_name
        FROM information_schema.table_constraints tc
        JOIN information_schema.key_column_usage kcu
            ON tc.constraint_name = kcu.constraint_name
            AND tc.table_schema = kcu.table_schema
        WHERE tc.constraint_type = 'PRIMARY KEY'
            AND tc.table_schema = $1
    ) pk ON pk.table_name = c.table_name AND pk.column_name = c.column_name
    WHERE c.table_schema = $1
    ORDER BY c.table_name, c.ordinal_position";

pub async fn list_tables(client: &Client, schema: &str) -> Result<Vec<Table>> {
    let table_rows = client.query(TABLES_QUERY, &[&schema]).await?;
    let mut tables: Vec<Table> = table_rows
        .iter()
        .map(|row| Table::new(row.get::<_, String>(0), row.get::<_, String>(1)))
        .collect();

    let index: HashMap<String, usize> = tables
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name.clone(), i))
        .collect();

    // Views show up in information_schema.columns too; they have no slot in `index`.
    let column_rows = client.query(COLUMNS_QUERY, &[&schema]).await?;
    for row in column_rows {
        let table_name: String = row.get(0);
        let Some(&slot) = index.get(&table_name) else {
            continue;
        };

        let column = Column::new(Dialect::PostgreSql, row.get::<_, String>(1), row.get::<_, String>(2))
            .nullable(row.get(3))
            .identity(row.get(5))
            .comment(row.get::<_, String>(6))
            .length(row.get(7));
        let column = if row.get::<_, bool>(4) { column.primary_key() } else { column };

        tables[slot].columns.push(column);
    }

    tracing::debug!(schema, count = tables.len(), "read PostgreSQL catalog");
    Ok(tables)
}
