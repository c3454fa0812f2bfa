use std::collections::HashMap;
use tiberius::{Client, Row};
use tokio::net::TcpStream;
use tokio_util::compat::Compat;

use crate::db::{Column, Dialect, Table};
use crate::error::Result;

pub type SqlServerClient = Client<Compat<TcpStream>>;

const TABLES_QUERY: &str = "
    SELECT t.name AS table_name,
           CAST(COALESCE(ep.value, '') AS nvarchar(max)) AS table_comment
    FROM sys.tables t
    LEFT JOIN sys.extended_properties ep
        ON ep.class = 1
        AND ep.major_id = t.object_id
        AND ep.minor_id = 0
        AND ep.name = 'MS_Description'
    WHERE SCHEMA_NAME(t.schema_id) = @P1
      AND t.is_ms_shipped = 0
    ORDER BY t.name";

// Alias types report the system type they are declared over.
const COLUMNS_QUERY: &str = "
    SELECT t.name AS table_name,
           c.name AS column_name,
           CASE WHEN ty.is_user_defined = 1 THEN TYPE_NAME(c.system_type_id) ELSE ty.name END AS column_type,
           c.is_nullable,
           CAST(CASE WHEN pk.column_id IS NULL THEN 0 ELSE 1 END AS bit) AS is_primary_key,
           c.is_identity,
           CAST(COALESCE(ep.value, '') AS nvarchar(max)) AS column_comment,
           CAST(CASE
               WHEN c.max_length = -1 THEN NULL
               WHEN ty.name IN ('nchar', 'nvarchar') THEN c.max_length / 2
               WHEN ty.name IN ('char', 'varchar', 'binary', 'varbinary') THEN c.max_length
           END AS bigint) AS length
    FROM sys.columns c
    JOIN sys.tables t ON t.object_id = c.object_id
    JOIN sys.types ty ON ty.user_type_id = c.user_type_id
    LEFT JOIN (
        SELECT ic.object_id, ic.column_id
        FROM sys.indexes i
        JOIN sys.index_columns ic
            ON ic.object_id = i.object_id
            AND ic.index_id = i.index_id
        WHERE i.is_primary_key = 1
    ) pk ON pk.object_id = c.object_id AND pk.column_id = c.column_id
    LEFT JOIN sys.extended_properties ep
        ON ep.class = 1
        AND ep.major_id = c.object_id
        AND ep.minor_id = c.column_id
        AND ep.name = 'MS_Description'
    WHERE SCHEMA_NAME(t.schema_id) = @P1
      AND t.is_ms_shipped = 0
    ORDER BY t.name, c.column_id";

pub async fn list_tables(client: &mut SqlServerClient, schema: &str) -> Result<Vec<Table>> {
    let table_rows = client
        .query(TABLES_QUERY, &[&schema])
        .await?
        .into_first_result()
        .await?;
    let mut tables = Vec::with_capacity(table_rows.len());
    for row in &table_rows {
        tables.push(Table::new(text(row, "table_name")?, text(row, "table_comment")?));
    }

    let index: HashMap<String, usize> = tables
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name.clone(), i))
        .collect();

    let column_rows = client
        .query(COLUMNS_QUERY, &[&schema])
        .await?
        .into_first_result()
        .await?;
    for row in &column_rows {
        let Some(&slot) = index.get(&text(row, "table_name")?) else {
            continue;
        };

        let column = Column::new(Dialect::SqlServer, text(row, "column_name")?, text(row, "column_type")?)
            .nullable(flag(row, "is_nullable")?)
            .identity(flag(row, "is_identity")?)
            .comment(text(row, "column_comment")?)
            .length(row.try_get::<i64, _>("length")?);
        let column = if flag(row, "is_primary_key")? { column.primary_key() } else { column };

        tables[slot].columns.push(column);
    }

    tracing::debug!(schema, count = tables.len(), "read SQL Server catalog");
    Ok(tables)
}

fn text(row: &Row, name: &str) -> Result<String> {
    Ok(row.try_get::<&str, _>(name)?.unwrap_or_default().to_string())
}

fn flag(row: &Row, name: &str) -> Result<bool> {
    Ok(row.try_get::<bool, _>(name)?.unwrap_or(false))
}
