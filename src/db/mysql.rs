use sqlx::{MySqlConnection, Row};
use std::collections::HashMap;

use crate::db::{Column, Dialect, Table};
use crate::error::Result;

// information_schema columns come back as VARBINARY on some servers, hence the casts.
const TABLES_QUERY: &str = "
    SELECT CAST(TABLE_NAME AS CHAR) AS table_name,
           CAST(COALESCE(TABLE_COMMENT, '') AS CHAR) AS table_comment
    FROM information_schema.TABLES
    WHERE TABLE_SCHEMA = DATABASE()
      AND TABLE_TYPE = 'BASE TABLE'
    ORDER BY TABLE_NAME";

const COLUMNS_QUERY: &str = "
    SELECT CAST(TABLE_NAME AS CHAR) AS table_name,
           CAST(COLUMN_NAME AS CHAR) AS column_name,
           CAST(COLUMN_TYPE AS CHAR) AS column_type,
           CAST(IS_NULLABLE = 'YES' AS SIGNED) AS is_nullable,
           CAST(COLUMN_KEY = 'PRI' AS SIGNED) AS is_primary_key,
           CAST(EXTRA LIKE '%auto_increment%' AS SIGNED) AS is_identity,
           CAST(COALESCE(COLUMN_COMMENT, '') AS CHAR) AS column_comment,
           CAST(CHARACTER_MAXIMUM_LENGTH AS SIGNED) AS length
    FROM information_schema.COLUMNS
    WHERE TABLE_SCHEMA = DATABASE()
    ORDER BY TABLE_NAME, ORDINAL_POSITION";

pub async fn list_tables(conn: &mut MySqlConnection) -> Result<Vec<Table>> {
    let table_rows = sqlx::query(TABLES_QUERY).fetch_all(&mut *conn).await?;
    let mut tables = Vec::with_capacity(table_rows.len());
    for row in &table_rows {
        tables.push(Table::new(
            row.try_get::<String, _>("table_name")?,
            row.try_get::<String, _>("table_comment")?,
        ));
    }

    let index: HashMap<String, usize> = tables
        .iter()
        .enumerate()
        .map(|(i, t)| (t.name.clone(), i))
        .collect();

    let column_rows = sqlx::query(COLUMNS_QUERY).fetch_all(&mut *conn).await?;
    for row in &column_rows {
        let table_name: String = row.try_get("table_name")?;
        let Some(&slot) = index.get(&table_name) else {
            continue;
        };

        let column = Column::new(
            Dialect::MySql,
            row.try_get::<String, _>("column_name")?,
            row.try_get::<String, _>("column_type")?,
        )
        .nullable(row.try_get::<i64, _>("is_nullable")? != 0)
        .identity(row.try_get::<i64, _>("is_identity")? != 0)
        .comment(row.try_get::<String, _>("column_comment")?)
        .length(row.try_get::<Option<i64>, _>("length")?);
        let column = if row.try_get::<i64, _>("is_primary_key")? != 0 {
            column.primary_key()
        } else {
            column
        };

        tables[slot].columns.push(column);
    }

    tracing::debug!(count = tables.len(), "read MySQL catalog");
    Ok(tables)
}
