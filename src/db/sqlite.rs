use sqlx::{Row, SqliteConnection};

use crate::db::{Column, Dialect, Table};
use crate::error::Result;

const TABLES_QUERY: &str = "
    SELECT name
    FROM sqlite_master
    WHERE type = 'table'
      AND name NOT LIKE 'sqlite_%'
    ORDER BY name";

const COLUMNS_QUERY: &str = r#"
    SELECT name, type, "notnull", pk
    FROM pragma_table_info(?1)
    ORDER BY cid"#;

pub async fn list_tables(conn: &mut SqliteConnection) -> Result<Vec<Table>> {
    let names: Vec<String> = sqlx::query_scalar(TABLES_QUERY).fetch_all(&mut *conn).await?;

    let mut tables = Vec::with_capacity(names.len());
    for name in names {
        let rows = sqlx::query(COLUMNS_QUERY)
            .bind(name.as_str())
            .fetch_all(&mut *conn)
            .await?;

        let pk_count = rows
            .iter()
            .filter(|row| row.try_get::<i64, _>("pk").map(|pk| pk > 0).unwrap_or(false))
            .count();

        // SQLite has no catalog comments.
        let mut table = Table::new(name, "");
        for row in &rows {
            let declared: String = row.try_get("type")?;
            let is_pk = row.try_get::<i64, _>("pk")? > 0;
            // a lone INTEGER PRIMARY KEY aliases the rowid
            let is_identity = is_pk && pk_count == 1 && declared.eq_ignore_ascii_case("integer");

            let column = Column::new(Dialect::Sqlite, row.try_get::<String, _>("name")?, declared.as_str())
                .nullable(row.try_get::<i64, _>("notnull")? == 0)
                .identity(is_identity)
                .length(declared_length(&declared));
            let column = if is_pk { column.primary_key() } else { column };
            table.columns.push(column);
        }
        tables.push(table);
    }

    tracing::debug!(count = tables.len(), "read SQLite catalog");
    Ok(tables)
}

/// `VARCHAR(50)` -> `Some(50)`; anything without a single integer argument -> `None`.
fn declared_length(declared: &str) -> Option<i64> {
    let open = declared.find('(')?;
    let close = declared[open..].find(')')? + open;
    declared[open + 1..close].trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::type_map::ClrType;
    use sqlx::Connection;

    #[test]
    fn test_declared_length() {
        assert_eq!(declared_length("VARCHAR(50)"), Some(50));
        assert_eq!(declared_length("NVARCHAR( 10 )"), Some(10));
        assert_eq!(declared_length("DECIMAL(10,2)"), None);
        assert_eq!(declared_length("TEXT"), None);
    }

    #[tokio::test]
    async fn test_list_tables_reads_columns_in_order() {
        let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        sqlx::query(
            "CREATE TABLE Person (
                PersonId INTEGER PRIMARY KEY,
                Name VARCHAR(40) NOT NULL,
                Shape geometry,
                Score REAL
            )",
        )
        .execute(&mut conn)
        .await
        .unwrap();
        sqlx::query("CREATE TABLE Audit (Message TEXT)")
            .execute(&mut conn)
            .await
            .unwrap();

        let tables = list_tables(&mut conn).await.unwrap();
        let names: Vec<_> = tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Audit", "Person"]);

        let person = &tables[1];
        let columns: Vec<_> = person.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(columns, ["PersonId", "Name", "Shape", "Score"]);

        let id = &person.columns[0];
        assert!(id.is_primary_key && id.is_identity);
        // rowid aliases report notnull = 0
        assert!(id.is_nullable);
        assert_eq!(id.clr_type, ClrType::Long);

        let name = &person.columns[1];
        assert!(!name.is_nullable);
        assert_eq!(name.length, Some(40));
        assert_eq!(name.clr_type, ClrType::String);

        assert_eq!(person.columns[2].clr_type, ClrType::Object);
        assert!(person.columns[3].is_nullable);
        assert!(!tables[0].has_primary_key());
    }
}
