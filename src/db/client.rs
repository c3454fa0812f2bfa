use sqlx::{Connection as _, MySqlConnection, SqliteConnection};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_postgres::{Client, NoTls};
use tokio_util::compat::TokioAsyncWriteCompatExt;

use crate::db::sqlserver::SqlServerClient;
use crate::db::{mysql, postgres, sqlite, sqlserver, Dialect, Table};
use crate::error::Result;

/// An open handle to one of the supported databases.
///
/// Callers own the handle for exactly as long as the catalog is being read and
/// must hand it back through [`Connection::close`].
pub enum Connection {
    Postgres {
        client: Client,
        driver: JoinHandle<()>,
        schema: String,
    },
    MySql(MySqlConnection),
    Sqlite(SqliteConnection),
    SqlServer {
        client: SqlServerClient,
        schema: String,
    },
}

impl Connection {
    pub async fn open(dialect: Dialect, connection_string: &str, schema: &str) -> Result<Self> {
        tracing::debug!(%dialect, "opening database connection");
        let conn = match dialect {
            Dialect::PostgreSql => {
                let (client, connection) = tokio_postgres::connect(connection_string, NoTls).await?;

                // Keep connection alive in background task
                let driver = tokio::spawn(async move {
                    if let Err(e) = connection.await {
                        tracing::error!(error = %e, "database connection error");
                    }
                });

                Connection::Postgres {
                    client,
                    driver,
                    schema: schema.to_string(),
                }
            }
            Dialect::MySql => Connection::MySql(MySqlConnection::connect(connection_string).await?),
            Dialect::Sqlite => Connection::Sqlite(SqliteConnection::connect(connection_string).await?),
            Dialect::SqlServer => {
                // ADO.NET style: "server=tcp:host,1433;user=..;password=..;database=.."
                let config = tiberius::Config::from_ado_string(connection_string)?;
                let tcp = TcpStream::connect(config.get_addr()).await?;
                tcp.set_nodelay(true)?;
                let client = tiberius::Client::connect(config, tcp.compat_write()).await?;

                Connection::SqlServer {
                    client,
                    schema: schema.to_string(),
                }
            }
        };
        Ok(conn)
    }

    pub fn dialect(&self) -> Dialect {
        match self {
            Connection::Postgres { .. } => Dialect::PostgreSql,
            Connection::MySql(_) => Dialect::MySql,
            Connection::Sqlite(_) => Dialect::Sqlite,
            Connection::SqlServer { .. } => Dialect::SqlServer,
        }
    }

    /// Every table with its columns in declaration order, tables sorted by name.
    pub async fn list_tables(&mut self) -> Result<Vec<Table>> {
        match self {
            Connection::Postgres { client, schema, .. } => postgres::list_tables(client, schema).await,
            Connection::MySql(conn) => mysql::list_tables(conn).await,
            Connection::Sqlite(conn) => sqlite::list_tables(conn).await,
            Connection::SqlServer { client, schema } => sqlserver::list_tables(client, schema).await,
        }
    }

    /// Releases the handle. Close errors are logged, not returned.
    pub async fn close(self) {
        let dialect = self.dialect();
        match self {
            Connection::Postgres { client, driver, .. } => {
                // dropping the client ends the connection task
                drop(client);
                if let Err(e) = driver.await {
                    tracing::warn!(error = %e, "connection task did not shut down cleanly");
                }
            }
            Connection::MySql(conn) => {
                if let Err(e) = conn.close().await {
                    tracing::warn!(error = %e, "failed to close MySQL connection");
                }
            }
            Connection::Sqlite(conn) => {
                if let Err(e) = conn.close().await {
                    tracing::warn!(error = %e, "failed to close SQLite connection");
                }
            }
            Connection::SqlServer { client, .. } => {
                if let Err(e) = client.close().await {
                    tracing::warn!(error = %e, "failed to close SQL Server connection");
                }
            }
        }
        tracing::debug!(%dialect, "database connection closed");
    }
}

/// Opens a connection, lists the tables and closes the connection again on
/// every path, so no handle outlives the catalog read.
pub async fn list_tables_scoped(
    dialect: Dialect,
    connection_string: &str,
    schema: &str,
) -> Result<Vec<Table>> {
    let mut conn = Connection::open(dialect, connection_string, schema).await?;
    let listed = conn.list_tables().await;
    conn.close().await;
    listed
}
