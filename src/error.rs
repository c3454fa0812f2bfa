use thiserror::Error;

/// Fatal configuration problems, raised before any I/O happens.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no connection string configured; set connection_string, --connection-string or DATABASE_URL")]
    MissingConnectionString,
    #[error("no database type configured; set db_type or --db-type")]
    MissingDbType,
    #[error("unknown database type `{0}` (expected postgresql, mysql, sqlite or sqlserver)")]
    UnknownDbType(String),
}

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PostgreSQL error: {0}")]
    Database(#[from] tokio_postgres::Error),

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("SQL Server error: {0}")]
    SqlServer(#[from] tiberius::error::Error),

    #[error("template `{0}` not found")]
    TemplateNotFound(String),

    #[error("table `{table}` has a composite primary key ({}); only single-column keys are supported", columns.join(", "))]
    CompositeKey { table: String, columns: Vec<String> },
}

pub type Result<T> = std::result::Result<T, GenerateError>;
