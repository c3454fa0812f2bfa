use serde::{Deserialize, Serialize};

use crate::db::Dialect;

/// C# type a column is surfaced as in the generated entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClrType {
    Bool,
    Byte,
    Short,
    Int,
    Long,
    UShort,
    UInt,
    ULong,
    Float,
    Double,
    Decimal,
    String,
    Bytes,
    DateTime,
    DateTimeOffset,
    TimeSpan,
    Guid,
    Object,
}

impl ClrType {
    pub fn as_str(&self) -> &str {
        match self {
            ClrType::Bool => "bool",
            ClrType::Byte => "byte",
            ClrType::Short => "short",
            ClrType::Int => "int",
            ClrType::Long => "long",
            ClrType::UShort => "ushort",
            ClrType::UInt => "uint",
            ClrType::ULong => "ulong",
            ClrType::Float => "float",
            ClrType::Double => "double",
            ClrType::Decimal => "decimal",
            ClrType::String => "string",
            ClrType::Bytes => "byte[]",
            ClrType::DateTime => "DateTime",
            ClrType::DateTimeOffset => "DateTimeOffset",
            ClrType::TimeSpan => "TimeSpan",
            ClrType::Guid => "Guid",
            ClrType::Object => "object",
        }
    }

    /// Reference types accept null already and never take a `?` suffix.
    pub fn is_nullable_by_default(&self) -> bool {
        matches!(self, ClrType::String | ClrType::Bytes | ClrType::Object)
    }
}

/// Maps a database-native column type to its C# type. Never fails: anything
/// unrecognised becomes `object`.
pub fn map_type(dialect: Dialect, native: &str) -> ClrType {
    let normalized = normalize(native);
    let mapped = match dialect {
        Dialect::PostgreSql => map_postgres(&normalized),
        Dialect::MySql => map_mysql(native, &normalized),
        Dialect::Sqlite => map_sqlite(&normalized),
        Dialect::SqlServer => map_sqlserver(&normalized),
    };

    match mapped {
        Some(ty) => ty,
        None => {
            tracing::debug!(%dialect, native, "unmapped native type, falling back to object");
            ClrType::Object
        }
    }
}

/// Lowercases, drops any `(len[,scale])` argument list and collapses whitespace.
fn normalize(native: &str) -> String {
    let lower = native.trim().to_ascii_lowercase();
    let mut stripped = String::with_capacity(lower.len());
    let mut depth = 0usize;
    for ch in lower.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => stripped.push(ch),
            _ => {}
        }
    }
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn map_postgres(ty: &str) -> Option<ClrType> {
    // udt_name for arrays is prefixed with an underscore
    if ty.starts_with('_') || ty.ends_with("[]") {
        return Some(ClrType::Object);
    }

    let mapped = match ty {
        "bool" | "boolean" => ClrType::Bool,
        "int2" | "smallint" | "smallserial" | "serial2" => ClrType::Short,
        "int4" | "int" | "integer" | "serial" | "serial4" => ClrType::Int,
        "int8" | "bigint" | "bigserial" | "serial8" | "oid" => ClrType::Long,
        "float4" | "real" => ClrType::Float,
        "float8" | "double precision" => ClrType::Double,
        "numeric" | "decimal" | "money" => ClrType::Decimal,
        "varchar" | "character varying" | "bpchar" | "char" | "character" | "text" | "citext"
        | "name" | "json" | "jsonb" | "xml" | "inet" | "cidr" | "macaddr" => ClrType::String,
        "bytea" => ClrType::Bytes,
        "timestamp" | "timestamp without time zone" | "date" => ClrType::DateTime,
        "timestamptz" | "timestamp with time zone" => ClrType::DateTimeOffset,
        "time" | "time without time zone" | "interval" => ClrType::TimeSpan,
        "uuid" => ClrType::Guid,
        _ => return None,
    };
    Some(mapped)
}

fn map_mysql(raw: &str, ty: &str) -> Option<ClrType> {
    // tinyint(1) is MySQL's boolean; the width is gone after normalisation
    let raw = raw.trim().to_ascii_lowercase();
    if raw == "tinyint(1)" || raw.starts_with("tinyint(1) ") {
        return Some(ClrType::Bool);
    }
    // bit(1) is a flag, wider bit fields hold up to 64 bits
    if ty == "bit" {
        let single = raw == "bit" || raw == "bit(1)";
        return Some(if single { ClrType::Bool } else { ClrType::ULong });
    }

    let (base, unsigned) = match ty.strip_suffix(" unsigned").or_else(|| ty.strip_suffix(" unsigned zerofill")) {
        Some(base) => (base, true),
        None => (ty, false),
    };

    let mapped = match (base, unsigned) {
        ("bool" | "boolean", _) => ClrType::Bool,
        ("tinyint", true) => ClrType::Byte,
        ("tinyint", false) | ("smallint", false) | ("year", _) => ClrType::Short,
        ("smallint", true) => ClrType::UShort,
        ("mediumint" | "int" | "integer", false) => ClrType::Int,
        ("mediumint" | "int" | "integer", true) => ClrType::UInt,
        ("bigint", false) => ClrType::Long,
        ("bigint", true) => ClrType::ULong,
        ("float", _) => ClrType::Float,
        ("double" | "double precision" | "real", _) => ClrType::Double,
        ("decimal" | "numeric" | "dec" | "fixed", _) => ClrType::Decimal,
        ("char" | "varchar" | "tinytext" | "text" | "mediumtext" | "longtext" | "enum" | "set"
        | "json", _) => ClrType::String,
        ("binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob", _) => {
            ClrType::Bytes
        }
        ("date" | "datetime" | "timestamp", _) => ClrType::DateTime,
        ("time", _) => ClrType::TimeSpan,
        _ => return None,
    };
    Some(mapped)
}

fn map_sqlite(ty: &str) -> Option<ClrType> {
    let exact = match ty {
        "" => Some(ClrType::Bytes),
        "bool" | "boolean" => Some(ClrType::Bool),
        "date" | "datetime" | "timestamp" => Some(ClrType::DateTime),
        "decimal" | "numeric" | "money" => Some(ClrType::Decimal),
        "guid" | "uuid" | "uniqueidentifier" => Some(ClrType::Guid),
        _ => None,
    };
    if exact.is_some() {
        return exact;
    }

    // Declared-type affinity rules, checked in SQLite's own order.
    if ty.contains("int") {
        Some(ClrType::Long)
    } else if ty.contains("char") || ty.contains("clob") || ty.contains("text") {
        Some(ClrType::String)
    } else if ty.contains("blob") {
        Some(ClrType::Bytes)
    } else if ty.contains("real") || ty.contains("floa") || ty.contains("doub") {
        Some(ClrType::Double)
    } else {
        None
    }
}

fn map_sqlserver(ty: &str) -> Option<ClrType> {
    let mapped = match ty {
        "bit" => ClrType::Bool,
        "tinyint" => ClrType::Byte,
        "smallint" => ClrType::Short,
        "int" => ClrType::Int,
        "bigint" => ClrType::Long,
        "real" => ClrType::Float,
        "float" => ClrType::Double,
        "decimal" | "numeric" | "money" | "smallmoney" => ClrType::Decimal,
        "char" | "varchar" | "nchar" | "nvarchar" | "text" | "ntext" | "xml" | "sysname" => {
            ClrType::String
        }
        "binary" | "varbinary" | "image" | "timestamp" | "rowversion" => ClrType::Bytes,
        "date" | "datetime" | "datetime2" | "smalldatetime" => ClrType::DateTime,
        "datetimeoffset" => ClrType::DateTimeOffset,
        "time" => ClrType::TimeSpan,
        "uniqueidentifier" => ClrType::Guid,
        _ => return None,
    };
    Some(mapped)
}
