use serde::{Deserialize, Serialize};

use crate::codegen::type_map::{map_type, ClrType};
use crate::db::Dialect;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub comment: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>, comment: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: comment.into(),
            columns: Vec::new(),
        }
    }

    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(|c| c.is_primary_key)
    }

    pub fn primary_key_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_primary_key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub native_type: String,
    pub clr_type: ClrType,
    pub is_nullable: bool,
    pub is_primary_key: bool,
    pub is_identity: bool, // recorded, not rendered
    pub comment: String,
    pub length: Option<i64>,
}

impl Column {
    /// Builds a column and resolves its target type through the dialect's mapping table.
    pub fn new(dialect: Dialect, name: impl Into<String>, native_type: impl Into<String>) -> Self {
        let native_type = native_type.into();
        Self {
            name: name.into(),
            clr_type: map_type(dialect, &native_type),
            native_type,
            is_nullable: true,
            is_primary_key: false,
            is_identity: false,
            comment: String::new(),
            length: None,
        }
    }

    /// Marks the column as part of the primary key. Nullability is left as read.
    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn nullable(mut self, is_nullable: bool) -> Self {
        self.is_nullable = is_nullable;
        self
    }

    pub fn identity(mut self, is_identity: bool) -> Self {
        self.is_identity = is_identity;
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn length(mut self, length: Option<i64>) -> Self {
        self.length = length;
        self
    }
}
