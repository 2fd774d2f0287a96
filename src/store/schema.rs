//! Table definitions for the ledger database

/// Column data type
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnType {
    Integer,
    Text,
}

/// Column definition; every ledger column is NOT NULL
#[derive(Debug, Clone)]
pub struct Column {
    pub name: &'static str,
    pub col_type: ColumnType,
    /// SQL literal used as DEFAULT
    pub default: Option<&'static str>,
}

impl Column {
    pub const fn new(name: &'static str, col_type: ColumnType) -> Self {
        Self {
            name,
            col_type,
            default: None,
        }
    }

    pub const fn default_value(self, literal: &'static str) -> Self {
        Self {
            default: Some(literal),
            ..self
        }
    }
}

/// Primary key flavour of a table
#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryKey {
    /// Caller supplies the key
    Natural(&'static str),
    /// SQLite assigns increasing row ids
    AutoIncrement(&'static str),
}

/// Foreign key reference
#[derive(Debug, Clone)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references_table: &'static str,
    pub references_column: &'static str,
    pub cascade_delete: bool,
}

impl ForeignKey {
    pub const fn new(
        column: &'static str,
        references_table: &'static str,
        references_column: &'static str,
    ) -> Self {
        Self {
            column,
            references_table,
            references_column,
            cascade_delete: false,
        }
    }

    /// Delete child rows together with the referenced row
    pub const fn on_delete_cascade(self) -> Self {
        Self {
            cascade_delete: true,
            ..self
        }
    }
}

/// Table schema definition
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub name: &'static str,
    pub primary_key: PrimaryKey,
    pub columns: &'static [Column],
    pub foreign_keys: &'static [ForeignKey],
}

// =============================================================================
// Tables
// =============================================================================

pub static USERS: TableSchema = TableSchema {
    name: "users",
    primary_key: PrimaryKey::Natural("user_id"),
    columns: &[
        Column::new("user_id", ColumnType::Integer),
        Column::new("coins", ColumnType::Integer).default_value("0"),
    ],
    foreign_keys: &[],
};

pub static USER_CHARS: TableSchema = TableSchema {
    name: "user_chars",
    primary_key: PrimaryKey::AutoIncrement("id"),
    columns: &[
        Column::new("id", ColumnType::Integer),
        Column::new("user_id", ColumnType::Integer),
        Column::new("char_id", ColumnType::Text),
        Column::new("char_name", ColumnType::Text),
        Column::new("rarity", ColumnType::Text),
    ],
    foreign_keys: &[ForeignKey::new("user_id", "users", "user_id").on_delete_cascade()],
};

/// All tables, parents before children
pub static ALL_TABLES: &[&TableSchema] = &[&USERS, &USER_CHARS];
