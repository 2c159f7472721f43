use crate::error::{CoreError, Result};

/// Schema-qualified name of one catalog table.
///
/// Table/schema names are configuration, not user input, but they still
/// flow into `format!`-assembled SQL (dynamic table names can't go through
/// bind parameters), so they're validated once at startup rather than
/// trusted blindly. This is the "small query-builder" the design notes call
/// for in place of a reflective ORM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName {
    schema: Option<String>,
    table: String,
}

fn is_valid_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl TableName {
    pub fn new(schema: Option<&str>, table: &str) -> Result<Self> {
        if !is_valid_identifier(table) {
            return Err(CoreError::Configuration(format!(
                "invalid table name {table:?}"
            )));
        }
        if let Some(schema) = schema {
            if !is_valid_identifier(schema) {
                return Err(CoreError::Configuration(format!(
                    "invalid schema name {schema:?}"
                )));
            }
        }
        Ok(Self {
            schema: schema.map(str::to_string),
            table: table.to_string(),
        })
    }

    /// Fully qualified, already quoted for interpolation into SQL text.
    pub fn qualified(&self) -> String {
        match &self.schema {
            Some(schema) => format!("\"{schema}\".\"{}\"", self.table),
            None => format!("\"{}\"", self.table),
        }
    }
}

/// The two table names the catalog reads and writes, assembled once at
/// startup from configuration (`database.tablenames.*`).
#[derive(Debug, Clone)]
pub struct TableNames {
    pub files: TableName,
    pub events: TableName,
}

impl TableNames {
    pub fn new(
        file_schema: Option<&str>,
        file_table: &str,
        event_schema: Option<&str>,
        event_table: &str,
    ) -> Result<Self> {
        Ok(Self {
            files: TableName::new(file_schema, file_table)?,
            events: TableName::new(event_schema, event_table)?,
        })
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self::new(None, "files", None, "events").expect("default table names are valid identifiers")
    }
}
