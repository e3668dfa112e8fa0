//! The fixed table catalog.
//!
//! Each [`TableId`] variant carries the column layout used both to create the
//! table and to validate records bound for it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};
use crate::kind::PortableKind;
use crate::record::Scalar;

/// One column of a fixed layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: PortableKind,
    pub sql_type: &'static str,
    pub nullable: bool,
    pub primary_key: bool,
    /// Maximum length in characters for bounded text columns.
    pub max_len: Option<usize>,
}

impl ColumnSpec {
    const fn key(name: &'static str) -> Self {
        Self {
            name,
            kind: PortableKind::Integer,
            sql_type: "INTEGER",
            nullable: false,
            primary_key: true,
            max_len: None,
        }
    }

    const fn required_text(name: &'static str, sql_type: &'static str, max_len: Option<usize>) -> Self {
        Self {
            name,
            kind: PortableKind::Text,
            sql_type,
            nullable: false,
            primary_key: false,
            max_len,
        }
    }

    const fn optional_integer(name: &'static str) -> Self {
        Self {
            name,
            kind: PortableKind::Integer,
            sql_type: "INTEGER",
            nullable: true,
            primary_key: false,
            max_len: None,
        }
    }

    /// Column definition for `CREATE TABLE`.
    pub fn definition(&self) -> String {
        let mut definition = format!("\"{}\" {}", self.name, self.sql_type);
        if self.primary_key {
            definition.push_str(" PRIMARY KEY");
        } else if !self.nullable {
            definition.push_str(" NOT NULL");
        }
        definition
    }

    /// Conform a value to this column, or explain why it does not fit.
    pub fn conform(&self, value: Option<&Scalar>) -> Result<Scalar, String> {
        let value = match value {
            None | Some(Scalar::Null) if self.nullable => return Ok(Scalar::Null),
            None => return Err(format!("missing required field '{}'", self.name)),
            Some(Scalar::Null) => return Err(format!("field '{}' cannot be null", self.name)),
            Some(value) => coerce(self.kind, value.clone()),
        };

        if value.kind() != Some(self.kind) {
            return Err(format!(
                "field '{}' expects {}, found {}",
                self.name,
                self.kind,
                value.type_name()
            ));
        }

        if let (Some(max), Scalar::Text(text)) = (self.max_len, &value) {
            let length = text.chars().count();
            if length > max {
                return Err(format!(
                    "field '{}' is {} characters long, limit is {}",
                    self.name, length, max
                ));
            }
        }

        Ok(value)
    }
}

fn coerce(kind: PortableKind, value: Scalar) -> Scalar {
    match (kind, value) {
        // JSON numbers like 3.0 arrive as floats.
        (PortableKind::Integer, Scalar::Float(f))
            if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 =>
        {
            Scalar::Integer(f as i64)
        }
        // Text columns only take text from callers.
        (PortableKind::Text, value) => value,
        (kind, value) => value.canonicalize(kind),
    }
}

/// Column layout of a catalog table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableLayout {
    pub table: TableId,
    pub columns: &'static [ColumnSpec],
}

impl TableLayout {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.name)
    }

    /// The fixed creation statement.
    pub fn create_table_sql(&self) -> String {
        let columns = self
            .columns
            .iter()
            .map(ColumnSpec::definition)
            .collect::<Vec<_>>()
            .join(", ");
        format!("CREATE TABLE IF NOT EXISTS \"{}\" ({})", self.table, columns)
    }
}

const HIRED_EMPLOYEES_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::key("id"),
    ColumnSpec::required_text("name", "TEXT", None),
    ColumnSpec::required_text("datetime", "TEXT", None),
    ColumnSpec::optional_integer("department_id"),
    ColumnSpec::optional_integer("job_id"),
];

const DEPARTMENTS_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::key("id"),
    ColumnSpec::required_text("department", "VARCHAR(50)", Some(50)),
];

const JOBS_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec::key("id"),
    ColumnSpec::required_text("job", "VARCHAR(50)", Some(50)),
];

/// A table identity from the fixed catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableId {
    HiredEmployees,
    Departments,
    Jobs,
}

impl TableId {
    pub const ALL: [TableId; 3] = [Self::HiredEmployees, Self::Departments, Self::Jobs];

    /// Resolve a table name, failing with [`CoreError::UnknownTable`].
    pub fn parse(name: &str) -> CoreResult<Self> {
        match name {
            "hired_employees" => Ok(Self::HiredEmployees),
            "departments" => Ok(Self::Departments),
            "jobs" => Ok(Self::Jobs),
            other => Err(CoreError::UnknownTable {
                table: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HiredEmployees => "hired_employees",
            Self::Departments => "departments",
            Self::Jobs => "jobs",
        }
    }

    /// Singular record noun used in status messages.
    pub fn record_label(&self) -> &'static str {
        match self {
            Self::HiredEmployees => "Employee",
            Self::Departments => "Department",
            Self::Jobs => "Job",
        }
    }

    pub fn layout(&self) -> TableLayout {
        let columns = match self {
            Self::HiredEmployees => HIRED_EMPLOYEES_COLUMNS,
            Self::Departments => DEPARTMENTS_COLUMNS,
            Self::Jobs => JOBS_COLUMNS,
        };
        TableLayout {
            table: *self,
            columns,
        }
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TableId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
