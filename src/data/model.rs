use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use crate::error::{Result, SelectivityError};

// ---------------------------------------------------------------------------
// Value – a single cell of the dataset
// ---------------------------------------------------------------------------

/// A dynamically-typed scalar cell mirroring common dataframe dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Null,
}

/// Type tag of a non-null [`Value`]. Integers and floats share `Numeric`
/// so a column mixing the two still has a single schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Numeric,
    Bool,
    String,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Numeric => write!(f, "numeric"),
            ValueType::Bool => write!(f, "bool"),
            ValueType::String => write!(f, "string"),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:?}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Null => write!(f, "null"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl Value {
    /// Try to interpret the value as an `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Schema type of the value, `None` for `Null`.
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Integer(_) | Value::Float(_) => Some(ValueType::Numeric),
            Value::Bool(_) => Some(ValueType::Bool),
            Value::String(_) => Some(ValueType::String),
            Value::Null => None,
        }
    }

    /// Order two values for predicate evaluation.
    ///
    /// Returns `None` when either side is `Null`, the kinds are not
    /// comparable, or a float comparison involves NaN.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (a, b) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        }
    }
}

// ---------------------------------------------------------------------------
// Row – one record of the dataset
// ---------------------------------------------------------------------------

/// A single row: column_name → value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub values: BTreeMap<String, Value>,
}

impl Row {
    pub fn new(values: BTreeMap<String, Value>) -> Self {
        Row { values }
    }

    /// Look up a cell by column name.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// An immutable table whose rows all share one schema.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<Row>,
    /// Ordered list of column names.
    column_names: Vec<String>,
    /// Type of each column; `None` while a column has only seen nulls.
    column_types: BTreeMap<String, Option<ValueType>>,
}

impl Dataset {
    /// Build a dataset from rows, checking every row against the schema of
    /// the first one.
    pub fn from_rows(rows: Vec<Row>) -> Result<Self> {
        let names = rows
            .first()
            .map(|first| first.values.keys().cloned().collect())
            .unwrap_or_default();
        Self::with_columns(names, rows)
    }

    /// Build a dataset whose schema is `names`, in that order.  An empty
    /// table keeps its columns; duplicate names are rejected.
    pub fn with_columns(names: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        let mut column_types: BTreeMap<String, Option<ValueType>> = BTreeMap::new();
        for name in &names {
            if column_types.insert(name.clone(), None).is_some() {
                return Err(SelectivityError::SchemaMismatch {
                    row: 0,
                    reason: format!("duplicate column '{name}'"),
                });
            }
        }

        for (i, row) in rows.iter().enumerate() {
            if row.values.len() != column_types.len()
                || !row.values.keys().all(|k| column_types.contains_key(k))
            {
                let found: Vec<&str> = row.values.keys().map(String::as_str).collect();
                let expected: Vec<&str> = column_types.keys().map(String::as_str).collect();
                return Err(SelectivityError::SchemaMismatch {
                    row: i,
                    reason: format!("columns {found:?} do not match {expected:?}"),
                });
            }
            for (col, val) in &row.values {
                let Some(ty) = val.value_type() else {
                    continue;
                };
                let slot = column_types.entry(col.clone()).or_default();
                match *slot {
                    None => *slot = Some(ty),
                    Some(existing) if existing != ty => {
                        return Err(SelectivityError::SchemaMismatch {
                            row: i,
                            reason: format!("column '{col}' is {existing} but value {val} is {ty}"),
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(Dataset {
            rows,
            column_names: names,
            column_types,
        })
    }

    /// Build a dataset from named column vectors of equal length.
    pub fn from_columns<S, V>(columns: Vec<(S, Vec<V>)>) -> Result<Self>
    where
        S: Into<String>,
        V: Into<Value>,
    {
        let columns: Vec<(String, Vec<Value>)> = columns
            .into_iter()
            .map(|(name, vals)| (name.into(), vals.into_iter().map(Into::into).collect()))
            .collect();

        let n_rows = columns.first().map(|(_, vals)| vals.len()).unwrap_or(0);
        for (name, vals) in &columns {
            if vals.len() != n_rows {
                return Err(SelectivityError::ColumnLengthMismatch {
                    column: name.clone(),
                    expected: n_rows,
                    actual: vals.len(),
                });
            }
        }

        let names = columns.iter().map(|(name, _)| name.clone()).collect();

        let mut rows = vec![Row::default(); n_rows];
        for (name, vals) in columns {
            for (row, val) in rows.iter_mut().zip(vals) {
                row.values.insert(name.clone(), val);
            }
        }
        Self::with_columns(names, rows)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_types.contains_key(name)
    }

    /// Schema type of a column, `None` if it holds only nulls.
    pub fn column_type(&self, name: &str) -> Result<Option<ValueType>> {
        self.column_types
            .get(name)
            .copied()
            .ok_or_else(|| SelectivityError::ColumnNotFound(name.to_string()))
    }

    /// Values of one column in row order.
    pub fn column(&self, name: &str) -> Result<Vec<&Value>> {
        if !self.has_column(name) {
            return Err(SelectivityError::ColumnNotFound(name.to_string()));
        }
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(name).unwrap_or(&Value::Null))
            .collect())
    }
}
