//! Collection of the small value types shared by the deriver and the assembler.
use std::cmp::Ordering;
use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::error::{PagingError, PagingResult};

pub type DateTime = chrono::DateTime<Utc>;

/// Semantic order of the full, unpaginated dataset.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum SortDirection {
    #[strum(serialize = "asc")]
    Asc,
    #[strum(serialize = "desc")]
    Desc,
}

impl SortDirection {
    /// Parse a caller-supplied direction string such as `"asc"` or `"DESC"`.
    pub fn parse(s: &str) -> PagingResult<Self> {
        s.parse().map_err(|_| {
            PagingError::InvalidState(format!(
                "sort direction must be `asc` or `desc`, got `{s}`"
            ))
        })
    }

    pub fn flip(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Direction of travel through the dataset, `Backward` iff the request used `last`/`before`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceDirection {
    Forward,
    Backward,
}

/// Strict comparison applied between the sort column and the cursor row's sort value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = ">")]
    Gt,
}

impl Comparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::Lt => "<",
            Comparator::Gt => ">",
        }
    }

    /// Whether `lhs.cmp(rhs) == ordering` satisfies this comparator.
    pub fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Comparator::Lt => ordering == Ordering::Less,
            Comparator::Gt => ordering == Ordering::Greater,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A column reference.
///
/// `Aliased` is for sources that select a column under another name: the query side uses
/// `column`, while fetched rows are keyed by `alias`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Column {
    Plain(String),
    Aliased { column: String, alias: String },
}

impl Column {
    pub fn aliased(column: impl Into<String>, alias: impl Into<String>) -> Self {
        Column::Aliased {
            column: column.into(),
            alias: alias.into(),
        }
    }

    /// Name used when building the query.
    pub fn column(&self) -> &str {
        match self {
            Column::Plain(name) => name,
            Column::Aliased { column, .. } => column,
        }
    }

    /// Key under which the column appears in a fetched row.
    pub fn key(&self) -> &str {
        match self {
            Column::Plain(name) => name,
            Column::Aliased { alias, .. } => alias,
        }
    }
}

impl From<&str> for Column {
    fn from(name: &str) -> Self {
        Column::Plain(name.to_owned())
    }
}

impl From<String> for Column {
    fn from(name: String) -> Self {
        Column::Plain(name)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// A sort-column value, as handed back by a [`crate::SortValueResolver`] or read from a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SortValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime),
}

impl SortValue {
    /// SQL-style comparison: `None` when either side is `NULL` or the types don't compare.
    pub fn compare(&self, other: &SortValue) -> Option<Ordering> {
        match (self, other) {
            (SortValue::Null, _) | (_, SortValue::Null) => None,
            (SortValue::Bool(a), SortValue::Bool(b)) => Some(a.cmp(b)),
            (SortValue::Int(a), SortValue::Int(b)) => Some(a.cmp(b)),
            (SortValue::Float(a), SortValue::Float(b)) => a.partial_cmp(b),
            (SortValue::Int(a), SortValue::Float(b)) => int_float_cmp(*a, *b),
            (SortValue::Float(a), SortValue::Int(b)) => {
                int_float_cmp(*b, *a).map(Ordering::reverse)
            }
            (SortValue::Text(a), SortValue::Text(b)) => Some(a.cmp(b)),
            (SortValue::Uuid(a), SortValue::Uuid(b)) => Some(a.cmp(b)),
            (SortValue::Timestamp(a), SortValue::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SortValue::Null)
    }
}

/// Exact `i64` against `f64` comparison; casting the integer would round above 2^53.
fn int_float_cmp(int: i64, float: f64) -> Option<Ordering> {
    const TWO_POW_63: f64 = 9_223_372_036_854_775_808.0;

    if float.is_nan() {
        return None;
    }
    if float >= TWO_POW_63 {
        return Some(Ordering::Less);
    }
    if float < -TWO_POW_63 {
        return Some(Ordering::Greater);
    }
    let whole = float.trunc();
    match int.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0.partial_cmp(&(float - whole)),
        ordering => Some(ordering),
    }
}

impl From<bool> for SortValue {
    fn from(v: bool) -> Self {
        SortValue::Bool(v)
    }
}

impl From<i32> for SortValue {
    fn from(v: i32) -> Self {
        SortValue::Int(v as i64)
    }
}

impl From<i64> for SortValue {
    fn from(v: i64) -> Self {
        SortValue::Int(v)
    }
}

impl From<f64> for SortValue {
    fn from(v: f64) -> Self {
        SortValue::Float(v)
    }
}

impl From<String> for SortValue {
    fn from(v: String) -> Self {
        SortValue::Text(v)
    }
}

impl From<&str> for SortValue {
    fn from(v: &str) -> Self {
        SortValue::Text(v.to_owned())
    }
}

impl From<Uuid> for SortValue {
    fn from(v: Uuid) -> Self {
        SortValue::Uuid(v)
    }
}

impl From<DateTime> for SortValue {
    fn from(v: DateTime) -> Self {
        SortValue::Timestamp(v)
    }
}

impl<T: Into<SortValue>> From<Option<T>> for SortValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SortValue::Null, Into::into)
    }
}
