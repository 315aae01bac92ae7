//! Page assembly: trims over-fetched rows to the requested page and derives Relay page info.
//!
//! Rows must arrive in the physical order the derived predicate fetched them in. Backward pages
//! are fetched in reverse, so they are flipped back here; callers never reorder rows themselves.
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use serde_json::{Map, Value};

use crate::cursor::{Cursor, CursorCodec};
use crate::error::{PagingError, PagingResult};
use crate::request::SliceParams;
use crate::types::{Column, SliceDirection};

/// A fetched row that can report the string form of a column value.
pub trait Row {
    fn column_value(&self, key: &str) -> Option<String>;
}

fn json_scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

impl Row for Map<String, Value> {
    fn column_value(&self, key: &str) -> Option<String> {
        self.get(key).and_then(json_scalar)
    }
}

impl Row for Value {
    fn column_value(&self, key: &str) -> Option<String> {
        self.get(key).and_then(json_scalar)
    }
}

impl<V: ToString> Row for HashMap<String, V> {
    fn column_value(&self, key: &str) -> Option<String> {
        self.get(key).map(ToString::to_string)
    }
}

impl<V: ToString> Row for BTreeMap<String, V> {
    fn column_value(&self, key: &str) -> Option<String> {
        self.get(key).map(ToString::to_string)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge<N> {
    pub node: N,
    pub cursor: Cursor,
}

/// Relay `PageInfo`. Both cursors are `None` when the page has no edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub start_cursor: Option<Cursor>,
    pub end_cursor: Option<Cursor>,
    pub has_previous_page: bool,
    pub has_next_page: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<N> {
    pub edges: Vec<Edge<N>>,
    pub page_info: PageInfo,
}

impl<N> Page<N> {
    pub fn empty() -> Self {
        Self {
            edges: vec![],
            page_info: PageInfo::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.edges.iter().map(|e| &e.node)
    }

    pub fn into_nodes(self) -> Vec<N> {
        self.edges.into_iter().map(|e| e.node).collect()
    }

    /// Reshape every node, keeping cursors and page info.
    pub fn map<M, F>(self, mut f: F) -> Page<M>
    where
        F: FnMut(N) -> M,
    {
        Page {
            edges: self
                .edges
                .into_iter()
                .map(|e| Edge {
                    node: f(e.node),
                    cursor: e.cursor,
                })
                .collect(),
            page_info: self.page_info,
        }
    }
}

/// Build a page whose cursors come from each row's `cursor_column`.
pub fn assemble<R: Row>(
    rows: Vec<R>,
    slice: &SliceParams,
    cursor_column: &Column,
    codec: &dyn CursorCodec,
) -> PagingResult<Page<R>> {
    let key = cursor_column.key();
    assemble_with(rows, slice, codec, |row| {
        let value = row.column_value(key).ok_or_else(|| {
            PagingError::ContractViolation(format!("row has no value for cursor column `{key}`"))
        })?;
        Ok((row, value))
    })
}

/// Build a page with a mapper that reshapes each row and yields its raw cursor value.
pub fn assemble_with<R, N, F>(
    mut rows: Vec<R>,
    slice: &SliceParams,
    codec: &dyn CursorCodec,
    mut map: F,
) -> PagingResult<Page<N>>
where
    F: FnMut(R) -> PagingResult<(N, String)>,
{
    if rows.is_empty() {
        tracing::debug!(slice = ?slice.direction(), "assembled empty page");
        return Ok(Page::empty());
    }

    let fetched = rows.len();
    if fetched > slice.fetch_limit() {
        return Err(PagingError::ContractViolation(format!(
            "received {fetched} rows, the predicate allows at most {}",
            slice.fetch_limit()
        )));
    }

    let has_extra = fetched > slice.limit();
    let direction = slice.direction();

    // rows run away from the cursor in both directions, so the sentinel is always last
    if has_extra {
        rows.pop();
    }

    if direction == SliceDirection::Backward {
        rows.reverse();
    }

    let (has_previous_page, has_next_page) = match direction {
        SliceDirection::Forward => (slice.has_cursor(), has_extra),
        SliceDirection::Backward => (has_extra, slice.has_cursor()),
    };

    let edges = rows
        .into_iter()
        .map(|row| {
            let (node, value) = map(row)?;
            Ok(Edge {
                node,
                cursor: codec.encode(&value),
            })
        })
        .collect::<PagingResult<Vec<_>>>()?;

    tracing::debug!(
        slice = ?direction,
        fetched,
        has_extra,
        edges = edges.len(),
        "assembled page"
    );

    let page_info = PageInfo {
        start_cursor: edges.first().map(|e| e.cursor.clone()),
        end_cursor: edges.last().map(|e| e.cursor.clone()),
        has_previous_page,
        has_next_page,
    };

    Ok(Page { edges, page_info })
}
