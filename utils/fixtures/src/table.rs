use std::cmp::Ordering;

use relay_paging::{Filter, FilterValue, Predicate, Row, SortDirection, SortLookup, SortValue};

/// A row the in-memory engine can filter and order.
pub trait Record: Row + Clone {
    /// Typed value of `column`, `SortValue::Null` when absent.
    fn value(&self, column: &str) -> SortValue;
}

/// Executes a [`Predicate`] the way a SQL engine would: `WHERE`, then `ORDER BY`, then `LIMIT`.
#[derive(Debug, Clone)]
pub struct MemoryTable<R> {
    name: String,
    rows: Vec<R>,
}

impl<R: Record> MemoryTable<R> {
    pub fn new(name: impl Into<String>, rows: Vec<R>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    /// Delete every row whose `column` renders as `value`.
    pub fn delete_where(&mut self, column: &str, value: &str) -> usize {
        let before = self.rows.len();
        self.rows
            .retain(|row| row.column_value(column).as_deref() != Some(value));
        before - self.rows.len()
    }

    /// Scalar subquery `(SELECT sort_column FROM source WHERE cursor_column = value)`,
    /// `NULL` when no row matches.
    pub fn lookup(&self, lookup: &SortLookup) -> SortValue {
        if lookup.source != self.name {
            return SortValue::Null;
        }
        self.sort_value_of(
            lookup.sort_column.column(),
            lookup.cursor_column.column(),
            &lookup.cursor_value,
        )
        .unwrap_or(SortValue::Null)
    }

    fn sort_value_of(
        &self,
        sort_column: &str,
        cursor_column: &str,
        cursor_value: &str,
    ) -> Option<SortValue> {
        self.rows
            .iter()
            .find(|row| row.column_value(cursor_column).as_deref() == Some(cursor_value))
            .map(|row| row.value(sort_column))
    }

    /// A resolver backed by a direct lookup in this table.
    pub fn resolver<'a>(
        &'a self,
        sort_column: &'a str,
        cursor_column: &'a str,
    ) -> impl Fn(&str) -> Option<SortValue> + 'a {
        move |cursor_value| self.sort_value_of(sort_column, cursor_column, cursor_value)
    }

    /// Rows in the physical order the predicate asks for.
    pub fn query(&self, predicate: &Predicate) -> Vec<R> {
        let threshold = match &predicate.filter {
            Filter::Noop => None,
            Filter::Compare {
                column,
                comparator,
                value,
            } => {
                let value = match value {
                    FilterValue::Lookup(lookup) => self.lookup(lookup),
                    FilterValue::Resolved(value) => value.clone(),
                };
                Some((column.column(), *comparator, value))
            }
        };

        let mut rows: Vec<R> = self
            .rows
            .iter()
            .filter(|row| match &threshold {
                None => true,
                Some((column, comparator, value)) => row
                    .value(column)
                    .compare(value)
                    .map_or(false, |ordering| comparator.accepts(ordering)),
            })
            .cloned()
            .collect();

        let order_column = predicate.order_by.column.column();
        rows.sort_by(|a, b| {
            let ordering = a
                .value(order_column)
                .compare(&b.value(order_column))
                .unwrap_or(Ordering::Equal);
            match predicate.order_by.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });

        rows.truncate(predicate.limit);
        rows
    }
}
