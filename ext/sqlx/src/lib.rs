//! Renders a derived [`Predicate`] into a Postgres [`QueryBuilder`].
//!
//! ```
//! use relay_paging::{derive, Dataset, PaginationRequest, PaginationSlice, SortDirection};
//! use relay_paging_sqlx::QueryBuilderExt;
//! use sqlx::{Postgres, QueryBuilder};
//!
//! let slice = PaginationSlice::forward(10, None)?;
//! let dataset = Dataset::new("posts", "creation_timestamp", SortDirection::Desc, "id");
//! let predicate = derive(&PaginationRequest::new(slice, dataset))?;
//!
//! let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM posts");
//! qb.push_paging(&predicate);
//! assert_eq!(
//!     qb.sql(),
//!     r#"SELECT * FROM posts WHERE TRUE ORDER BY "creation_timestamp" DESC LIMIT $1"#
//! );
//! # Ok::<(), relay_paging::PagingError>(())
//! ```
pub use sqlx;

use relay_paging::{Filter, FilterValue, OrderBy, Predicate, SortDirection, SortValue};
use sqlx::{Postgres, QueryBuilder};

/// Quote a column or table reference, one identifier per dotted segment.
pub fn quote_ident(reference: &str) -> String {
    reference
        .split('.')
        .map(|segment| format!("\"{}\"", segment.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(".")
}

/// Extension trait adding the clauses of a [`Predicate`] to a query under construction.
pub trait QueryBuilderExt {
    /// Push the boolean condition, without the `WHERE` keyword.
    fn push_filter(&mut self, filter: &Filter) -> &mut Self;

    /// Push `"column" ASC|DESC`, without the `ORDER BY` keyword.
    fn push_order_by(&mut self, order_by: &OrderBy) -> &mut Self;

    /// Push the bound row cap, without the `LIMIT` keyword.
    fn push_limit(&mut self, limit: usize) -> &mut Self;

    /// Push ` WHERE … ORDER BY … LIMIT …` in one go.
    fn push_paging(&mut self, predicate: &Predicate) -> &mut Self;
}

impl<'args> QueryBuilderExt for QueryBuilder<'args, Postgres> {
    fn push_filter(&mut self, filter: &Filter) -> &mut Self {
        match filter {
            Filter::Noop => {
                self.push("TRUE");
            }
            Filter::Compare {
                column,
                comparator,
                value,
            } => {
                self.push(quote_ident(column.column()))
                    .push(format!(" {comparator} "));
                match value {
                    FilterValue::Lookup(lookup) => {
                        // the cursor value travels as text whatever the key column's type
                        self.push(format!(
                            "(SELECT {} FROM {} WHERE {}::text = ",
                            quote_ident(lookup.sort_column.column()),
                            quote_ident(&lookup.source),
                            quote_ident(lookup.cursor_column.column()),
                        ))
                        .push_bind(lookup.cursor_value.clone())
                        .push(")");
                    }
                    FilterValue::Resolved(value) => {
                        push_sort_value(self, value.clone());
                    }
                }
            }
        }
        tracing::trace!(sql = self.sql(), "pushed pagination filter");
        self
    }

    fn push_order_by(&mut self, order_by: &OrderBy) -> &mut Self {
        let direction = match order_by.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };
        self.push(format!(
            "{} {direction}",
            quote_ident(order_by.column.column())
        ))
    }

    fn push_limit(&mut self, limit: usize) -> &mut Self {
        self.push_bind(i64::try_from(limit).unwrap_or(i64::MAX))
    }

    fn push_paging(&mut self, predicate: &Predicate) -> &mut Self {
        self.push(" WHERE ");
        self.push_filter(&predicate.filter);
        self.push(" ORDER BY ");
        self.push_order_by(&predicate.order_by);
        self.push(" LIMIT ");
        self.push_limit(predicate.limit)
    }
}

fn push_sort_value(qb: &mut QueryBuilder<'_, Postgres>, value: SortValue) {
    match value {
        SortValue::Null => qb.push_bind(None::<String>),
        SortValue::Bool(v) => qb.push_bind(v),
        SortValue::Int(v) => qb.push_bind(v),
        SortValue::Float(v) => qb.push_bind(v),
        SortValue::Text(v) => qb.push_bind(v),
        SortValue::Uuid(v) => qb.push_bind(v),
        SortValue::Timestamp(v) => qb.push_bind(v),
    };
}
