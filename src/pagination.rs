//! One-stop handle: derive the predicate once, run the query, then hand the rows back.
//!
//! ```
//! use relay_paging::{Dataset, Pagination, PaginationRequest, PaginationSlice, SortDirection};
//!
//! let slice = PaginationSlice::forward(2, None)?;
//! let dataset = Dataset::new("posts", "creation_timestamp", SortDirection::Desc, "id");
//! let pagination = Pagination::new(PaginationRequest::new(slice, dataset))?;
//!
//! assert_eq!(pagination.limit(), 3);
//!
//! let rows = vec![
//!     serde_json::json!({ "id": "p7" }),
//!     serde_json::json!({ "id": "p6" }),
//!     serde_json::json!({ "id": "p5" }),
//! ];
//! let page = pagination.page(rows)?;
//! assert_eq!(page.edges.len(), 2);
//! assert!(page.page_info.has_next_page);
//! # Ok::<(), relay_paging::PagingError>(())
//! ```
use std::sync::Arc;

use crate::cursor::CursorCodec;
use crate::error::PagingResult;
use crate::page::{self, Page, Row};
use crate::predicate::{self, Filter, NoResolver, OrderBy, Predicate, SortValueResolver};
use crate::request::{PaginationRequest, SliceParams};
use crate::types::Column;

#[derive(Debug, Clone)]
pub struct Pagination {
    predicate: Predicate,
    slice: SliceParams,
    cursor_column: Column,
    codec: Arc<dyn CursorCodec>,
}

impl Pagination {
    /// Derive with the cursor resolved by a correlated subquery against the source.
    pub fn new(request: PaginationRequest) -> PagingResult<Self> {
        Self::build(request, None::<&NoResolver>)
    }

    /// Derive with the cursor's sort value looked up through `resolver`.
    pub fn resolved<R: SortValueResolver + ?Sized>(
        request: PaginationRequest,
        resolver: &R,
    ) -> PagingResult<Self> {
        Self::build(request, Some(resolver))
    }

    fn build<R: SortValueResolver + ?Sized>(
        request: PaginationRequest,
        resolver: Option<&R>,
    ) -> PagingResult<Self> {
        let (predicate, slice) = predicate::derive_parts(&request, resolver)?;
        let PaginationRequest { dataset, codec, .. } = request;

        Ok(Self {
            predicate,
            slice,
            cursor_column: dataset.cursor_column,
            codec,
        })
    }

    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub fn order_by(&self) -> &OrderBy {
        &self.predicate.order_by
    }

    pub fn filter(&self) -> &Filter {
        &self.predicate.filter
    }

    /// Row cap for the query, page size plus one.
    pub fn limit(&self) -> usize {
        self.predicate.limit
    }

    pub fn slice(&self) -> &SliceParams {
        &self.slice
    }

    /// Trim fetched rows, given in the order the query returned them, into the final page.
    pub fn page<R: Row>(&self, rows: Vec<R>) -> PagingResult<Page<R>> {
        page::assemble(rows, &self.slice, &self.cursor_column, self.codec.as_ref())
    }

    /// Like [`Pagination::page`], with `map` reshaping each row and returning its raw cursor value.
    pub fn page_with<R, N, F>(&self, rows: Vec<R>, map: F) -> PagingResult<Page<N>>
    where
        F: FnMut(R) -> PagingResult<(N, String)>,
    {
        page::assemble_with(rows, &self.slice, self.codec.as_ref(), map)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;
    use crate::config::MissingCursorPolicy;
    use crate::cursor::Base64Codec;
    use crate::request::{Dataset, PaginationSlice};
    use crate::types::{SortDirection, SortValue};

    fn dataset() -> Dataset {
        Dataset::new("posts", "creation_timestamp", SortDirection::Desc, "id")
    }

    #[test]
    fn handle_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Pagination>();
    }

    #[test]
    fn page_uses_the_request_codec() {
        let slice = PaginationSlice::forward(1, None).unwrap();
        let pagination = Pagination::new(PaginationRequest::new(slice, dataset())).unwrap();
        let page = pagination.page(vec![json!({ "id": "p7" })]).unwrap();

        assert_eq!(page.page_info.start_cursor, Some(Base64Codec.encode("p7")));
    }

    #[test]
    fn ignored_missing_row_pages_from_the_edge() {
        let slice = PaginationSlice::forward(1, Some(Base64Codec.encode("gone"))).unwrap();
        let request = PaginationRequest::new(slice, dataset())
            .with_missing_cursor(MissingCursorPolicy::Ignore);
        let resolver = |_: &str| None::<SortValue>;
        let pagination = Pagination::resolved(request, &resolver).unwrap();

        assert!(pagination.filter().is_noop());
        let page = pagination
            .page(vec![json!({ "id": "p7" }), json!({ "id": "p6" })])
            .unwrap();
        assert!(!page.page_info.has_previous_page);
        assert!(page.page_info.has_next_page);
    }

    #[test]
    fn page_with_keeps_flags() {
        let slice = PaginationSlice::backward(2, None).unwrap();
        let pagination = Pagination::new(PaginationRequest::new(slice, dataset())).unwrap();
        let rows = vec![json!({ "id": "p0" }), json!({ "id": "p1" })];

        let page = pagination
            .page_with(rows, |row: Value| {
                let id = row["id"].as_str().unwrap_or_default().to_owned();
                Ok((id.clone(), id))
            })
            .unwrap();

        assert_eq!(page.into_nodes(), ["p1", "p0"]);
    }
}
