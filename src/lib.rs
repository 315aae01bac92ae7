//! Relay-style cursor pagination over relational sources.
//!
//! Two pure steps wrap the caller's own query:
//!
//! 1. [`derive`] turns `first`/`after` or `last`/`before` plus a sort order into an
//!    ordering, a filter and a row limit (page size + 1).
//! 2. [`assemble`] turns the rows that query returned, in the order it returned them, into a
//!    [`Page`] of edges with Relay page info.
//!
//! [`Pagination`] bundles both steps behind one handle.
pub mod config;
pub mod cursor;
pub mod error;
pub mod logging;
pub mod page;
pub mod pagination;
pub mod predicate;
pub mod request;
pub mod types;

pub use config::{CodecKind, MissingCursorPolicy, PagingConfig};
pub use cursor::{Base64Codec, Base64UrlCodec, Cursor, CursorCodec, CursorError, IdentityCodec};
pub use error::{PagingError, PagingResult};
pub use page::{assemble, assemble_with, Edge, Page, PageInfo, Row};
pub use pagination::Pagination;
pub use predicate::{
    derive, derive_resolved, Filter, FilterValue, OrderBy, Predicate, SortLookup,
    SortValueResolver,
};
pub use request::{Dataset, PaginationRequest, PaginationSlice, RelayArgs, SliceParams};
pub use types::{Column, Comparator, SliceDirection, SortDirection, SortValue};

pub mod prelude {
    pub use crate::{
        Column, Cursor, CursorCodec, Dataset, Page, Pagination, PaginationRequest,
        PaginationSlice, PagingError, PagingResult, Row, SortDirection, SortValue,
    };
}
