//! Predicate derivation: turns a [`PaginationRequest`] into the ordering, filter and row limit a
//! caller runs against its query engine.
use std::collections::HashMap;

use serde::Serialize;

use crate::config::MissingCursorPolicy;
use crate::error::{PagingError, PagingResult};
use crate::request::{Classified, PaginationRequest, SliceParams};
use crate::types::{Column, Comparator, SliceDirection, SortDirection, SortValue};

/// Operator selecting rows strictly beyond the cursor in the physical traversal direction.
const COMPARATORS: [(SortDirection, SliceDirection, Comparator); 4] = [
    (SortDirection::Desc, SliceDirection::Forward, Comparator::Lt),
    (SortDirection::Desc, SliceDirection::Backward, Comparator::Gt),
    (SortDirection::Asc, SliceDirection::Forward, Comparator::Gt),
    (SortDirection::Asc, SliceDirection::Backward, Comparator::Lt),
];

pub fn comparator(sort: SortDirection, slice: SliceDirection) -> PagingResult<Comparator> {
    COMPARATORS
        .iter()
        .find(|(s, d, _)| *s == sort && *d == slice)
        .map(|(_, _, op)| *op)
        .ok_or_else(|| {
            PagingError::InvalidState(format!("no comparator for {sort} sort paging {slice:?}"))
        })
}

/// Order rows are fetched in, so the over-fetched row lands at the far end of the page.
pub fn physical_order(sort: SortDirection, slice: SliceDirection) -> SortDirection {
    match slice {
        SliceDirection::Forward => sort,
        SliceDirection::Backward => sort.flip(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBy {
    pub column: Column,
    pub direction: SortDirection,
}

/// Correlated lookup of the cursor row's current sort value:
/// `(SELECT sort_column FROM source WHERE cursor_column = cursor_value)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortLookup {
    pub source: String,
    pub sort_column: Column,
    pub cursor_column: Column,
    pub cursor_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterValue {
    Lookup(SortLookup),
    Resolved(SortValue),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    /// Matches every row.
    Noop,
    Compare {
        column: Column,
        comparator: Comparator,
        value: FilterValue,
    },
}

impl Filter {
    pub fn is_noop(&self) -> bool {
        matches!(self, Filter::Noop)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Predicate {
    pub order_by: OrderBy,
    /// Page size plus one.
    pub limit: usize,
    #[serde(rename = "where")]
    pub filter: Filter,
}

/// Resolves a decoded cursor value to the sort value of the row it identifies.
///
/// Stands in for the correlated subquery when the caller has a cache or can look the row up
/// directly. `Ok(None)` means the row no longer exists.
pub trait SortValueResolver {
    fn resolve(&self, cursor_value: &str) -> PagingResult<Option<SortValue>>;
}

impl<F> SortValueResolver for F
where
    F: Fn(&str) -> Option<SortValue>,
{
    fn resolve(&self, cursor_value: &str) -> PagingResult<Option<SortValue>> {
        Ok(self(cursor_value))
    }
}

impl SortValueResolver for HashMap<String, SortValue> {
    fn resolve(&self, cursor_value: &str) -> PagingResult<Option<SortValue>> {
        Ok(self.get(cursor_value).cloned())
    }
}

/// Derive ordering, filter and limit, resolving the cursor with a correlated subquery.
pub fn derive(request: &PaginationRequest) -> PagingResult<Predicate> {
    derive_parts(request, None::<&NoResolver>).map(|(predicate, _)| predicate)
}

/// Derive ordering, filter and limit, resolving the cursor's sort value up front.
pub fn derive_resolved<R: SortValueResolver + ?Sized>(
    request: &PaginationRequest,
    resolver: &R,
) -> PagingResult<Predicate> {
    derive_parts(request, Some(resolver)).map(|(predicate, _)| predicate)
}

pub(crate) fn derive_parts<R: SortValueResolver + ?Sized>(
    request: &PaginationRequest,
    resolver: Option<&R>,
) -> PagingResult<(Predicate, SliceParams)> {
    let Classified {
        slice,
        cursor_value,
    } = request.classify()?;
    let dataset = &request.dataset;

    let direction = physical_order(dataset.sort_direction, slice.direction());
    let op = comparator(dataset.sort_direction, slice.direction())?;

    let (filter, slice) = match (cursor_value, resolver) {
        (None, _) => (Filter::Noop, slice),
        (Some(cursor_value), None) => {
            let lookup = SortLookup {
                source: dataset.source.clone(),
                sort_column: dataset.sort_column.clone(),
                cursor_column: dataset.cursor_column.clone(),
                cursor_value,
            };
            (compare(request, op, FilterValue::Lookup(lookup)), slice)
        }
        (Some(cursor_value), Some(resolver)) => match resolver.resolve(&cursor_value)? {
            Some(value) => (compare(request, op, FilterValue::Resolved(value)), slice),
            None => match request.missing_cursor {
                MissingCursorPolicy::Reject => {
                    return Err(PagingError::CursorNotFound(format!(
                        "no row in `{}` where {} = `{cursor_value}`",
                        dataset.source, dataset.cursor_column
                    )))
                }
                MissingCursorPolicy::Ignore => {
                    tracing::warn!(
                        cursor_value = %cursor_value,
                        source = %dataset.source,
                        "cursor row is gone, paging from the edge"
                    );
                    (Filter::Noop, slice.without_cursor())
                }
            },
        },
    };

    let predicate = Predicate {
        order_by: OrderBy {
            column: dataset.sort_column.clone(),
            direction,
        },
        limit: slice.fetch_limit(),
        filter,
    };

    tracing::debug!(
        slice = ?slice.direction(),
        order = %predicate.order_by.direction,
        comparator = %op,
        limit = predicate.limit,
        has_cursor = slice.has_cursor(),
        "derived pagination predicate"
    );

    Ok((predicate, slice))
}

fn compare(request: &PaginationRequest, comparator: Comparator, value: FilterValue) -> Filter {
    Filter::Compare {
        column: request.dataset.sort_column.clone(),
        comparator,
        value,
    }
}

/// Type-level placeholder for the subquery path of [`derive_parts`].
pub(crate) enum NoResolver {}

impl SortValueResolver for NoResolver {
    fn resolve(&self, _: &str) -> PagingResult<Option<SortValue>> {
        match *self {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::{Cursor, CursorCodec, IdentityCodec};
    use crate::request::{Dataset, PaginationSlice};

    fn request(sort: SortDirection, slice: PaginationSlice) -> PaginationRequest {
        PaginationRequest::new(slice, Dataset::new("posts", "creation_timestamp", sort, "id"))
            .with_codec(IdentityCodec)
    }

    #[test]
    fn comparator_table_covers_every_combination() {
        let expected = [
            (SortDirection::Desc, SliceDirection::Forward, Comparator::Lt),
            (SortDirection::Desc, SliceDirection::Backward, Comparator::Gt),
            (SortDirection::Asc, SliceDirection::Forward, Comparator::Gt),
            (SortDirection::Asc, SliceDirection::Backward, Comparator::Lt),
        ];
        for (sort, slice, op) in expected {
            assert_eq!(comparator(sort, slice).unwrap(), op, "{sort} {slice:?}");
        }
    }

    #[test]
    fn physical_order_flips_only_backward() {
        use SliceDirection::*;
        use SortDirection::*;

        assert_eq!(physical_order(Asc, Forward), Asc);
        assert_eq!(physical_order(Desc, Forward), Desc);
        assert_eq!(physical_order(Asc, Backward), Desc);
        assert_eq!(physical_order(Desc, Backward), Asc);
    }

    #[test]
    fn no_cursor_derives_noop_filter() {
        let slice = PaginationSlice::forward(3, None).unwrap();
        let predicate = derive(&request(SortDirection::Desc, slice)).unwrap();

        assert_eq!(predicate.filter, Filter::Noop);
        assert_eq!(predicate.limit, 4);
        assert_eq!(predicate.order_by.column, Column::from("creation_timestamp"));
        assert_eq!(predicate.order_by.direction, SortDirection::Desc);
    }

    #[test]
    fn cursor_derives_correlated_lookup() {
        let slice = PaginationSlice::backward(2, Some(Cursor::new("p3"))).unwrap();
        let predicate = derive(&request(SortDirection::Desc, slice)).unwrap();

        assert_eq!(predicate.order_by.direction, SortDirection::Asc);
        assert_eq!(predicate.limit, 3);
        assert_eq!(
            predicate.filter,
            Filter::Compare {
                column: Column::from("creation_timestamp"),
                comparator: Comparator::Gt,
                value: FilterValue::Lookup(SortLookup {
                    source: "posts".into(),
                    sort_column: Column::from("creation_timestamp"),
                    cursor_column: Column::from("id"),
                    cursor_value: "p3".into(),
                }),
            }
        );
    }

    #[test]
    fn aliased_sort_column_keeps_both_names() {
        let dataset = Dataset::new(
            "posts",
            Column::aliased("posts.creation_timestamp", "posts_creationTimestamp"),
            SortDirection::Asc,
            Column::aliased("posts.id", "posts_id"),
        );
        let after = crate::cursor::Base64Codec.encode("p1");
        let slice = PaginationSlice::forward(1, Some(after)).unwrap();
        let predicate = derive(&PaginationRequest::new(slice, dataset)).unwrap();

        let Filter::Compare { column, value, .. } = predicate.filter else {
            panic!("expected a comparison");
        };
        assert_eq!(column.column(), "posts.creation_timestamp");
        let FilterValue::Lookup(lookup) = value else {
            panic!("expected a lookup");
        };
        assert_eq!(lookup.cursor_column.column(), "posts.id");
        assert_eq!(lookup.cursor_value, "p1");
    }

    #[test]
    fn resolver_replaces_the_subquery() {
        let resolver: HashMap<String, SortValue> =
            [("p3".to_owned(), SortValue::Int(30))].into_iter().collect();
        let slice = PaginationSlice::forward(2, Some(Cursor::new("p3"))).unwrap();
        let predicate = derive_resolved(&request(SortDirection::Asc, slice), &resolver).unwrap();

        assert_eq!(
            predicate.filter,
            Filter::Compare {
                column: Column::from("creation_timestamp"),
                comparator: Comparator::Gt,
                value: FilterValue::Resolved(SortValue::Int(30)),
            }
        );
    }

    #[test]
    fn missing_cursor_row_is_rejected_by_default() {
        let slice = PaginationSlice::forward(2, Some(Cursor::new("gone"))).unwrap();
        let resolver = |_: &str| None::<SortValue>;
        let err = derive_resolved(&request(SortDirection::Asc, slice), &resolver).unwrap_err();
        assert!(matches!(err, PagingError::CursorNotFound(_)));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn missing_cursor_row_can_be_ignored() {
        let slice = PaginationSlice::forward(2, Some(Cursor::new("gone"))).unwrap();
        let req =
            request(SortDirection::Asc, slice).with_missing_cursor(MissingCursorPolicy::Ignore);
        let resolver = |_: &str| None::<SortValue>;

        let (predicate, slice) = derive_parts(&req, Some(&resolver)).unwrap();
        assert!(predicate.filter.is_noop());
        assert!(!slice.has_cursor());
    }

    #[test]
    fn predicate_serializes_with_where_key() {
        let slice = PaginationSlice::forward(1, None).unwrap();
        let predicate = derive(&request(SortDirection::Asc, slice)).unwrap();
        let json = serde_json::to_value(&predicate).unwrap();

        assert_eq!(json["limit"], 2);
        assert_eq!(json["where"], "noop");
        assert_eq!(json["orderBy"]["direction"], "asc");
    }
}
