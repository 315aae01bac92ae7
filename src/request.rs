//! Caller-facing pagination arguments and the slice parameters derived from them.
use std::num::NonZeroUsize;
use std::sync::Arc;

use serde::Deserialize;

use crate::config::{MissingCursorPolicy, PagingConfig};
use crate::cursor::{Base64Codec, Cursor, CursorCodec};
use crate::error::{PagingError, PagingResult};
use crate::types::{Column, SliceDirection, SortDirection};

/// Which slice of the dataset to fetch: `first`/`after` XOR `last`/`before`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationSlice {
    Forward {
        first: NonZeroUsize,
        after: Option<Cursor>,
    },
    Backward {
        last: NonZeroUsize,
        before: Option<Cursor>,
    },
}

impl PaginationSlice {
    pub fn forward(first: i64, after: Option<Cursor>) -> PagingResult<Self> {
        Ok(PaginationSlice::Forward {
            first: page_size("first", first)?,
            after,
        })
    }

    pub fn backward(last: i64, before: Option<Cursor>) -> PagingResult<Self> {
        Ok(PaginationSlice::Backward {
            last: page_size("last", last)?,
            before,
        })
    }

    pub fn direction(&self) -> SliceDirection {
        match self {
            PaginationSlice::Forward { .. } => SliceDirection::Forward,
            PaginationSlice::Backward { .. } => SliceDirection::Backward,
        }
    }

    pub fn page_size(&self) -> NonZeroUsize {
        match self {
            PaginationSlice::Forward { first, .. } => *first,
            PaginationSlice::Backward { last, .. } => *last,
        }
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        match self {
            PaginationSlice::Forward { after, .. } => after.as_ref(),
            PaginationSlice::Backward { before, .. } => before.as_ref(),
        }
    }
}

fn page_size(arg: &str, count: i64) -> PagingResult<NonZeroUsize> {
    usize::try_from(count)
        .ok()
        .and_then(NonZeroUsize::new)
        .ok_or_else(|| {
            PagingError::InvalidRequest(format!("`{arg}` must be a positive integer, got {count}"))
        })
}

/// Raw connection arguments as a GraphQL layer receives them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RelayArgs {
    pub first: Option<i64>,
    pub after: Option<String>,
    pub last: Option<i64>,
    pub before: Option<String>,
}

impl TryFrom<RelayArgs> for PaginationSlice {
    type Error = PagingError;

    fn try_from(args: RelayArgs) -> PagingResult<Self> {
        match args {
            RelayArgs {
                first: Some(_),
                last: Some(_),
                ..
            } => Err(PagingError::InvalidRequest(
                "`first` and `last` are mutually exclusive".into(),
            )),
            RelayArgs {
                first: Some(first),
                after,
                before: None,
                ..
            } => PaginationSlice::forward(first, after.map(Cursor::from)),
            RelayArgs {
                last: Some(last),
                before,
                after: None,
                ..
            } => PaginationSlice::backward(last, before.map(Cursor::from)),
            RelayArgs {
                first: Some(_), ..
            } => Err(PagingError::InvalidRequest(
                "`before` cannot be combined with `first`".into(),
            )),
            RelayArgs { last: Some(_), .. } => Err(PagingError::InvalidRequest(
                "`after` cannot be combined with `last`".into(),
            )),
            RelayArgs {
                first: None,
                last: None,
                ..
            } => Err(PagingError::InvalidRequest(
                "one of `first` or `last` is required".into(),
            )),
        }
    }
}

/// Shape of the relation being paginated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    /// Table or CTE alias the cursor lookup selects from.
    pub source: String,
    pub sort_column: Column,
    pub sort_direction: SortDirection,
    /// Unique key identifying a row.
    pub cursor_column: Column,
}

impl Dataset {
    pub fn new(
        source: impl Into<String>,
        sort_column: impl Into<Column>,
        sort_direction: SortDirection,
        cursor_column: impl Into<Column>,
    ) -> Self {
        Self {
            source: source.into(),
            sort_column: sort_column.into(),
            sort_direction,
            cursor_column: cursor_column.into(),
        }
    }

    /// Like [`Dataset::new`] with the sort direction given as a string.
    pub fn parse(
        source: impl Into<String>,
        sort_column: impl Into<Column>,
        sort_direction: &str,
        cursor_column: impl Into<Column>,
    ) -> PagingResult<Self> {
        let sort_direction = SortDirection::parse(sort_direction)?;
        Ok(Self::new(source, sort_column, sort_direction, cursor_column))
    }
}

/// Everything needed to derive a predicate for one page.
#[derive(Debug, Clone)]
pub struct PaginationRequest {
    pub slice: PaginationSlice,
    pub dataset: Dataset,
    pub codec: Arc<dyn CursorCodec>,
    pub missing_cursor: MissingCursorPolicy,
    pub max_page_size: Option<usize>,
}

impl PaginationRequest {
    pub fn new(slice: PaginationSlice, dataset: Dataset) -> Self {
        Self {
            slice,
            dataset,
            codec: Arc::new(Base64Codec),
            missing_cursor: MissingCursorPolicy::default(),
            max_page_size: None,
        }
    }

    pub fn configured(slice: PaginationSlice, dataset: Dataset, config: &PagingConfig) -> Self {
        Self {
            slice,
            dataset,
            codec: config.codec.codec(),
            missing_cursor: config.missing_cursor,
            max_page_size: config.max_page_size,
        }
    }

    pub fn with_codec<C: CursorCodec + 'static>(mut self, codec: C) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    pub fn with_missing_cursor(mut self, policy: MissingCursorPolicy) -> Self {
        self.missing_cursor = policy;
        self
    }

    pub fn with_max_page_size(mut self, max: usize) -> Self {
        self.max_page_size = Some(max);
        self
    }

    /// Slice parameters the page assembler needs, with the cursor policy applied.
    pub fn slice_params(&self) -> PagingResult<SliceParams> {
        self.classify().map(|c| c.slice)
    }

    /// Validate the slice and decode its cursor.
    pub(crate) fn classify(&self) -> PagingResult<Classified> {
        let limit = self.slice.page_size();
        if let Some(max) = self.max_page_size {
            if limit.get() > max {
                return Err(PagingError::InvalidRequest(format!(
                    "page size {limit} exceeds the maximum of {max}"
                )));
            }
        }

        let slice = SliceParams {
            direction: self.slice.direction(),
            limit,
            cursor: self.slice.cursor().cloned(),
        };

        let Some(cursor) = &slice.cursor else {
            return Ok(Classified {
                slice,
                cursor_value: None,
            });
        };

        match self.codec.decode(cursor) {
            Ok(value) => Ok(Classified {
                slice,
                cursor_value: Some(value),
            }),
            Err(e) => match self.missing_cursor {
                MissingCursorPolicy::Reject => Err(e.into()),
                MissingCursorPolicy::Ignore => {
                    tracing::warn!(%cursor, error = %e, "dropping undecodable cursor");
                    Ok(Classified {
                        slice: slice.without_cursor(),
                        cursor_value: None,
                    })
                }
            },
        }
    }
}

/// Validated slice with its decoded cursor value.
#[derive(Debug, Clone)]
pub(crate) struct Classified {
    pub slice: SliceParams,
    pub cursor_value: Option<String>,
}

/// Direction, page size and effective cursor of one pagination call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceParams {
    direction: SliceDirection,
    limit: NonZeroUsize,
    cursor: Option<Cursor>,
}

impl SliceParams {
    pub fn new(direction: SliceDirection, limit: NonZeroUsize, cursor: Option<Cursor>) -> Self {
        Self {
            direction,
            limit,
            cursor,
        }
    }

    pub fn direction(&self) -> SliceDirection {
        self.direction
    }

    /// Requested page size.
    pub fn limit(&self) -> usize {
        self.limit.get()
    }

    /// Rows to request from the source: one more than the page size.
    pub fn fetch_limit(&self) -> usize {
        self.limit.get() + 1
    }

    pub fn cursor(&self) -> Option<&Cursor> {
        self.cursor.as_ref()
    }

    pub fn has_cursor(&self) -> bool {
        self.cursor.is_some()
    }

    pub(crate) fn without_cursor(mut self) -> Self {
        self.cursor = None;
        self
    }
}
