use std::num::NonZeroUsize;

use proptest::prelude::*;
use relay_paging::{
    assemble, predicate::comparator, Base64Codec, Base64UrlCodec, Column, Comparator, Cursor,
    CursorCodec, Dataset, IdentityCodec, Page, Pagination, PaginationRequest, PaginationSlice,
    SliceDirection, SliceParams, SortDirection,
};
use relay_paging_fixtures::{random_posts, MemoryTable, Post};
use serde_json::{json, Value};

fn sort_direction() -> impl Strategy<Value = SortDirection> {
    prop_oneof![Just(SortDirection::Asc), Just(SortDirection::Desc)]
}

fn slice_direction() -> impl Strategy<Value = SliceDirection> {
    prop_oneof![Just(SliceDirection::Forward), Just(SliceDirection::Backward)]
}

fn sorted(posts: &[Post], sort: SortDirection) -> Vec<Post> {
    let mut posts = posts.to_vec();
    posts.sort_by_key(|p| p.creation_timestamp);
    if sort == SortDirection::Desc {
        posts.reverse();
    }
    posts
}

fn fetch(table: &MemoryTable<Post>, sort: SortDirection, slice: PaginationSlice) -> Page<Post> {
    let dataset = Dataset::new("posts", "creation_timestamp", sort, "id");
    let pagination = Pagination::new(PaginationRequest::new(slice, dataset)).unwrap();
    pagination.page(table.query(pagination.predicate())).unwrap()
}

fn cursor_of(post: &Post) -> Cursor {
    Base64Codec.encode(&post.id.to_string())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn codecs_round_trip(value in "\\PC{1,64}") {
        let codecs: [&dyn CursorCodec; 3] = [&Base64Codec, &Base64UrlCodec, &IdentityCodec];
        for codec in codecs {
            prop_assert_eq!(codec.decode(&codec.encode(&value)).unwrap(), value.clone());
        }
    }

    #[test]
    fn page_never_exceeds_its_size(
        (limit, count) in (1usize..20).prop_flat_map(|limit| (Just(limit), 0..=limit + 1)),
        direction in slice_direction(),
        with_cursor in any::<bool>(),
    ) {
        let rows: Vec<Value> = (0..count).map(|n| json!({ "id": n })).collect();
        let cursor = with_cursor.then(|| Cursor::new("c"));
        let slice = SliceParams::new(direction, NonZeroUsize::new(limit).unwrap(), cursor);

        let page = assemble(rows, &slice, &Column::from("id"), &IdentityCodec).unwrap();

        prop_assert_eq!(page.len(), count.min(limit));
        let info = &page.page_info;
        let (travel_flag, opposite_flag) = match direction {
            SliceDirection::Forward => (info.has_next_page, info.has_previous_page),
            SliceDirection::Backward => (info.has_previous_page, info.has_next_page),
        };
        prop_assert_eq!(travel_flag, count > limit);
        // an empty page reports no neighbours even behind a cursor
        prop_assert_eq!(opposite_flag, with_cursor && count > 0);
    }

    #[test]
    fn comparator_selects_rows_beyond_the_cursor(
        sort in sort_direction(),
        direction in slice_direction(),
        pivot in 0usize..12,
    ) {
        let posts = random_posts(12);
        let table = MemoryTable::new("posts", posts.clone());
        let listing = sorted(&posts, sort);
        let cursor = &listing[pivot];

        let slice = match direction {
            SliceDirection::Forward => PaginationSlice::forward(12, Some(cursor_of(cursor))),
            SliceDirection::Backward => PaginationSlice::backward(12, Some(cursor_of(cursor))),
        }
        .unwrap();
        let page = fetch(&table, sort, slice);

        let expected = match direction {
            SliceDirection::Forward => &listing[pivot + 1..],
            SliceDirection::Backward => &listing[..pivot],
        };
        prop_assert_eq!(page.into_nodes(), expected.to_vec());

        let op = comparator(sort, direction).unwrap();
        let physical_ascending =
            (sort == SortDirection::Asc) == (direction == SliceDirection::Forward);
        prop_assert_eq!(op == Comparator::Gt, physical_ascending);
    }

    #[test]
    fn re_paging_visits_every_row_once(
        count in 1usize..40,
        size in 1i64..10,
        sort in sort_direction(),
    ) {
        let posts = random_posts(count);
        let table = MemoryTable::new("posts", posts.clone());

        let mut forward = vec![];
        let mut after = None;
        loop {
            let page = fetch(&table, sort, PaginationSlice::forward(size, after).unwrap());
            after = page.page_info.end_cursor.clone();
            let more = page.page_info.has_next_page;
            forward.extend(page.into_nodes());
            if !more {
                break;
            }
        }

        let mut backward = vec![];
        let mut before = None;
        loop {
            let page = fetch(&table, sort, PaginationSlice::backward(size, before).unwrap());
            before = page.page_info.start_cursor.clone();
            let more = page.page_info.has_previous_page;
            let mut chunk = page.into_nodes();
            chunk.extend(backward);
            backward = chunk;
            if !more {
                break;
            }
        }

        let listing = sorted(&posts, sort);
        prop_assert_eq!(&forward, &listing);
        prop_assert_eq!(&backward, &listing);
    }
}
