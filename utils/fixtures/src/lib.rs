//! Test data and an in-memory stand-in for the query engine.
//!
//! The blog dataset mirrors the posts/comments tables the Postgres suites run against: eight
//! posts one day apart, and comments spread unevenly so `comments_count` can act as a derived
//! sort column.
use std::str::FromStr;

use chrono::{Duration, TimeZone, Utc};
use once_cell::sync::Lazy;
use relay_paging::{Row, SortValue};
use uuid::Uuid;

pub use fake;

mod random;
mod table;

pub use random::random_posts;
pub use table::{MemoryTable, Record};

pub type DateTime = chrono::DateTime<Utc>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: Uuid,
    pub creation_timestamp: DateTime,
    pub title: String,
    pub comments_count: i64,
}

impl Post {
    /// Post `n` of the blog dataset.
    pub fn nth(n: usize) -> &'static Post {
        &POSTS[n]
    }
}

/// Strip a `table.` qualifier from a column reference.
fn field(column: &str) -> &str {
    column.rsplit('.').next().unwrap_or(column)
}

impl Row for Post {
    fn column_value(&self, key: &str) -> Option<String> {
        match field(key) {
            "id" => Some(self.id.to_string()),
            "creation_timestamp" => Some(self.creation_timestamp.to_rfc3339()),
            "title" => Some(self.title.clone()),
            "comments_count" => Some(self.comments_count.to_string()),
            _ => None,
        }
    }
}

impl Record for Post {
    fn value(&self, column: &str) -> SortValue {
        match field(column) {
            "id" => self.id.into(),
            "creation_timestamp" => self.creation_timestamp.into(),
            "title" => self.title.as_str().into(),
            "comments_count" => self.comments_count.into(),
            _ => SortValue::Null,
        }
    }
}

fn uuid(s: &str) -> Uuid {
    Uuid::from_str(s).expect("uuid string is valid. qed")
}

pub static POST_IDS: Lazy<[Uuid; 8]> = Lazy::new(|| {
    [
        uuid("ae52f86a-a5d3-4f3a-8558-815b946ac947"),
        uuid("00000000-0000-0000-0000-000000000001"),
        uuid("00000000-0000-0000-0000-000000000002"),
        uuid("00000000-0000-0000-0000-000000000003"),
        uuid("00000000-0000-0000-0000-000000000004"),
        uuid("00000000-0000-0000-0000-000000000005"),
        uuid("00000000-0000-0000-0000-000000000006"),
        uuid("00000000-0000-0000-0000-000000000007"),
    ]
});

/// `(comment id, post index)` pairs.
pub static COMMENTS: Lazy<Vec<(Uuid, usize)>> = Lazy::new(|| {
    [
        (5, 0),
        (6, 0),
        (7, 0),
        (8, 2),
        (9, 2),
        (10, 3),
        (11, 3),
        (0, 4),
        (1, 4),
        (2, 4),
        (3, 4),
        (4, 4),
        (12, 6),
    ]
    .into_iter()
    .map(|(comment, post)| (Uuid::from_u128(comment), post))
    .collect()
});

/// Posts in insertion order: `Post 0` is the oldest, `Post 7` the newest.
pub static POSTS: Lazy<Vec<Post>> = Lazy::new(|| {
    let first_day = Utc
        .with_ymd_and_hms(2023, 7, 6, 0, 0, 0)
        .single()
        .expect("fixed date is unambiguous. qed");

    POST_IDS
        .iter()
        .enumerate()
        .map(|(n, id)| Post {
            id: *id,
            creation_timestamp: first_day + Duration::days(n as i64),
            title: format!("Post {n}"),
            comments_count: COMMENTS.iter().filter(|(_, post)| *post == n).count() as i64,
        })
        .collect()
});

/// The `posts` table.
pub fn posts_table() -> MemoryTable<Post> {
    MemoryTable::new("posts", POSTS.clone())
}

/// Posts newest first, the order a `creation_timestamp desc` listing shows them in.
pub fn posts_newest_first() -> Vec<Post> {
    let mut posts = POSTS.clone();
    posts.sort_by(|a, b| b.creation_timestamp.cmp(&a.creation_timestamp));
    posts
}
