use chrono::{Duration, TimeZone, Utc};
use fake::{faker::lorem::en::Sentence, Fake};
use rand::{seq::SliceRandom, Rng};
use uuid::Uuid;

use crate::Post;

/// `count` posts with distinct timestamps, one minute apart, in shuffled insertion order.
pub fn random_posts(count: usize) -> Vec<Post> {
    let mut rng = rand::thread_rng();
    let epoch = Utc
        .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
        .single()
        .expect("fixed date is unambiguous. qed");

    let mut posts: Vec<Post> = (0..count)
        .map(|n| Post {
            id: Uuid::new_v4(),
            creation_timestamp: epoch + Duration::minutes(n as i64),
            title: Sentence(2..5).fake_with_rng(&mut rng),
            comments_count: rng.gen_range(0..10),
        })
        .collect();

    posts.shuffle(&mut rng);
    posts
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn timestamps_and_ids_are_unique() {
        let posts = random_posts(50);
        let stamps: HashSet<_> = posts.iter().map(|p| p.creation_timestamp).collect();
        let ids: HashSet<_> = posts.iter().map(|p| p.id).collect();
        assert_eq!(stamps.len(), 50);
        assert_eq!(ids.len(), 50);
    }
}
