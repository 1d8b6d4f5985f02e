//! Exact-match duplicate grouping over content hashes.
//!
//! Images sharing a hash form one group. The lowest id in a group is the
//! master; every other member is marked as a duplicate of it.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::DbId;

/// A single `is_duplicate = true, duplicate_of = master_id` assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DuplicateMark {
    pub image_id: DbId,
    pub master_id: DbId,
}

/// Compute duplicate marks for `(image_id, content_hash)` pairs.
///
/// Input order does not matter. Marks are returned sorted by image id.
pub fn group_duplicates(images: &[(DbId, String)]) -> Vec<DuplicateMark> {
    let mut groups: BTreeMap<&str, Vec<DbId>> = BTreeMap::new();
    for (id, hash) in images {
        groups.entry(hash.as_str()).or_default().push(*id);
    }

    let mut marks: Vec<DuplicateMark> = groups
        .into_values()
        .filter(|ids| ids.len() > 1)
        .flat_map(|mut ids| {
            ids.sort_unstable();
            let master_id = ids[0];
            ids.into_iter()
                .skip(1)
                .map(move |image_id| DuplicateMark { image_id, master_id })
        })
        .collect();

    marks.sort_by_key(|m| m.image_id);
    marks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_identical_hashes_point_at_first() {
        let images = vec![
            (1, "aa".to_string()),
            (2, "aa".to_string()),
            (3, "aa".to_string()),
        ];
        assert_eq!(
            group_duplicates(&images),
            vec![
                DuplicateMark { image_id: 2, master_id: 1 },
                DuplicateMark { image_id: 3, master_id: 1 },
            ]
        );
    }

    #[test]
    fn unique_hashes_produce_no_marks() {
        let images = vec![(1, "aa".to_string()), (2, "bb".to_string())];
        assert!(group_duplicates(&images).is_empty());
    }

    #[test]
    fn master_is_lowest_id_regardless_of_order() {
        let images = vec![
            (9, "cc".to_string()),
            (4, "cc".to_string()),
            (5, "dd".to_string()),
            (6, "dd".to_string()),
        ];
        assert_eq!(
            group_duplicates(&images),
            vec![
                DuplicateMark { image_id: 6, master_id: 5 },
                DuplicateMark { image_id: 9, master_id: 4 },
            ]
        );
    }
}
