use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// VideoRecord – one row of the dataset
// ---------------------------------------------------------------------------

/// A single video (one row of the source table) after cleaning.
///
/// `views`, `likes` and `category` are always present: rows missing any of
/// them never make it into a [`VideoTable`]. The title is optional because a
/// row without one still counts towards every metric except the title ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct VideoRecord {
    pub title: Option<String>,
    pub category: String,
    pub views: f64,
    pub likes: f64,
}

// ---------------------------------------------------------------------------
// VideoTable – the complete loaded (or filtered) table
// ---------------------------------------------------------------------------

/// An immutable, position-keyed table of videos.
///
/// Every transformation (filtering in particular) produces a new table, so a
/// table handed out by the loader cache is never mutated behind anyone's back.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoTable {
    records: Vec<VideoRecord>,
}

impl VideoTable {
    pub fn from_records(records: Vec<VideoRecord>) -> Self {
        VideoTable { records }
    }

    pub fn records(&self) -> &[VideoRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VideoRecord> {
        self.records.iter()
    }

    /// Number of videos.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct category values in sorted order.
    pub fn categories(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.category.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}

impl<'a> IntoIterator for &'a VideoTable {
    type Item = &'a VideoRecord;
    type IntoIter = std::slice::Iter<'a, VideoRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

#[cfg(test)]
pub(crate) fn video(title: &str, category: &str, views: f64, likes: f64) -> VideoRecord {
    VideoRecord {
        title: Some(title.to_string()),
        category: category.to_string(),
        views,
        likes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_are_sorted_and_distinct() {
        let table = VideoTable::from_records(vec![
            video("a", "Music", 1.0, 1.0),
            video("b", "Gaming", 1.0, 1.0),
            video("c", "Music", 1.0, 1.0),
            video("d", "Comedy", 1.0, 1.0),
        ]);
        assert_eq!(table.categories(), vec!["Comedy", "Gaming", "Music"]);
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn empty_table_has_no_categories() {
        let table = VideoTable::default();
        assert!(table.is_empty());
        assert!(table.categories().is_empty());
    }
}
