use std::collections::BTreeMap;

use super::model::VideoTable;

/// How many titles the views ranking shows.
pub const TOP_TITLES: usize = 10;

/// Headline metrics of a (filtered) table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub video_count: usize,
    pub total_views: f64,
    pub total_likes: f64,
}

/// One bar of the views ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct TitleViews {
    pub title: String,
    pub views: f64,
}

/// One bar of the per-category count plot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub videos: usize,
}

pub fn summarize(table: &VideoTable) -> Summary {
    table.iter().fold(
        Summary {
            video_count: 0,
            total_views: 0.0,
            total_likes: 0.0,
        },
        |acc, video| Summary {
            video_count: acc.video_count + 1,
            total_views: acc.total_views + video.views,
            total_likes: acc.total_likes + video.likes,
        },
    )
}

/// Sum views per title and return the `limit` largest, descending.
///
/// Rows without a title are skipped. Equal sums keep ascending title order:
/// grouping goes through a `BTreeMap` and the sort below is stable.
pub fn top_titles_by_views(table: &VideoTable, limit: usize) -> Vec<TitleViews> {
    let mut per_title: BTreeMap<&str, f64> = BTreeMap::new();
    for video in table {
        if let Some(title) = &video.title {
            *per_title.entry(title.as_str()).or_insert(0.0) += video.views;
        }
    }

    let mut ranked: Vec<TitleViews> = per_title
        .into_iter()
        .map(|(title, views)| TitleViews {
            title: title.to_string(),
            views,
        })
        .collect();
    ranked.sort_by(|a, b| b.views.total_cmp(&a.views));
    ranked.truncate(limit);
    ranked
}

/// Count videos per category, most frequent first (ties by category name).
pub fn videos_per_category(table: &VideoTable) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for video in table {
        *counts.entry(video.category.as_str()).or_default() += 1;
    }

    let mut ordered: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, videos)| CategoryCount {
            category: category.to_string(),
            videos,
        })
        .collect();
    ordered.sort_by(|a, b| b.videos.cmp(&a.videos));
    ordered
}
