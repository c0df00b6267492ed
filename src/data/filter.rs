use std::collections::BTreeSet;

use super::model::VideoTable;

/// How many categories are pre-selected when a dataset is loaded.
pub const DEFAULT_SELECTION_LEN: usize = 5;

/// The set of category values currently selected in the side panel.
/// An empty set means "no filter" (show everything).
pub type CategorySelection = BTreeSet<String>;

/// The initial selection: the first few categories in sorted order.
pub fn default_selection(table: &VideoTable) -> CategorySelection {
    table
        .categories()
        .into_iter()
        .take(DEFAULT_SELECTION_LEN)
        .collect()
}

/// Return a new table holding the rows whose category is selected.
///
/// An empty selection yields a full copy of `table`. The source table is never
/// modified and the result never aliases it.
pub fn filter_by_categories(table: &VideoTable, selected: &CategorySelection) -> VideoTable {
    if selected.is_empty() {
        return table.clone();
    }
    let records = table
        .iter()
        .filter(|video| selected.contains(&video.category))
        .cloned()
        .collect();
    VideoTable::from_records(records)
}
