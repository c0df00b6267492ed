use std::sync::Arc;

use crate::data::DataUnavailable;
use crate::data::aggregate::{
    CategoryCount, Summary, TOP_TITLES, TitleViews, summarize, top_titles_by_views,
    videos_per_category,
};
use crate::data::filter::{CategorySelection, default_selection, filter_by_categories};
use crate::data::model::VideoTable;
use crate::regression::{self, DEFAULT_VIEWS_INPUT, PredictorOutcome};

// ---------------------------------------------------------------------------
// Derived view of one category selection
// ---------------------------------------------------------------------------

/// Everything the central panel shows for the current selection.
#[derive(Debug)]
pub struct DashboardView {
    pub filtered: VideoTable,
    pub summary: Summary,
    pub top_titles: Vec<TitleViews>,
    pub category_counts: Vec<CategoryCount>,
    pub predictor: PredictorOutcome,
}

impl DashboardView {
    pub fn compute(table: &VideoTable, selected: &CategorySelection) -> Self {
        let filtered = filter_by_categories(table, selected);
        DashboardView {
            summary: summarize(&filtered),
            top_titles: top_titles_by_views(&filtered, TOP_TITLES),
            category_counts: videos_per_category(&filtered),
            predictor: regression::evaluate(&filtered),
            filtered,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded dataset (None until a load succeeds).
    pub dataset: Option<Arc<VideoTable>>,

    /// Set when the last load failed; nothing else is rendered then.
    pub load_error: Option<DataUnavailable>,

    /// Categories ticked in the side panel.
    pub selected: CategorySelection,

    /// Metrics, charts and model for `selected` (cached).
    pub view: Option<DashboardView>,

    /// View-count typed into the predictor input.
    pub views_input: u64,

    /// Result of the last "Prevêr Likes" press.
    pub predicted_likes: Option<i64>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            dataset: None,
            load_error: None,
            selected: CategorySelection::new(),
            view: None,
            views_input: DEFAULT_VIEWS_INPUT,
            predicted_likes: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded dataset and select the default categories.
    pub fn set_dataset(&mut self, dataset: Arc<VideoTable>) {
        self.selected = default_selection(&dataset);
        self.dataset = Some(dataset);
        self.load_error = None;
        self.status_message = None;
        self.refresh();
    }

    /// Record a failed load; the dashboard stops rendering.
    pub fn set_load_error(&mut self, error: DataUnavailable) {
        log::error!("{error}");
        self.dataset = None;
        self.view = None;
        self.predicted_likes = None;
        self.load_error = Some(error);
    }

    /// Recompute the dashboard view after a selection change.
    pub fn refresh(&mut self) {
        self.predicted_likes = None;
        self.view = self
            .dataset
            .as_ref()
            .map(|ds| DashboardView::compute(ds, &self.selected));
    }

    /// Toggle a single category in the selection.
    pub fn toggle_category(&mut self, category: &str) {
        if !self.selected.remove(category) {
            self.selected.insert(category.to_string());
        }
        self.refresh();
    }

    /// Select every category.
    pub fn select_all(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selected = ds.categories().into_iter().collect();
            self.refresh();
        }
    }

    /// Clear the selection (which shows the full table).
    pub fn select_none(&mut self) {
        self.selected.clear();
        self.refresh();
    }

    /// Predict likes for `views_input` with the current model, if any.
    pub fn predict(&mut self) {
        let prediction = self
            .view
            .as_ref()
            .and_then(|view| view.predictor.predictor())
            .map(|predictor| predictor.predict_likes_display(self.views_input));
        if let Some(likes) = prediction {
            log::info!("Predicted {likes} likes for {} views", self.views_input);
        }
        self.predicted_likes = prediction;
    }
}
