/// Rendering: panels around the dashboard, the dashboard itself, its charts
/// and the data preview.
pub mod dashboard;
pub mod panels;
pub mod plot;
pub mod table;
