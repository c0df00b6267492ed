use linfa::traits::Fit;
use linfa::Dataset;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::data::model::VideoTable;

/// The predictor only fits when the table has more rows than this.
pub const MIN_ROWS_FOR_FIT: usize = 10;
/// Share of rows held out for evaluation.
pub const TEST_FRACTION: f64 = 0.3;
/// Seed of the train/test shuffle. Fixed so splits are reproducible.
pub const SPLIT_SEED: u64 = 42;

/// Prediction input defaults.
pub const DEFAULT_VIEWS_INPUT: u64 = 1_000_000;
pub const VIEWS_INPUT_STEP: u64 = 10_000;
/// Largest view-count the input accepts; keeps it representable as `i64`.
pub const MAX_VIEWS_INPUT: u64 = i64::MAX as u64;

/// Move the views input one step up or down, staying in `0..=MAX_VIEWS_INPUT`.
pub fn step_views_input(views: u64, up: bool) -> u64 {
    if up {
        views.saturating_add(VIEWS_INPUT_STEP).min(MAX_VIEWS_INPUT)
    } else {
        views.saturating_sub(VIEWS_INPUT_STEP).min(MAX_VIEWS_INPUT)
    }
}

// ---------------------------------------------------------------------------
// Train / test split
// ---------------------------------------------------------------------------

/// Row indices of each partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n_rows` with `seed` and hold out `ceil(n_rows * test_fraction)`
/// rows for testing; the rest train.
pub fn train_test_split(n_rows: usize, test_fraction: f64, seed: u64) -> TrainTestSplit {
    let n_test = ((n_rows as f64) * test_fraction).ceil() as usize;
    let n_test = n_test.min(n_rows);

    let mut indices: Vec<usize> = (0..n_rows).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    TrainTestSplit {
        train,
        test: indices,
    }
}

// ---------------------------------------------------------------------------
// Likes predictor
// ---------------------------------------------------------------------------

/// Ordinary least squares of likes on views, evaluated on a held-out split.
#[derive(Debug, Clone, PartialEq)]
pub struct LikesPredictor {
    coefficient: f64,
    intercept: f64,
    rmse: f64,
    train_rows: usize,
    test_rows: usize,
}

impl LikesPredictor {
    /// Split `table`, fit on the training rows and score on the test rows.
    ///
    /// No scaling, outlier handling or regularization: plain OLS with an
    /// intercept. When every training view-count is the same the least-squares
    /// line is flat at the mean like-count.
    pub fn fit(table: &VideoTable) -> Self {
        let split = train_test_split(table.len(), TEST_FRACTION, SPLIT_SEED);
        let (x_train, y_train) = views_and_likes(table, &split.train);
        let (x_test, y_test) = views_and_likes(table, &split.test);

        let (coefficient, intercept) = least_squares_line(x_train, y_train);
        let predicted = x_test.column(0).mapv(|views| intercept + coefficient * views);
        let rmse = root_mean_squared_error(&predicted, &y_test);

        let predictor = LikesPredictor {
            coefficient,
            intercept,
            rmse,
            train_rows: split.train.len(),
            test_rows: split.test.len(),
        };
        log::info!(
            "Fitted likes ~ views on {} rows (coef {:.6}, intercept {:.3}), test RMSE {:.3} on {} rows",
            predictor.train_rows,
            predictor.coefficient,
            predictor.intercept,
            predictor.rmse,
            predictor.test_rows
        );
        predictor
    }

    /// Slope of the fitted line (likes per view).
    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Root-mean-squared error on the test partition.
    pub fn rmse(&self) -> f64 {
        self.rmse
    }

    pub fn train_rows(&self) -> usize {
        self.train_rows
    }

    pub fn test_rows(&self) -> usize {
        self.test_rows
    }

    /// Predicted like-count for a view-count.
    pub fn predict_likes(&self, views: u64) -> f64 {
        self.intercept + self.coefficient * views as f64
    }

    /// The prediction truncated toward zero, as displayed.
    pub fn predict_likes_display(&self, views: u64) -> i64 {
        self.predict_likes(views).trunc() as i64
    }
}

/// Slope and intercept of the OLS line through `(x, y)`.
fn least_squares_line(x: Array2<f64>, y: Array1<f64>) -> (f64, f64) {
    let mean_y = y.mean().unwrap_or(0.0);
    let first = x.iter().next().copied();
    if x.iter().all(|&v| Some(v) == first) {
        log::debug!("Training views have no variance, using the mean like-count");
        return (0.0, mean_y);
    }
    match LinearRegression::new().fit(&Dataset::new(x, y)) {
        Ok(model) => (model.params()[0], model.intercept()),
        Err(e) => {
            log::warn!("Linear solver rejected the data ({e}), using the mean like-count");
            (0.0, mean_y)
        }
    }
}

fn views_and_likes(table: &VideoTable, rows: &[usize]) -> (Array2<f64>, Array1<f64>) {
    let records = table.records();
    let x = Array2::from_shape_fn((rows.len(), 1), |(i, _)| records[rows[i]].views);
    let y = rows.iter().map(|&r| records[r].likes).collect::<Array1<f64>>();
    (x, y)
}

fn root_mean_squared_error(predicted: &Array1<f64>, actual: &Array1<f64>) -> f64 {
    let residuals = predicted - actual;
    residuals.mapv(|e| e * e).mean().unwrap_or(0.0).sqrt()
}

// ---------------------------------------------------------------------------
// Outcome shown in the dashboard
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum PredictorOutcome {
    /// Too few rows; no fit was attempted.
    InsufficientData { rows: usize },
    Trained(LikesPredictor),
}

impl PredictorOutcome {
    pub fn predictor(&self) -> Option<&LikesPredictor> {
        match self {
            PredictorOutcome::Trained(predictor) => Some(predictor),
            PredictorOutcome::InsufficientData { .. } => None,
        }
    }
}

/// Fit a predictor for `table` if it has enough rows.
pub fn evaluate(table: &VideoTable) -> PredictorOutcome {
    if table.len() <= MIN_ROWS_FOR_FIT {
        log::debug!("Skipping regression: only {} rows", table.len());
        return PredictorOutcome::InsufficientData { rows: table.len() };
    }
    PredictorOutcome::Trained(LikesPredictor::fit(table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{CategorySelection, filter_by_categories};
    use crate::data::model::{VideoRecord, video};

    fn linear_table(n: usize) -> VideoTable {
        let records: Vec<VideoRecord> = (1..=n)
            .map(|i| {
                let views = (i * 100) as f64;
                video(&format!("v{i}"), "Music", views, 0.1 * views + 0.5)
            })
            .collect();
        VideoTable::from_records(records)
    }

    fn noisy_table(n: usize) -> VideoTable {
        let records: Vec<VideoRecord> = (0..n)
            .map(|i| {
                let views = 1_000.0 + (i as f64) * 750.0;
                let wobble = if i % 3 == 0 { 40.0 } else { -15.0 };
                video(&format!("n{i}"), "Gaming", views, views * 0.04 + wobble)
            })
            .collect();
        VideoTable::from_records(records)
    }

    #[test]
    fn split_partitions_every_row_once() {
        let split = train_test_split(15, TEST_FRACTION, SPLIT_SEED);
        assert_eq!(split.test.len(), 5);
        assert_eq!(split.train.len(), 10);

        let mut all: Vec<usize> = split.train.iter().chain(&split.test).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..15).collect::<Vec<_>>());
    }

    #[test]
    fn split_rounds_test_share_up() {
        let split = train_test_split(11, TEST_FRACTION, SPLIT_SEED);
        assert_eq!(split.test.len(), 4);
        assert_eq!(split.train.len(), 7);
    }

    #[test]
    fn split_is_reproducible_for_a_seed() {
        let a = train_test_split(40, TEST_FRACTION, SPLIT_SEED);
        let b = train_test_split(40, TEST_FRACTION, SPLIT_SEED);
        assert_eq!(a, b);
    }

    #[test]
    fn ten_rows_or_fewer_skip_the_fit() {
        match evaluate(&linear_table(10)) {
            PredictorOutcome::InsufficientData { rows } => assert_eq!(rows, 10),
            other => panic!("expected insufficient data, got {other:?}"),
        }
        assert!(evaluate(&VideoTable::default()).predictor().is_none());
    }

    #[test]
    fn eleven_rows_fit() {
        assert!(evaluate(&linear_table(11)).predictor().is_some());
    }

    #[test]
    fn exact_line_is_recovered() {
        let predictor = LikesPredictor::fit(&linear_table(20));
        assert!((predictor.coefficient() - 0.1).abs() < 1e-9);
        assert!((predictor.intercept() - 0.5).abs() < 1e-6);
        assert!(predictor.rmse() < 1e-6);
        assert_eq!(predictor.train_rows() + predictor.test_rows(), 20);
        assert_eq!(predictor.predict_likes_display(150), 15);
    }

    #[test]
    fn prediction_follows_the_fitted_line() {
        let mut records: Vec<VideoRecord> = (1..=15)
            .map(|i| {
                let views = (i * 100) as f64;
                let likes = (i * 10) as f64 + if i % 2 == 0 { 3.0 } else { -2.0 };
                video(&format!("{i}"), "Music", views, likes)
            })
            .collect();
        records.push(video("other", "News", 9_999.0, 1.0));
        let table = VideoTable::from_records(records);

        let selected: CategorySelection = ["Music".to_string()].into();
        let music = filter_by_categories(&table, &selected);
        assert_eq!(music.len(), 15);

        let predictor = evaluate(&music);
        let predictor = predictor.predictor().expect("15 rows should fit");
        let expected = predictor.intercept() + predictor.coefficient() * 150.0;
        assert!((predictor.predict_likes(150) - expected).abs() < 1e-9);
        assert_eq!(predictor.predict_likes_display(150), expected.trunc() as i64);
    }

    #[test]
    fn rmse_is_reproducible_across_fits() {
        let table = noisy_table(30);
        let a = LikesPredictor::fit(&table);
        let b = LikesPredictor::fit(&table);
        assert_eq!(a.rmse().to_bits(), b.rmse().to_bits());
        assert_eq!(a.coefficient().to_bits(), b.coefficient().to_bits());
        assert!(a.rmse() > 0.0);
    }

    #[test]
    fn rmse_matches_manual_computation_on_the_test_rows() {
        let table = noisy_table(25);
        let predictor = LikesPredictor::fit(&table);
        let split = train_test_split(table.len(), TEST_FRACTION, SPLIT_SEED);

        let squared: f64 = split
            .test
            .iter()
            .map(|&i| {
                let row = &table.records()[i];
                let fitted = predictor.intercept() + predictor.coefficient() * row.views;
                (fitted - row.likes).powi(2)
            })
            .sum();
        let manual = (squared / split.test.len() as f64).sqrt();
        assert!((manual - predictor.rmse()).abs() < 1e-6);
    }

    #[test]
    fn identical_views_fit_a_flat_line_at_the_mean() {
        let records: Vec<VideoRecord> = (0..15)
            .map(|i| video(&format!("s{i}"), "Music", 500.0, (10 + i) as f64))
            .collect();
        let table = VideoTable::from_records(records);
        let split = train_test_split(table.len(), TEST_FRACTION, SPLIT_SEED);
        let train_mean = split
            .train
            .iter()
            .map(|&i| table.records()[i].likes)
            .sum::<f64>()
            / split.train.len() as f64;

        let outcome = evaluate(&table);
        let predictor = outcome.predictor().expect("15 rows should fit");
        assert_eq!(predictor.coefficient(), 0.0);
        assert!((predictor.intercept() - train_mean).abs() < 1e-9);
        assert!(predictor.rmse().is_finite());
        assert!((predictor.predict_likes(1_000_000) - train_mean).abs() < 1e-9);
    }

    #[test]
    fn views_input_steps_stay_in_range() {
        assert_eq!(step_views_input(DEFAULT_VIEWS_INPUT, true), 1_010_000);
        assert_eq!(step_views_input(DEFAULT_VIEWS_INPUT, false), 990_000);
        assert_eq!(step_views_input(5_000, false), 0);
        assert_eq!(step_views_input(MAX_VIEWS_INPUT - 1, true), MAX_VIEWS_INPUT);
        assert_eq!(step_views_input(u64::MAX, false), MAX_VIEWS_INPUT);
        assert!(i64::try_from(step_views_input(u64::MAX, true)).is_ok());
    }
}
