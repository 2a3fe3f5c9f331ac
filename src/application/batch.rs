//! Batch scoring: a whole CSV table in, the same table plus scores out.

use crate::domain::{
    CustomerRecord, LabelCatalog, LabeledRecord, MissingFieldError, Prediction, RawTable,
    RecordError, RiskTier, REQUIRED_FIELDS,
};
use crate::ports::{CategoricalEncoder, Classifier};
use crate::ChurnError;

use super::inference::ScoringService;

/// Appended column holding `P(churn)`.
pub const PROBABILITY_COLUMN: &str = "Probabilidad_Churn";

/// Appended column holding the risk tier label.
pub const TIER_COLUMN: &str = "Nivel_Riesgo";

/// Default export file name.
pub const DEFAULT_OUTPUT_FILE: &str = "predicciones_churn.csv";

/// File name used when writing the example dataset.
pub const EXAMPLE_FILE: &str = "ejemplo_churn.csv";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BatchError {
    #[error("input file rejected: {0}")]
    MissingColumns(MissingFieldError),

    #[error("row {row}: {source}")]
    InvalidRow {
        row: usize,
        #[source]
        source: RecordError,
    },

    #[error("input file has no data rows")]
    Empty,

    #[error("column {0} missing from scored table")]
    NotScored(&'static str),
}

/// Counts and headline numbers for a scored batch.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSummary {
    pub total: usize,

    /// Per tier, in `RiskTier::ALL` order.
    pub tier_counts: [(RiskTier, usize); 3],
    pub mean_probability: f64,

    /// `(row index, probability)` for the riskiest rows, highest first.
    pub top: Vec<(usize, f64)>,
}

impl BatchSummary {
    #[must_use]
    pub fn from_predictions(predictions: &[Prediction], top_n: usize) -> Self {
        let total = predictions.len();
        let tier_counts = RiskTier::ALL.map(|tier| {
            (
                tier,
                predictions.iter().filter(|p| p.risk_tier() == tier).count(),
            )
        });

        let mean_probability = if total == 0 {
            0.0
        } else {
            predictions.iter().map(Prediction::churn_probability).sum::<f64>() / total as f64
        };

        let mut top: Vec<(usize, f64)> = predictions
            .iter()
            .map(Prediction::churn_probability)
            .enumerate()
            .collect();
        top.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        top.truncate(top_n);

        Self {
            total,
            tier_counts,
            mean_probability,
            top,
        }
    }

    #[must_use]
    pub fn count(&self, tier: RiskTier) -> usize {
        self.tier_counts
            .iter()
            .find(|(t, _)| *t == tier)
            .map_or(0, |(_, n)| *n)
    }

    /// Share of rows in `tier`, as a percentage.
    #[must_use]
    pub fn percentage(&self, tier: RiskTier) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.count(tier) as f64 * 100.0 / self.total as f64
        }
    }
}

/// A scored table, the parsed records behind it and their predictions.
#[derive(Debug, Clone)]
pub struct ScoredBatch {
    pub table: RawTable,
    pub records: Vec<CustomerRecord>,
    pub predictions: Vec<Prediction>,
}

impl ScoredBatch {
    #[must_use]
    pub fn summary(&self, top_n: usize) -> BatchSummary {
        BatchSummary::from_predictions(&self.predictions, top_n)
    }

    /// Records labelled with their predicted outcome.
    #[must_use]
    pub fn labeled(&self) -> Vec<LabeledRecord> {
        self.records
            .iter()
            .zip(&self.predictions)
            .map(|(record, p)| LabeledRecord {
                record: record.clone(),
                churned: p.will_churn(),
            })
            .collect()
    }
}

/// Rename Spanish column labels to their raw names.
fn canonical_headers(table: &RawTable, labels: &LabelCatalog) -> RawTable {
    let headers = table
        .headers
        .iter()
        .map(|h| {
            labels
                .column_for_label(h)
                .map_or_else(|| h.clone(), str::to_string)
        })
        .collect();

    RawTable {
        headers,
        rows: table.rows.clone(),
    }
}

/// Parse every row of a table with canonical headers.
///
/// # Errors
/// Returns `BatchError::MissingColumns` before looking at any row if a
/// required column is absent, otherwise the first row that fails to parse.
pub fn parse_records(table: &RawTable, labels: &LabelCatalog) -> Result<Vec<CustomerRecord>, BatchError> {
    let missing = table.missing_columns(&REQUIRED_FIELDS);
    if !missing.is_empty() {
        return Err(BatchError::MissingColumns(MissingFieldError::new(missing)));
    }

    (0..table.len())
        .map(|row| {
            CustomerRecord::from_raw(|f| table.cell(row, f), |v| labels.canonical_value(v))
                .map_err(|source| BatchError::InvalidRow { row, source })
        })
        .collect()
}

/// Score every row of `input` and append the two output columns.
///
/// The output keeps the input's columns and rows as given (Spanish headers
/// included); existing output columns are replaced.
///
/// # Errors
/// Returns `ChurnError::Batch` for missing columns, bad rows or an empty
/// table, and propagates alignment or inference failures.
pub fn score_table<C, E>(service: &ScoringService<C, E>, input: &RawTable) -> Result<ScoredBatch, ChurnError>
where
    C: Classifier,
    E: CategoricalEncoder,
{
    let labels = service.context().labels();
    let canonical = canonical_headers(input, labels);

    tracing::debug!("Step 1: Parsing {} rows...", input.len());
    let records = parse_records(&canonical, labels)?;
    if records.is_empty() {
        return Err(BatchError::Empty.into());
    }

    tracing::debug!("Step 2: Scoring...");
    let predictions = service.score_records(&records)?;

    let mut table = input.clone();
    table.drop_column(PROBABILITY_COLUMN);
    table.drop_column(TIER_COLUMN);
    // Ragged rows are squared to the header so the scores land under their columns.
    let width = table.headers.len();
    table.headers.push(PROBABILITY_COLUMN.to_string());
    table.headers.push(TIER_COLUMN.to_string());
    for (row, prediction) in table.rows.iter_mut().zip(&predictions) {
        row.resize(width, String::new());
        row.push(prediction.churn_probability().to_string());
        row.push(prediction.risk_tier().as_str().to_string());
    }

    let summary = BatchSummary::from_predictions(&predictions, 0);
    tracing::info!(
        "Batch scored: {} rows (ALTO {}, MEDIO {}, BAJO {})",
        summary.total,
        summary.count(RiskTier::Alto),
        summary.count(RiskTier::Medio),
        summary.count(RiskTier::Bajo)
    );

    Ok(ScoredBatch {
        table,
        records,
        predictions,
    })
}

/// Read back the two output columns of a scored table.
///
/// # Errors
/// Returns `BatchError::NotScored` if either column is absent, or
/// `BatchError::InvalidRow` for an unparsable cell.
pub fn read_scores(table: &RawTable) -> Result<Vec<(f64, RiskTier)>, BatchError> {
    for column in [PROBABILITY_COLUMN, TIER_COLUMN] {
        if table.column_index(column).is_none() {
            return Err(BatchError::NotScored(column));
        }
    }

    (0..table.len())
        .map(|row| {
            let raw_p = table.cell(row, PROBABILITY_COLUMN).unwrap_or_default();
            let raw_tier = table.cell(row, TIER_COLUMN).unwrap_or_default();

            let p = raw_p.trim().parse::<f64>().map_err(|_| BatchError::InvalidRow {
                row,
                source: RecordError::InvalidNumber {
                    field: PROBABILITY_COLUMN.to_string(),
                    value: raw_p.to_string(),
                },
            })?;
            let tier = RiskTier::parse(raw_tier).ok_or_else(|| BatchError::InvalidRow {
                row,
                source: RecordError::InvalidCategory {
                    field: TIER_COLUMN.to_string(),
                    value: raw_tier.to_string(),
                },
            })?;
            Ok((p, tier))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::csv_io::read_table;
    use crate::adapters::LoadOptions;
    use crate::application::ChurnModelContext;
    use crate::domain::sample::example_csv;
    use std::path::Path;
    use std::sync::Arc;

    fn service() -> ScoringService<crate::adapters::LogisticModel, crate::adapters::OneHotEncoder> {
        let ctx = ChurnModelContext::load(Path::new("models"), &LoadOptions::default()).expect("shipped artifacts");
        ScoringService::new(Arc::new(ctx))
    }

    fn example_table() -> RawTable {
        read_table(example_csv().as_bytes()).expect("example csv parses")
    }

    #[test]
    fn test_output_appends_two_columns() {
        let input = example_table();
        let scored = score_table(&service(), &input).expect("scores");

        assert_eq!(scored.table.headers.len(), input.headers.len() + 2);
        assert_eq!(scored.table.headers[input.headers.len()], PROBABILITY_COLUMN);
        assert_eq!(scored.table.headers[input.headers.len() + 1], TIER_COLUMN);
        assert_eq!(scored.table.len(), input.len());
        for (out, inp) in scored.table.rows.iter().zip(&input.rows) {
            assert_eq!(&out[..inp.len()], inp.as_slice());
        }
    }

    #[test]
    fn test_short_row_padded_before_scores() {
        let csv = example_csv();
        let mut lines: Vec<String> = csv.lines().take(2).map(str::to_string).collect();
        lines[0].push_str(",notes");
        let ragged = lines.join("\n");
        let input = read_table(ragged.as_bytes()).expect("ragged csv parses");
        assert_eq!(input.rows[0].len() + 1, input.headers.len());

        let scored = score_table(&service(), &input).expect("scores");
        let row = &scored.table.rows[0];
        assert_eq!(row.len(), scored.table.headers.len());
        assert_eq!(row[input.headers.len() - 1], "");

        let read = read_scores(&scored.table).expect("scores line up");
        assert_eq!(read[0].0, scored.predictions[0].churn_probability());
        assert_eq!(read[0].1, scored.predictions[0].risk_tier());
    }

    #[test]
    fn test_rescoring_replaces_output_columns() {
        let service = service();
        let once = score_table(&service, &example_table()).expect("scores");
        let twice = score_table(&service, &once.table).expect("rescores");

        assert_eq!(twice.table.headers, once.table.headers);
        assert_eq!(twice.table.rows, once.table.rows);
    }

    #[test]
    fn test_missing_column_rejects_whole_file() {
        let mut input = example_table();
        input.drop_column("Contract");

        let err = score_table(&service(), &input).expect_err("missing column");
        match err {
            ChurnError::Batch(BatchError::MissingColumns(missing)) => {
                assert_eq!(missing.fields, vec!["Contract".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_spanish_headers_and_values_accepted() {
        let service = service();
        let english = example_table();
        let labels = LabelCatalog::new();

        let mut spanish = english.clone();
        spanish.headers = english
            .headers
            .iter()
            .map(|h| labels.column_label(h).to_string())
            .collect();
        for row in &mut spanish.rows {
            for cell in row.iter_mut() {
                *cell = labels.value_label(cell).to_string();
            }
        }

        let a = score_table(&service, &english).expect("english scores");
        let b = score_table(&service, &spanish).expect("spanish scores");
        assert_eq!(a.predictions, b.predictions);
        assert_eq!(b.table.headers[0], spanish.headers[0]);
    }

    #[test]
    fn test_empty_table_rejected() {
        let input = RawTable::new(REQUIRED_FIELDS.iter().map(|f| (*f).to_string()).collect());
        assert!(matches!(
            score_table(&service(), &input),
            Err(ChurnError::Batch(BatchError::Empty))
        ));
    }

    #[test]
    fn test_read_scores_round_trip() {
        let scored = score_table(&service(), &example_table()).expect("scores");
        let read = read_scores(&scored.table).expect("scored table");

        assert_eq!(read.len(), scored.predictions.len());
        for ((p, tier), prediction) in read.iter().zip(&scored.predictions) {
            assert_eq!(*p, prediction.churn_probability());
            assert_eq!(*tier, prediction.risk_tier());
        }
    }

    #[test]
    fn test_summary_counts() {
        let predictions = vec![
            Prediction::new(0, [0.9, 0.1]),
            Prediction::new(0, [0.5, 0.5]),
            Prediction::new(1, [0.2, 0.8]),
            Prediction::new(1, [0.3, 0.7]),
        ];
        let summary = BatchSummary::from_predictions(&predictions, 2);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.count(RiskTier::Alto), 2);
        assert_eq!(summary.count(RiskTier::Medio), 1);
        assert_eq!(summary.count(RiskTier::Bajo), 1);
        assert!((summary.percentage(RiskTier::Alto) - 50.0).abs() < 1e-12);
        assert!((summary.mean_probability - 0.525).abs() < 1e-12);
        assert_eq!(summary.top, vec![(2, 0.8), (3, 0.7)]);
    }
}
