//! Built-in sample data.
//!
//! `EXAMPLE_ROWS` is the downloadable batch template; `REFERENCE_ROWS` carry
//! a known `Churn` outcome and back the insights screen when no batch has
//! been scored yet.

use super::customer::{CustomerRecord, LabeledRecord, RecordError, REQUIRED_FIELDS};

/// Example batch, one comma-separated line per customer in `REQUIRED_FIELDS` order.
pub const EXAMPLE_ROWS: [&str; 20] = [
    "Female,0,Yes,No,5,Yes,No,Fiber optic,No,No,No,No,Yes,Yes,Month-to-month,Yes,Electronic check,89.65,400.5,0-6,3",
    "Male,1,No,Yes,40,Yes,Yes,Fiber optic,Yes,No,Yes,No,Yes,No,Two year,No,Bank transfer (automatic),104.8,4200.3,24-48,4",
    "Female,0,Yes,Yes,60,No,No phone service,DSL,No,No,No,No,No,No,One year,Yes,Mailed check,40.5,2400.0,48-72,1",
    "Male,1,No,No,3,Yes,No,No,No internet service,No internet service,No internet service,No internet service,No internet service,No internet service,Month-to-month,Yes,Electronic check,20.0,60.0,0-6,0",
    "Female,0,Yes,Yes,48,Yes,Yes,Fiber optic,Yes,Yes,Yes,Yes,Yes,Yes,Two year,No,Credit card (automatic),120.5,5800.7,24-48,5",
    "Male,0,No,No,10,Yes,No,DSL,No,Yes,No,No,No,No,Month-to-month,Yes,Electronic check,60.0,600.0,6-12,2",
    "Female,1,Yes,Yes,65,Yes,Yes,Fiber optic,Yes,Yes,No,Yes,Yes,No,One year,No,Bank transfer (automatic),110.0,7100.3,48-72,3",
    "Male,0,No,No,30,Yes,Yes,DSL,No,Yes,Yes,No,Yes,No,One year,Yes,Mailed check,85.0,2550.0,24-48,4",
    "Female,0,No,No,15,Yes,No,DSL,No,No,No,No,No,No,Month-to-month,Yes,Electronic check,45.0,675.0,12-24,1",
    "Male,1,Yes,No,55,Yes,Yes,Fiber optic,Yes,Yes,Yes,Yes,Yes,Yes,Two year,No,Credit card (automatic),115.0,6325.0,48-72,6",
    "Female,0,Yes,No,22,No,No phone service,No,No internet service,No internet service,No internet service,No internet service,No internet service,No internet service,Month-to-month,Yes,Electronic check,25.0,550.0,12-24,1",
    "Male,0,No,No,8,Yes,No,Fiber optic,No,No,No,No,No,No,Month-to-month,Yes,Mailed check,65.0,520.0,6-12,1",
    "Female,1,No,No,38,Yes,Yes,DSL,Yes,Yes,No,No,No,No,One year,No,Bank transfer (automatic),70.0,2660.0,24-48,3",
    "Male,0,Yes,Yes,50,Yes,Yes,Fiber optic,Yes,No,Yes,Yes,Yes,Yes,Two year,No,Credit card (automatic),110.5,5525.0,48-72,5",
    "Female,0,No,No,4,No,No phone service,No,No internet service,No internet service,No internet service,No internet service,No internet service,No internet service,Month-to-month,Yes,Electronic check,18.0,72.0,0-6,0",
    "Male,1,Yes,No,58,Yes,Yes,Fiber optic,Yes,Yes,Yes,Yes,Yes,Yes,Two year,No,Bank transfer (automatic),120.0,6960.0,48-72,6",
    "Female,0,No,No,12,Yes,No,DSL,No,No,No,No,No,No,Month-to-month,Yes,Mailed check,55.0,660.0,6-12,1",
    "Male,0,No,No,20,Yes,Yes,Fiber optic,No,No,No,No,No,No,One year,No,Electronic check,75.0,1500.0,12-24,2",
    "Female,1,Yes,Yes,45,Yes,Yes,Fiber optic,Yes,Yes,Yes,Yes,Yes,No,Two year,No,Credit card (automatic),112.0,5040.0,24-48,5",
    "Male,0,No,No,28,No,No phone service,DSL,No,No,No,No,No,No,One year,Yes,Mailed check,40.0,1120.0,24-48,1",
];

/// Labelled reference customers; the trailing value is `Churn` (`Yes`/`No`).
pub const REFERENCE_ROWS: [&str; 5] = [
    "Female,0,Yes,No,5,Yes,No,Fiber optic,No,No,No,No,Yes,Yes,Month-to-month,Yes,Electronic check,89.65,400.5,0-6,3,No",
    "Male,1,No,Yes,40,Yes,Yes,Fiber optic,Yes,No,Yes,No,Yes,No,Two year,No,Bank transfer (automatic),104.8,4200.3,24-48,4,No",
    "Female,0,Yes,No,12,Yes,No,DSL,Yes,Yes,No,No,No,No,One year,Yes,Credit card (automatic),59.95,750.2,6-12,2,No",
    "Male,0,No,No,2,Yes,No,Fiber optic,No,No,No,No,No,No,Month-to-month,Yes,Mailed check,75.3,150.6,0-6,1,Yes",
    "Female,0,No,No,60,Yes,Yes,Fiber optic,Yes,Yes,Yes,Yes,Yes,Yes,Two year,No,Bank transfer (automatic),109.85,6700.8,48-72,6,No",
];

fn parse_line(line: &str) -> Result<(CustomerRecord, Vec<&str>), RecordError> {
    let values: Vec<&str> = line.split(',').collect();
    let record = CustomerRecord::from_raw(
        |field| {
            REQUIRED_FIELDS
                .iter()
                .position(|f| *f == field)
                .and_then(|i| values.get(i).copied())
        },
        |v| v,
    )?;
    Ok((record, values))
}

/// The example batch as typed records.
///
/// # Errors
/// Only fails if the built-in rows drift out of the record schema.
pub fn example_records() -> Result<Vec<CustomerRecord>, RecordError> {
    EXAMPLE_ROWS
        .iter()
        .map(|line| parse_line(line).map(|(record, _)| record))
        .collect()
}

/// The example batch as a CSV document with a header row.
#[must_use]
pub fn example_csv() -> String {
    let mut out = REQUIRED_FIELDS.join(",");
    out.push('\n');
    for line in EXAMPLE_ROWS {
        // Values containing commas would need quoting; none of the samples do.
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// The labelled reference customers.
///
/// # Errors
/// Only fails if the built-in rows drift out of the record schema.
pub fn reference_records() -> Result<Vec<LabeledRecord>, RecordError> {
    REFERENCE_ROWS
        .iter()
        .map(|line| {
            let (record, values) = parse_line(line)?;
            let churned = values.get(REQUIRED_FIELDS.len()).is_some_and(|v| *v == "Yes");
            Ok(LabeledRecord { record, churned })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::Contract;

    #[test]
    fn test_example_rows_parse() {
        let records = example_records().expect("samples match the schema");
        assert_eq!(records.len(), 20);
        assert_eq!(records[0].tenure, 5.0);
        assert_eq!(records[0].contract, Contract::MonthToMonth);
        assert_eq!(records[19].contract, Contract::OneYear);
    }

    #[test]
    fn test_example_csv_has_header() {
        let csv = example_csv();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some(REQUIRED_FIELDS.join(",").as_str()));
        assert_eq!(lines.count(), 20);
    }

    #[test]
    fn test_reference_rows_carry_outcome() {
        let records = reference_records().expect("samples match the schema");
        assert_eq!(records.len(), 5);
        assert_eq!(records.iter().filter(|r| r.churned).count(), 1);
        assert!(records[3].churned);
    }
}
