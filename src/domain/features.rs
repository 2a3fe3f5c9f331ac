//! Named numeric feature matrices.

/// Shape violations when building or combining matrices.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ShapeError {
    #[error("row {row} has {actual} values, expected {expected}")]
    RowLength { row: usize, expected: usize, actual: usize },

    #[error("cannot join matrices with {left} and {right} rows")]
    RowCount { left: usize, right: usize },
}

/// Row-major matrix of `f64` with one name per column.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    data: Vec<f64>,
    rows: usize,
}

impl FeatureMatrix {
    /// Empty matrix with the given columns.
    #[must_use]
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            data: Vec::new(),
            rows: 0,
        }
    }

    /// Build a matrix from rows.
    ///
    /// # Errors
    /// Returns `ShapeError::RowLength` if any row width differs from the column count.
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Self, ShapeError> {
        let mut matrix = Self::new(columns);
        for row in rows {
            matrix.push_row(&row)?;
        }
        Ok(matrix)
    }

    /// Append one row.
    ///
    /// # Errors
    /// Returns `ShapeError::RowLength` if the row width differs from the column count.
    pub fn push_row(&mut self, row: &[f64]) -> Result<(), ShapeError> {
        if row.len() != self.columns.len() {
            return Err(ShapeError::RowLength {
                row: self.rows,
                expected: self.columns.len(),
                actual: row.len(),
            });
        }
        self.data.extend_from_slice(row);
        self.rows += 1;
        Ok(())
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn n_rows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Borrow row `index`, if present.
    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f64]> {
        if index >= self.rows {
            return None;
        }
        let width = self.n_cols();
        Some(&self.data[index * width..(index + 1) * width])
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.rows).filter_map(move |i| self.row(i))
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Place the columns of `other` to the right of `self`.
    ///
    /// # Errors
    /// Returns `ShapeError::RowCount` if the matrices have different row counts.
    pub fn hstack(self, other: &Self) -> Result<Self, ShapeError> {
        if self.rows != other.rows {
            return Err(ShapeError::RowCount {
                left: self.rows,
                right: other.rows,
            });
        }

        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());

        let mut data = Vec::with_capacity(self.data.len() + other.data.len());
        for (left, right) in self.iter_rows().zip(other.iter_rows()) {
            data.extend_from_slice(left);
            data.extend_from_slice(right);
        }

        Ok(Self {
            columns,
            data,
            rows: self.rows,
        })
    }

    /// Reorder columns to `order`.
    ///
    /// Names in `order` that this matrix lacks become zero columns; columns
    /// not named in `order` are dropped. If a name appears twice here, the
    /// first occurrence wins.
    #[must_use]
    pub fn reindex(&self, order: &[String]) -> Self {
        let sources: Vec<Option<usize>> = order.iter().map(|name| self.column_index(name)).collect();

        let mut data = Vec::with_capacity(self.rows * order.len());
        for row in self.iter_rows() {
            data.extend(sources.iter().map(|src| src.map_or(0.0, |i| row[i])));
        }

        Self {
            columns: order.to_vec(),
            data,
            rows: self.rows,
        }
    }

    /// Copy of row `index` as a single-row matrix.
    #[must_use]
    pub fn select_row(&self, index: usize) -> Option<Self> {
        self.row(index).map(|r| Self {
            columns: self.columns.clone(),
            data: r.to_vec(),
            rows: 1,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| (*c).to_string()).collect()
    }

    #[test]
    fn test_push_row_checks_width() {
        let mut m = FeatureMatrix::new(names(&["a", "b"]));
        m.push_row(&[1.0, 2.0]).expect("row fits");
        let err = m.push_row(&[1.0]).expect_err("short row");
        assert_eq!(err, ShapeError::RowLength { row: 1, expected: 2, actual: 1 });
        assert_eq!(m.n_rows(), 1);
    }

    #[test]
    fn test_hstack() {
        let left = FeatureMatrix::from_rows(names(&["a"]), vec![vec![1.0], vec![2.0]]).expect("valid");
        let right =
            FeatureMatrix::from_rows(names(&["b", "c"]), vec![vec![3.0, 4.0], vec![5.0, 6.0]]).expect("valid");

        let joined = left.hstack(&right).expect("same rows");
        assert_eq!(joined.columns(), names(&["a", "b", "c"]).as_slice());
        assert_eq!(joined.row(1), Some([2.0, 5.0, 6.0].as_slice()));
    }

    #[test]
    fn test_hstack_rejects_row_mismatch() {
        let left = FeatureMatrix::from_rows(names(&["a"]), vec![vec![1.0]]).expect("valid");
        let right = FeatureMatrix::new(names(&["b"]));
        assert!(left.hstack(&right).is_err());
    }

    #[test]
    fn test_reindex_pads_and_drops() {
        let m = FeatureMatrix::from_rows(names(&["x", "a", "b"]), vec![vec![9.0, 1.0, 2.0]]).expect("valid");
        let out = m.reindex(&names(&["b", "missing", "a"]));

        assert_eq!(out.n_cols(), 3);
        assert_eq!(out.row(0), Some([2.0, 0.0, 1.0].as_slice()));
        assert!(out.column_index("x").is_none());
    }

    #[test]
    fn test_select_row() {
        let m = FeatureMatrix::from_rows(names(&["a"]), vec![vec![1.0], vec![2.0]]).expect("valid");
        let single = m.select_row(1).expect("row exists");
        assert_eq!(single.n_rows(), 1);
        assert_eq!(single.row(0), Some([2.0].as_slice()));
        assert!(m.select_row(2).is_none());
    }
}
