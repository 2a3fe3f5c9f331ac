//! Untyped tabular data as read from or written to CSV.

/// Header plus string cells, one `Vec` per row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    #[must_use]
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cell at (`row`, `column`); short rows read as missing.
    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index).map(String::as_str)
    }

    /// Names from `required` that are not headers, in `required` order.
    #[must_use]
    pub fn missing_columns(&self, required: &[&str]) -> Vec<String> {
        required
            .iter()
            .filter(|name| self.column_index(name).is_none())
            .map(|name| (*name).to_string())
            .collect()
    }

    /// Remove a column (all occurrences) and its cells.
    pub fn drop_column(&mut self, name: &str) {
        while let Some(index) = self.column_index(name) {
            self.headers.remove(index);
            for row in &mut self.rows {
                if index < row.len() {
                    row.remove(index);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RawTable {
        RawTable {
            headers: vec!["a".into(), "b".into(), "c".into()],
            rows: vec![vec!["1".into(), "2".into(), "3".into()], vec!["4".into(), "5".into()]],
        }
    }

    #[test]
    fn test_cell_lookup() {
        let t = table();
        assert_eq!(t.cell(0, "b"), Some("2"));
        assert_eq!(t.cell(1, "c"), None);
        assert_eq!(t.cell(5, "a"), None);
    }

    #[test]
    fn test_missing_columns_in_required_order() {
        let t = table();
        assert_eq!(t.missing_columns(&["z", "a", "y"]), vec!["z".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_drop_column() {
        let mut t = table();
        t.drop_column("b");
        assert_eq!(t.headers, vec!["a".to_string(), "c".to_string()]);
        assert_eq!(t.rows[0], vec!["1".to_string(), "3".to_string()]);
        assert_eq!(t.rows[1], vec!["4".to_string()]);
    }
}
