//! Column-oriented table containers for uploaded business datasets.
//!
//! `RawTable` holds data exactly as parsed (cells may be missing);
//! `DataTable` is the cleaned form where missing values are gone by
//! construction: numeric gaps are median-imputed and text gaps become
//! the `"unknown"` sentinel.

use statrs::statistics::{Data, OrderStatistics};

/// A single parsed cell before cleaning.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    Missing,
    Num(f64),
    Str(String),
}

/// A raw column: type is inferred per column at ingestion time.
#[derive(Debug, Clone, PartialEq)]
pub enum RawColumn {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

/// Parsed table prior to cleaning. Column order matches the source file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    columns: Vec<(String, RawColumn)>,
    rows: usize,
}

/// Cleaned (and optionally feature-engineered) table. No cell is missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DataTable {
    columns: Vec<(String, Column)>,
    rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Numeric(Vec<f64>),
    Text(Vec<String>),
}

/// Normalizes a column name: trim, lower-case, spaces to underscores.
/// Idempotent: normalizing an already-normalized name is a no-op.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

impl RawTable {
    /// Builds a table from header names and row-major cells. A column is
    /// numeric when every present cell is a number (or a string that
    /// parses as one); an all-missing column counts as numeric. Rows
    /// shorter than the header are padded with missing cells.
    pub fn from_cells(names: Vec<String>, rows: Vec<Vec<RawCell>>) -> Self {
        let width = names.len();
        let row_count = rows.len();

        let missing = RawCell::Missing;
        let mut columns = Vec::with_capacity(width);
        for (idx, name) in names.into_iter().enumerate() {
            let cells: Vec<&RawCell> = rows
                .iter()
                .map(|row| row.get(idx).unwrap_or(&missing))
                .collect();

            let numeric = cells.iter().all(|cell| match cell {
                RawCell::Missing | RawCell::Num(_) => true,
                RawCell::Str(s) => s.parse::<f64>().is_ok(),
            });

            let column = if numeric {
                RawColumn::Numeric(
                    cells
                        .iter()
                        .map(|cell| match cell {
                            RawCell::Missing => None,
                            RawCell::Num(v) => Some(*v),
                            RawCell::Str(s) => s.parse::<f64>().ok(),
                        })
                        .collect(),
                )
            } else {
                RawColumn::Text(
                    cells
                        .iter()
                        .map(|cell| match cell {
                            RawCell::Missing => None,
                            RawCell::Num(v) => Some(format_number(*v)),
                            RawCell::Str(s) => Some(s.clone()),
                        })
                        .collect(),
                )
            };
            columns.push((name, column));
        }

        Self {
            columns,
            rows: row_count,
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Cleans the table: normalizes column names, median-imputes numeric
    /// gaps and fills text gaps with `"unknown"`.
    ///
    /// When two columns collide after normalization (e.g. `"Revenue "`
    /// and `"revenue"`), the right-most column wins; it keeps the
    /// position of the earliest column with that name. A numeric column
    /// with no present values at all imputes 0.0 (there is no median to
    /// take).
    pub fn clean(self) -> DataTable {
        let rows = self.rows;
        let mut columns: Vec<(String, Column)> = Vec::with_capacity(self.columns.len());

        for (name, column) in self.columns {
            let name = normalize_name(&name);
            let cleaned = match column {
                RawColumn::Numeric(cells) => {
                    let present: Vec<f64> = cells.iter().filter_map(|c| *c).collect();
                    let fill = if present.is_empty() {
                        0.0
                    } else {
                        Data::new(present).median()
                    };
                    Column::Numeric(cells.into_iter().map(|c| c.unwrap_or(fill)).collect())
                }
                RawColumn::Text(cells) => Column::Text(
                    cells
                        .into_iter()
                        .map(|c| c.unwrap_or_else(|| "unknown".to_string()))
                        .collect(),
                ),
            };

            match columns.iter().position(|(existing, _)| *existing == name) {
                Some(idx) => columns[idx].1 = cleaned,
                None => columns.push((name, cleaned)),
            }
        }

        DataTable { columns, rows }
    }
}

impl DataTable {
    /// Assembles a table directly from cleaned columns. Intended for
    /// callers that already hold complete (gap-free) data.
    pub fn from_columns(columns: Vec<(String, Column)>) -> Self {
        let rows = columns
            .first()
            .map(|(_, c)| match c {
                Column::Numeric(v) => v.len(),
                Column::Text(v) => v.len(),
            })
            .unwrap_or(0);
        Self { columns, rows }
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|(n, _)| n == name)
    }

    /// The values of a numeric column, if it exists and is numeric.
    pub fn numeric(&self, name: &str) -> Option<&[f64]> {
        self.columns.iter().find_map(|(n, c)| match c {
            Column::Numeric(v) if n == name => Some(v.as_slice()),
            _ => None,
        })
    }

    /// Inserts or replaces a numeric column. Appends at the end when the
    /// name is new, so derived columns never reorder source columns.
    pub fn set_numeric(&mut self, name: &str, values: Vec<f64>) {
        if self.columns.is_empty() {
            self.rows = values.len();
        }
        match self.columns.iter().position(|(n, _)| n == name) {
            Some(idx) => self.columns[idx].1 = Column::Numeric(values),
            None => self.columns.push((name.to_string(), Column::Numeric(values))),
        }
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.columns.iter().filter_map(|(n, c)| match c {
            Column::Numeric(v) => Some((n.as_str(), v.as_slice())),
            Column::Text(_) => None,
        })
    }

    pub fn text_columns(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.columns.iter().filter_map(|(n, c)| match c {
            Column::Text(v) => Some((n.as_str(), v.as_slice())),
            Column::Numeric(_) => None,
        })
    }

    /// Row-major projection of the numeric columns, in column order.
    pub fn numeric_rows(&self) -> Vec<Vec<f64>> {
        let cols: Vec<&[f64]> = self.numeric_columns().map(|(_, v)| v).collect();
        (0..self.rows)
            .map(|i| cols.iter().map(|c| c[i]).collect())
            .collect()
    }
}

fn format_number(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(names: &[&str], rows: Vec<Vec<RawCell>>) -> RawTable {
        RawTable::from_cells(names.iter().map(|s| s.to_string()).collect(), rows)
    }

    #[test]
    fn test_normalize_name_idempotent() {
        for name in ["  Monthly Revenue ", "COST", "margin_pct", "a b c"] {
            let once = normalize_name(name);
            assert_eq!(normalize_name(&once), once);
        }
        assert_eq!(normalize_name("  Monthly Revenue "), "monthly_revenue");
    }

    #[test]
    fn test_clean_imputes_numeric_median() {
        let table = raw(
            &["Revenue"],
            vec![
                vec![RawCell::Num(10.0)],
                vec![RawCell::Missing],
                vec![RawCell::Num(30.0)],
                vec![RawCell::Num(20.0)],
            ],
        );
        let clean = table.clean();
        assert_eq!(clean.numeric("revenue"), Some(&[10.0, 20.0, 30.0, 20.0][..]));
    }

    #[test]
    fn test_clean_fills_text_with_unknown() {
        let table = raw(
            &["Region"],
            vec![
                vec![RawCell::Str("US".into())],
                vec![RawCell::Missing],
                vec![RawCell::Str("EU".into())],
            ],
        );
        let clean = table.clean();
        let (_, values) = clean.text_columns().next().unwrap();
        let expected = vec!["US".to_string(), "unknown".to_string(), "EU".to_string()];
        assert_eq!(values, expected.as_slice());
    }

    #[test]
    fn test_numeric_inference_from_strings() {
        let table = raw(
            &["a", "b"],
            vec![
                vec![RawCell::Str("1.5".into()), RawCell::Str("x".into())],
                vec![RawCell::Str("2".into()), RawCell::Str("7".into())],
            ],
        );
        let clean = table.clean();
        assert_eq!(clean.numeric("a"), Some(&[1.5, 2.0][..]));
        // one non-numeric cell makes the whole column text
        assert!(clean.numeric("b").is_none());
    }

    #[test]
    fn test_collision_last_column_wins() {
        let table = raw(
            &["Revenue ", "region", "revenue"],
            vec![
                vec![
                    RawCell::Num(1.0),
                    RawCell::Str("US".into()),
                    RawCell::Num(100.0),
                ],
                vec![
                    RawCell::Num(2.0),
                    RawCell::Str("EU".into()),
                    RawCell::Num(200.0),
                ],
            ],
        );
        let clean = table.clean();
        assert_eq!(clean.column_count(), 2);
        assert_eq!(clean.numeric("revenue"), Some(&[100.0, 200.0][..]));
        // the winning column keeps the earliest position with that name
        assert_eq!(clean.column_names().next(), Some("revenue"));
    }

    #[test]
    fn test_all_missing_numeric_column_fills_zero() {
        let table = raw(
            &["gap"],
            vec![vec![RawCell::Missing], vec![RawCell::Missing]],
        );
        let clean = table.clean();
        assert_eq!(clean.numeric("gap"), Some(&[0.0, 0.0][..]));
    }

    #[test]
    fn test_numeric_rows_projection() {
        let table = raw(
            &["a", "tag", "b"],
            vec![
                vec![
                    RawCell::Num(1.0),
                    RawCell::Str("x".into()),
                    RawCell::Num(10.0),
                ],
                vec![
                    RawCell::Num(2.0),
                    RawCell::Str("y".into()),
                    RawCell::Num(20.0),
                ],
            ],
        );
        let clean = table.clean();
        assert_eq!(clean.numeric_rows(), vec![vec![1.0, 10.0], vec![2.0, 20.0]]);
    }

    #[test]
    fn test_empty_table() {
        let clean = raw(&[], vec![]).clean();
        assert_eq!(clean.row_count(), 0);
        assert_eq!(clean.column_count(), 0);
        assert!(clean.numeric_rows().is_empty());
    }
}
