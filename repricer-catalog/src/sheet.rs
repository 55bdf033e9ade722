use serde::{Deserialize, Serialize};
use std::fmt;

/// Sentinel used by the sheets for "not configured" / "not available"
pub const SENTINEL: f64 = -1.0;

/// Location of a single spreadsheet cell
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRef {
    pub sheet_id: String,
    pub tab: String,
    pub cell: String,
}

impl CellRef {
    pub fn new(sheet_id: impl Into<String>, tab: impl Into<String>, cell: impl Into<String>) -> Self {
        Self {
            sheet_id: sheet_id.into(),
            tab: tab.into(),
            cell: cell.into(),
        }
    }

    /// A1-style range within the sheet, e.g. `'Stock'!B2`
    pub fn range(&self) -> String {
        format!("'{}'!{}", self.tab, self.cell)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.sheet_id, self.range())
    }
}

/// Raw value read from a cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CellError {
    #[error("Cell value is not a number: {0:?}")]
    NotANumber(String),
}

impl CellValue {
    /// Numeric amount, `None` when the cell is empty or holds the `-1` sentinel.
    ///
    /// Text cells may carry `,` thousands separators; `.` is the decimal mark.
    pub fn to_amount(&self) -> Result<Option<f64>, CellError> {
        let value = match self {
            CellValue::Empty => return Ok(None),
            CellValue::Number(n) => *n,
            CellValue::Text(text) => {
                let cleaned: String = text
                    .trim()
                    .chars()
                    .filter(|c| *c != ',' && !c.is_whitespace())
                    .collect();
                if cleaned.is_empty() {
                    return Ok(None);
                }
                cleaned
                    .parse::<f64>()
                    .map_err(|_| CellError::NotANumber(text.clone()))?
            }
        };

        if !value.is_finite() {
            return Err(CellError::NotANumber(value.to_string()));
        }
        if value == SENTINEL {
            return Ok(None);
        }
        Ok(Some(value))
    }

    /// Whole-number counter; empty and sentinel cells read as `-1`
    pub fn to_count(&self) -> Result<i64, CellError> {
        Ok(self.to_amount()?.map(|v| v.trunc() as i64).unwrap_or(-1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_and_empty_are_unset() {
        assert_eq!(CellValue::Number(-1.0).to_amount().unwrap(), None);
        assert_eq!(CellValue::Empty.to_amount().unwrap(), None);
        assert_eq!(CellValue::Text("  ".into()).to_amount().unwrap(), None);
        assert_eq!(CellValue::Text("-1".into()).to_count().unwrap(), -1);
    }

    #[test]
    fn test_zero_is_a_real_value() {
        assert_eq!(CellValue::Number(0.0).to_amount().unwrap(), Some(0.0));
        assert_eq!(CellValue::Text("0".into()).to_count().unwrap(), 0);
    }

    #[test]
    fn test_text_with_separators() {
        assert_eq!(CellValue::Text("1,250.5".into()).to_amount().unwrap(), Some(1250.5));
        assert_eq!(CellValue::Text("150".into()).to_count().unwrap(), 150);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = CellValue::Text("n/a".into()).to_amount().unwrap_err();
        assert_eq!(err, CellError::NotANumber("n/a".into()));
    }

    #[test]
    fn test_range_format() {
        let cell = CellRef::new("sheet-1", "Stock", "B2");
        assert_eq!(cell.range(), "'Stock'!B2");
        assert_eq!(cell.to_string(), "sheet-1:'Stock'!B2");
    }
}
