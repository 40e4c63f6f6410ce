use crate::process::normalize::Field;
use crate::process::raw_row::RawRow;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    fn fail(msg: String) -> Self {
        Self {
            is_valid: false,
            errors: vec![msg],
        }
    }
}

/// Check that the headers of the first row cover every semantic field.
/// Later rows are not inspected.
pub fn validate_rows(rows: &[RawRow]) -> ValidationResult {
    let Some(first) = rows.first() else {
        return ValidationResult::fail("CSV file is empty".to_string());
    };

    let headers: Vec<String> = first.headers().map(str::to_lowercase).collect();
    let missing: Vec<&str> = Field::ALL
        .iter()
        .filter(|f| {
            !headers
                .iter()
                .any(|h| f.keywords().iter().any(|k| h.contains(k)))
        })
        .map(|f| f.as_str())
        .collect();

    if missing.is_empty() {
        ValidationResult::ok()
    } else {
        debug!(?missing, "required columns not found");
        ValidationResult::fail(format!("Missing required columns: {}", missing.join(", ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::raw_row::Value;

    fn header_row(headers: &[&str]) -> RawRow {
        RawRow::new(
            headers
                .iter()
                .map(|h| (h.to_string(), Value::Empty))
                .collect(),
        )
    }

    #[test]
    fn empty_input_fails_once() {
        let res = validate_rows(&[]);
        assert!(!res.is_valid);
        assert_eq!(res.errors, vec!["CSV file is empty".to_string()]);
    }

    #[test]
    fn accepts_naming_variants() {
        let rows = vec![header_row(&[
            "Order Date",
            "Product Name",
            "Department",
            "Store Location",
            "Revenue",
            "Units",
        ])];
        assert_eq!(validate_rows(&rows), ValidationResult::ok());

        let rows = vec![header_row(&[
            "date", "product", "category", "region", "sales_amount", "quantity",
        ])];
        assert!(validate_rows(&rows).is_valid);
    }

    #[test]
    fn lists_missing_columns_in_declared_order() {
        let rows = vec![header_row(&["Date", "Widget", "Amount"])];
        let res = validate_rows(&rows);
        assert!(!res.is_valid);
        assert_eq!(
            res.errors,
            vec!["Missing required columns: product, category, region, quantity".to_string()]
        );
    }
}
