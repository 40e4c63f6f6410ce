use crate::process::raw_row::{RawRow, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// The fixed semantic columns the dashboard understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Date,
    Product,
    Category,
    Region,
    Sales,
    Quantity,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Date,
        Field::Product,
        Field::Category,
        Field::Region,
        Field::Sales,
        Field::Quantity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Product => "product",
            Field::Category => "category",
            Field::Region => "region",
            Field::Sales => "sales",
            Field::Quantity => "quantity",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        Field::ALL.into_iter().find(|f| f.as_str() == s)
    }

    /// Header substrings (lower case) that map onto this field.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Field::Date => &["date"],
            Field::Product => &["product"],
            Field::Category => &["category", "department"],
            Field::Region => &["region", "location"],
            Field::Sales => &["sales", "revenue", "amount"],
            Field::Quantity => &["quantity", "units"],
        }
    }

    /// First field (in rule order) whose keywords occur in `header`.
    pub fn classify(header: &str) -> Option<Field> {
        let lower = header.to_lowercase();
        Field::ALL
            .into_iter()
            .find(|f| f.keywords().iter().any(|k| lower.contains(k)))
    }
}

/// A row remapped onto the semantic schema. Columns that match no rule are
/// kept in `extra` under their original header, in source column order.
///
/// A semantic field is `None` when no header mapped to it and
/// `Some(Value::Empty)` when one did but the cell was blank. The two
/// serialize as an absent key and `null` respectively.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NormalizedRow {
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub product: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub region: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub sales: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<Value>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

// A key that is present always yields `Some`, even when its value is `null`.
fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(d).map(Some)
}

impl NormalizedRow {
    pub fn field(&self, f: Field) -> Option<&Value> {
        self.slot(f).as_ref()
    }

    fn slot(&self, f: Field) -> &Option<Value> {
        match f {
            Field::Date => &self.date,
            Field::Product => &self.product,
            Field::Category => &self.category,
            Field::Region => &self.region,
            Field::Sales => &self.sales,
            Field::Quantity => &self.quantity,
        }
    }

    fn slot_mut(&mut self, f: Field) -> &mut Option<Value> {
        match f {
            Field::Date => &mut self.date,
            Field::Product => &mut self.product,
            Field::Category => &mut self.category,
            Field::Region => &mut self.region,
            Field::Sales => &mut self.sales,
            Field::Quantity => &mut self.quantity,
        }
    }

    /// Look up a column by name: semantic names first, then passthrough columns.
    pub fn get(&self, name: &str) -> Option<&Value> {
        match Field::from_name(name) {
            Some(f) => self.field(f),
            None => self.extra.get(name),
        }
    }

    /// True when `f` holds a truthy value.
    pub fn has(&self, f: Field) -> bool {
        self.field(f).is_some_and(Value::is_truthy)
    }
}

/// Map one raw row onto the semantic schema. Headers are visited in column
/// order, so when two headers classify to the same field the later one wins.
pub fn normalize_row(row: &RawRow) -> NormalizedRow {
    let mut out = NormalizedRow::default();
    for (header, value) in row.fields() {
        match Field::classify(header) {
            Some(f) => *out.slot_mut(f) = Some(value.clone()),
            None => {
                out.extra.insert(header.clone(), value.clone());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_header_variants() {
        assert_eq!(Field::classify("Order Date"), Some(Field::Date));
        assert_eq!(Field::classify("PRODUCT_NAME"), Some(Field::Product));
        assert_eq!(Field::classify("Department"), Some(Field::Category));
        assert_eq!(Field::classify("store_location"), Some(Field::Region));
        assert_eq!(Field::classify("Revenue"), Some(Field::Sales));
        assert_eq!(Field::classify("sales_amount"), Some(Field::Sales));
        assert_eq!(Field::classify("Units Sold"), Some(Field::Quantity));
        assert_eq!(Field::classify("units"), Some(Field::Quantity));
        assert_eq!(Field::classify("channel"), None);
        // rule order decides, not header text position
        assert_eq!(Field::classify("Sales Date"), Some(Field::Date));
    }

    #[test]
    fn later_header_overwrites_earlier() {
        let row = RawRow::from([
            ("Gross Revenue", Value::Number(100.0)),
            ("Net Sales", Value::Number(80.0)),
            ("Channel", Value::text("Online")),
        ]);
        let n = normalize_row(&row);
        assert_eq!(n.sales, Some(Value::Number(80.0)));
        assert_eq!(n.extra.get("Channel"), Some(&Value::text("Online")));
        assert!(!n.extra.contains_key("Gross Revenue"));
    }

    #[test]
    fn empty_cells_still_populate_fields() {
        let row = RawRow::from([("Region", Value::Empty)]);
        let n = normalize_row(&row);
        assert_eq!(n.region, Some(Value::Empty));
        assert!(!n.has(Field::Region));
    }

    #[test]
    fn json_is_flat() {
        let row = RawRow::from([
            ("Date", Value::text("2023-01-15")),
            ("Sales", Value::Number(1200.0)),
            ("channel", Value::text("Online")),
        ]);
        let n = normalize_row(&row);
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"date": "2023-01-15", "sales": 1200.0, "channel": "Online"})
        );
        let back: NormalizedRow = serde_json::from_value(json).unwrap();
        assert_eq!(back, n);
    }

    #[test]
    fn blank_field_survives_json_as_null() {
        let row = RawRow::from([("Date", Value::text("2023-01-15")), ("Region", Value::Empty)]);
        let n = normalize_row(&row);
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json, serde_json::json!({"date": "2023-01-15", "region": null}));
        let back: NormalizedRow = serde_json::from_value(json).unwrap();
        assert_eq!(back.region, Some(Value::Empty));
        assert_eq!(back.product, None);
        assert_eq!(back, n);
    }

    #[test]
    fn passthrough_columns_keep_source_order() {
        let row = RawRow::from([
            ("Sales", Value::Number(1.0)),
            ("zone", Value::text("z")),
            ("Channel", Value::text("Online")),
            ("agent", Value::Empty),
        ]);
        let n = normalize_row(&row);
        let keys: Vec<&str> = n.extra.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zone", "Channel", "agent"]);

        let json = serde_json::to_string(&n).unwrap();
        assert_eq!(json, r#"{"sales":1.0,"zone":"z","Channel":"Online","agent":null}"#);
        let back: NormalizedRow = serde_json::from_str(&json).unwrap();
        let keys: Vec<&str> = back.extra.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zone", "Channel", "agent"]);
    }
}
