// src/dashboard/mod.rs
//! Views the dashboard page derives from a stored dataset: category/region
//! filtering and the per-view chart series.

use crate::process::aggregate::{cmp_sales_desc, sort_by_date};
use crate::process::normalize::{Field, NormalizedRow};
use crate::process::raw_row::Value;
use crate::process::utils::{group_key, quantity_or_zero, sales_or_zero};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const TOP_PRODUCTS: usize = 5;

/// Category and region selection; `None` means "all".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DashboardFilter {
    pub category: Option<Value>,
    pub region: Option<Value>,
}

impl DashboardFilter {
    /// Rows that lack the filtered field are never excluded by it.
    pub fn matches(&self, row: &NormalizedRow) -> bool {
        passes(self.category.as_ref(), row.field(Field::Category))
            && passes(self.region.as_ref(), row.field(Field::Region))
    }

    pub fn apply<'a>(&self, rows: &'a [NormalizedRow]) -> Vec<&'a NormalizedRow> {
        rows.iter().filter(|r| self.matches(r)).collect()
    }
}

fn passes(wanted: Option<&Value>, actual: Option<&Value>) -> bool {
    match (wanted, actual) {
        (Some(w), Some(a)) if a.is_truthy() => w == a,
        _ => true,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatePoint {
    pub date: String,
    pub sales: f64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPoint {
    pub category: Value,
    pub sales: f64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionPoint {
    pub name: Value,
    pub sales: f64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPoint {
    pub product: Value,
    pub sales: f64,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCharts {
    pub time_series: Vec<DatePoint>,
    pub categories: Vec<CategoryPoint>,
    pub regions: Vec<RegionPoint>,
    pub top_products: Vec<ProductPoint>,
}

/// Group sales and quantity by the string form of `field`, skipping rows
/// where it is falsy. Keeps the first value seen for each group.
fn totals_by(rows: &[&NormalizedRow], field: Field) -> Vec<(Value, f64, i64)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<(Value, f64, i64)> = Vec::new();
    for r in rows {
        let Some(v) = r.field(field).filter(|v| v.is_truthy()) else {
            continue;
        };
        let sales = sales_or_zero(r.field(Field::Sales));
        let qty = quantity_or_zero(r.field(Field::Quantity));
        let key = group_key(v);
        match index.get(&key) {
            Some(&i) => {
                out[i].1 += sales;
                out[i].2 = out[i].2.saturating_add(qty);
            }
            None => {
                index.insert(key, out.len());
                out.push((v.clone(), sales, qty));
            }
        }
    }
    out
}

/// Chart series for the rows that pass `filter`.
pub fn prepare_charts(rows: &[NormalizedRow], filter: &DashboardFilter) -> DashboardCharts {
    let filtered = filter.apply(rows);

    let mut time_series: Vec<DatePoint> = totals_by(&filtered, Field::Date)
        .into_iter()
        .map(|(date, sales, quantity)| DatePoint {
            date: group_key(&date),
            sales,
            quantity,
        })
        .collect();
    sort_by_date(&mut time_series, |p| p.date.as_str());

    let categories = totals_by(&filtered, Field::Category)
        .into_iter()
        .map(|(category, sales, quantity)| CategoryPoint {
            category,
            sales,
            quantity,
        })
        .collect();

    let regions = totals_by(&filtered, Field::Region)
        .into_iter()
        .map(|(name, sales, quantity)| RegionPoint {
            name,
            sales,
            quantity,
        })
        .collect();

    let mut top_products: Vec<ProductPoint> = totals_by(&filtered, Field::Product)
        .into_iter()
        .map(|(product, sales, quantity)| ProductPoint {
            product,
            sales,
            quantity,
        })
        .collect();
    top_products.sort_by(|a, b| cmp_sales_desc(a.sales, b.sales));
    top_products.truncate(TOP_PRODUCTS);

    DashboardCharts {
        time_series,
        categories,
        regions,
        top_products,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ranked {
    pub key: Value,
    pub sales: f64,
}

/// Sales per distinct value of any column (semantic or passthrough, e.g.
/// `campaign` or `channel`), highest first, at most `limit` entries.
pub fn rank_by_field(rows: &[NormalizedRow], field: &str, limit: Option<usize>) -> Vec<Ranked> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<Ranked> = Vec::new();
    for r in rows {
        let Some(v) = r.get(field).filter(|v| v.is_truthy()) else {
            continue;
        };
        let sales = sales_or_zero(r.field(Field::Sales));
        let key = group_key(v);
        match index.get(&key) {
            Some(&i) => out[i].sales += sales,
            None => {
                index.insert(key, out.len());
                out.push(Ranked {
                    key: v.clone(),
                    sales,
                });
            }
        }
    }
    out.sort_by(|a, b| cmp_sales_desc(a.sales, b.sales));
    if let Some(n) = limit {
        out.truncate(n);
    }
    out
}

/// Entries with positive sales only, as shown on pie and bar charts.
pub fn nonzero<T>(series: Vec<T>, sales: impl Fn(&T) -> f64) -> Vec<T> {
    series.into_iter().filter(|p| sales(p) > 0.0).collect()
}
