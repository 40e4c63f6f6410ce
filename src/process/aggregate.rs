use crate::process::date_parser::parse_sortable;
use crate::process::normalize::{normalize_row, Field, NormalizedRow};
use crate::process::raw_row::{RawRow, Value, ValueKey};
use crate::process::utils::{group_key, quantity_or_zero, sales_or_zero};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub total_sales: f64,
    pub total_quantity: i64,
    pub average_order_value: f64,
    pub unique_products: usize,
    pub unique_categories: usize,
    pub unique_regions: usize,
}

/// Distinct truthy values per dimension, in first-appearance order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Filters {
    pub categories: Vec<Value>,
    pub regions: Vec<Value>,
    pub products: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySales {
    pub category: Value,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSales {
    pub region: Value,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateSales {
    pub date: String,
    pub sales: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Charts {
    pub sales_by_category: Vec<CategorySales>,
    pub sales_by_region: Vec<RegionSales>,
    pub sales_by_date: Vec<DateSales>,
}

/// Everything the dashboard needs from one dataset. This is also the shape
/// kept in the storage slot.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    pub raw_data: Vec<NormalizedRow>,
    pub summary: Summary,
    pub filters: Filters,
    pub charts: Charts,
}

/// Normalize every row and compute the summary, filter sets and chart
/// series. Bad numeric cells count as zero; this never fails.
#[tracing::instrument(level = "debug", skip(rows), fields(rows = rows.len()))]
pub fn process_rows(rows: &[RawRow]) -> DashboardData {
    let normalized: Vec<NormalizedRow> = rows.iter().map(normalize_row).collect();
    process_normalized(normalized)
}

pub fn process_normalized(normalized: Vec<NormalizedRow>) -> DashboardData {
    let filters = Filters {
        categories: distinct_values(&normalized, Field::Category),
        regions: distinct_values(&normalized, Field::Region),
        products: distinct_values(&normalized, Field::Product),
    };

    let total_sales: f64 = normalized
        .iter()
        .map(|r| sales_or_zero(r.field(Field::Sales)))
        .sum();
    let total_quantity: i64 = normalized
        .iter()
        .map(|r| quantity_or_zero(r.field(Field::Quantity)))
        .fold(0i64, i64::saturating_add);
    let average_order_value = if total_quantity > 0 {
        total_sales / total_quantity as f64
    } else {
        0.0
    };

    let summary = Summary {
        total_sales,
        total_quantity,
        average_order_value,
        unique_products: filters.products.len(),
        unique_categories: filters.categories.len(),
        unique_regions: filters.regions.len(),
    };

    let sales_by_category = sum_sales_by(&normalized, Field::Category, &filters.categories)
        .map(|(category, sales)| CategorySales { category, sales })
        .collect();
    let sales_by_region = sum_sales_by(&normalized, Field::Region, &filters.regions)
        .map(|(region, sales)| RegionSales { region, sales })
        .collect();

    let sales_by_date = if normalized.first().is_some_and(|r| r.has(Field::Date)) {
        sales_by_date(&normalized)
    } else {
        Vec::new()
    };

    info!(
        rows = normalized.len(),
        total_sales,
        total_quantity,
        categories = summary.unique_categories,
        regions = summary.unique_regions,
        "processed dataset"
    );

    DashboardData {
        raw_data: normalized,
        summary,
        filters,
        charts: Charts {
            sales_by_category,
            sales_by_region,
            sales_by_date,
        },
    }
}

fn distinct_values(rows: &[NormalizedRow], field: Field) -> Vec<Value> {
    let mut seen: HashSet<ValueKey> = HashSet::new();
    rows.iter()
        .filter_map(|r| r.field(field))
        .filter(|v| v.is_truthy())
        .filter(|v| seen.insert(v.key()))
        .cloned()
        .collect()
}

/// Sum sales for each of `keys` over rows whose `field` is strictly equal.
fn sum_sales_by<'a>(
    rows: &[NormalizedRow],
    field: Field,
    keys: &'a [Value],
) -> impl Iterator<Item = (Value, f64)> + 'a {
    let mut sums: HashMap<ValueKey, f64> = HashMap::with_capacity(keys.len());
    for r in rows {
        if let Some(v) = r.field(field) {
            *sums.entry(v.key()).or_insert(0.0) += sales_or_zero(r.field(Field::Sales));
        }
    }
    keys.iter().map(move |k| {
        let total = sums.get(&k.key()).copied().unwrap_or(0.0);
        (k.clone(), total)
    })
}

fn sales_by_date(rows: &[NormalizedRow]) -> Vec<DateSales> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut series: Vec<DateSales> = Vec::new();
    for r in rows {
        let Some(date) = r.field(Field::Date).filter(|v| v.is_truthy()) else {
            continue;
        };
        let key = group_key(date);
        let sales = sales_or_zero(r.field(Field::Sales));
        match index.get(&key) {
            Some(&i) => series[i].sales += sales,
            None => {
                index.insert(key.clone(), series.len());
                series.push(DateSales { date: key, sales });
            }
        }
    }
    sort_by_date(&mut series, |p| p.date.as_str());
    series
}

/// Stable ascending sort on parsed dates. Entries whose date does not parse
/// go last, in their original order.
pub(crate) fn sort_by_date<T>(items: &mut [T], date: impl Fn(&T) -> &str) {
    items.sort_by_cached_key(|item| {
        let parsed = parse_sortable(date(item));
        (parsed.is_none(), parsed)
    });
}

/// Descending by sales; stable for equal totals.
pub(crate) fn cmp_sales_desc(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_rows() -> Vec<RawRow> {
        vec![
            RawRow::from([
                ("Date", Value::text("2023-01-15")),
                ("Product", Value::text("Widget A")),
                ("Category", Value::text("Electronics")),
                ("Region", Value::text("North")),
                ("Sales", Value::text("1200")),
                ("Quantity", Value::text("24")),
            ]),
            RawRow::from([
                ("Date", Value::text("2023-01-16")),
                ("Product", Value::text("Widget B")),
                ("Category", Value::text("Electronics")),
                ("Region", Value::text("South")),
                ("Sales", Value::text("950")),
                ("Quantity", Value::text("19")),
            ]),
        ]
    }

    #[test]
    fn two_row_scenario() {
        let data = process_rows(&scenario_rows());
        assert_eq!(data.summary.total_sales, 2150.0);
        assert_eq!(data.summary.total_quantity, 43);
        assert!((data.summary.average_order_value - 2150.0 / 43.0).abs() < 1e-9);
        assert!((data.summary.average_order_value - 50.0).abs() < 0.1);
        assert_eq!(data.summary.unique_products, 2);
        assert_eq!(data.filters.categories, vec![Value::text("Electronics")]);
        assert_eq!(
            data.filters.regions,
            vec![Value::text("North"), Value::text("South")]
        );
        assert_eq!(
            data.charts.sales_by_category,
            vec![CategorySales {
                category: Value::text("Electronics"),
                sales: 2150.0
            }]
        );
        let dates: Vec<&str> = data
            .charts
            .sales_by_date
            .iter()
            .map(|d| d.date.as_str())
            .collect();
        assert_eq!(dates, vec!["2023-01-15", "2023-01-16"]);
        assert_eq!(data.raw_data.len(), 2);
        assert!(data.raw_data.iter().all(|r| Field::ALL
            .iter()
            .all(|f| r.field(*f).is_some())));
    }

    #[test]
    fn non_numeric_sales_contribute_zero() {
        let mut rows = scenario_rows();
        rows.push(RawRow::from([
            ("Date", Value::text("2023-01-17")),
            ("Category", Value::text("Electronics")),
            ("Region", Value::text("North")),
            ("Sales", Value::text("n/a")),
            ("Quantity", Value::text("lots")),
        ]));
        let data = process_rows(&rows);
        assert_eq!(data.summary.total_sales, 2150.0);
        assert_eq!(data.summary.total_quantity, 43);
        assert_eq!(data.charts.sales_by_category[0].sales, 2150.0);
        assert_eq!(data.charts.sales_by_region[0].sales, 1200.0);
        assert_eq!(data.charts.sales_by_date.len(), 3);
        assert_eq!(data.charts.sales_by_date[2].sales, 0.0);
    }

    #[test]
    fn zero_quantity_gives_zero_average() {
        let rows = vec![RawRow::from([("Sales", Value::Number(10.0))])];
        let data = process_rows(&rows);
        assert_eq!(data.summary.average_order_value, 0.0);
        assert!(data.charts.sales_by_date.is_empty());
    }

    #[test]
    fn grouping_is_strict_on_type() {
        let rows = vec![
            RawRow::from([("Region", Value::Number(5.0)), ("Sales", Value::Number(1.0))]),
            RawRow::from([("Region", Value::text("5")), ("Sales", Value::Number(2.0))]),
            RawRow::from([("Region", Value::Number(5.0)), ("Sales", Value::Number(4.0))]),
            RawRow::from([("Region", Value::text("")), ("Sales", Value::Number(8.0))]),
        ];
        let data = process_rows(&rows);
        assert_eq!(
            data.filters.regions,
            vec![Value::Number(5.0), Value::text("5")]
        );
        let sums: Vec<f64> = data.charts.sales_by_region.iter().map(|r| r.sales).collect();
        assert_eq!(sums, vec![5.0, 2.0]);
    }

    fn dated(date: Value, sales: f64) -> RawRow {
        RawRow::from([("Date", date), ("Sales", Value::Number(sales))])
    }

    #[test]
    fn date_series_needs_truthy_first_date() {
        let rows = vec![
            dated(Value::Empty, 1.0),
            dated(Value::text("2023-02-01"), 2.0),
        ];
        assert!(process_rows(&rows).charts.sales_by_date.is_empty());
    }

    #[test]
    fn date_series_sorts_and_skips_missing() {
        let rows = vec![
            dated(Value::text("2023-03-01"), 3.0),
            dated(Value::text("someday"), 9.0),
            dated(Value::Empty, 100.0),
            dated(Value::text("2023-01-01"), 1.0),
            dated(Value::text("2023-03-01"), 4.0),
        ];
        let series = process_rows(&rows).charts.sales_by_date;
        let pairs: Vec<(&str, f64)> = series
            .iter()
            .map(|d| (d.date.as_str(), d.sales))
            .collect();
        assert_eq!(
            pairs,
            vec![("2023-01-01", 1.0), ("2023-03-01", 7.0), ("someday", 9.0)]
        );
    }

    #[test]
    fn repeated_runs_are_identical() {
        let rows = scenario_rows();
        let a = process_rows(&rows);
        let b = process_rows(&rows);
        assert_eq!(a.summary, b.summary);
        assert_eq!(a.charts, b.charts);
        assert_eq!(
            a.summary.total_sales.to_bits(),
            b.summary.total_sales.to_bits()
        );
    }

    #[test]
    fn serialized_shape_uses_camel_case() {
        let json = serde_json::to_value(process_rows(&scenario_rows())).unwrap();
        assert_eq!(json["summary"]["totalSales"], 2150.0);
        assert_eq!(json["summary"]["uniqueRegions"], 2);
        assert_eq!(json["filters"]["regions"][1], "South");
        assert_eq!(json["charts"]["salesByRegion"][0]["region"], "North");
        assert_eq!(json["charts"]["salesByDate"][0]["date"], "2023-01-15");
        assert_eq!(json["rawData"][0]["product"], "Widget A");
    }
}
