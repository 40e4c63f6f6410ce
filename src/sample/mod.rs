// src/sample/mod.rs
use crate::error::ProfileError;
use crate::process::{process_rows, DashboardData, RawRow, Value};
use chrono::{Months, NaiveDate, Utc};
use rand::Rng;
use std::{fmt, str::FromStr};
use tracing::debug;

/// Built-in demo datasets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Profile {
    #[default]
    Retail,
    Ecommerce,
    Marketing,
    Sales,
}

impl Profile {
    pub const ALL: [Profile; 4] = [
        Profile::Retail,
        Profile::Ecommerce,
        Profile::Marketing,
        Profile::Sales,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Retail => "retail",
            Profile::Ecommerce => "ecommerce",
            Profile::Marketing => "marketing",
            Profile::Sales => "sales",
        }
    }
}

impl FromStr for Profile {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retail" => Ok(Profile::Retail),
            "ecommerce" => Ok(Profile::Ecommerce),
            "marketing" => Ok(Profile::Marketing),
            "sales" => Ok(Profile::Sales),
            _ => Err(ProfileError(s.to_string())),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const RETAIL_CATEGORIES: [(&str, [&str; 4]); 4] = [
    ("Electronics", ["Smartphone", "Laptop", "Tablet", "Headphones"]),
    ("Clothing", ["T-Shirt", "Jeans", "Dress", "Jacket"]),
    ("Home Goods", ["Sofa", "Bed", "Table", "Chair"]),
    ("Accessories", ["Watch", "Bag", "Wallet", "Sunglasses"]),
];
const RETAIL_REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const RETAIL_CHANNELS: [&str; 5] = ["In-Store", "Online", "TeleSales", "Franchise", "Wholesale"];

const ECOMMERCE_CATEGORIES: [(&str, [&str; 4]); 5] = [
    ("Electronics", ["Smartphones", "Laptops", "Tablets", "Headphones"]),
    ("Fashion", ["T-Shirts", "Jeans", "Dresses", "Shoes"]),
    ("Home Decor", ["Furniture", "Decor", "Kitchenware", "Bedding"]),
    ("Beauty", ["Skincare", "Makeup", "Haircare", "Fragrances"]),
    ("Books", ["Fiction", "Non-Fiction", "Educational", "Children"]),
];
const ECOMMERCE_REGIONS: [&str; 5] = [
    "North America",
    "Europe",
    "Asia",
    "Oceania",
    "South America",
];
const ECOMMERCE_CHANNELS: [&str; 5] = [
    "Direct",
    "SEO Traffic",
    "Paid Search",
    "Social Media",
    "Email",
];

const MARKETING_CAMPAIGNS: [&str; 4] = ["Sale", "Holiday Deal", "New Launch", "Clearance"];
const MARKETING_CHANNELS: [&str; 5] = [
    "Social Ads",
    "Search Ads",
    "Display Ads",
    "Email",
    "Influencer",
];
const MARKETING_REGIONS: [&str; 5] = [
    "North America",
    "Europe",
    "Asia Pacific",
    "Latin America",
    "Middle East",
];

const SALES_REPS: [&str; 5] = [
    "John Smith",
    "Sarah Johnson",
    "Michael Brown",
    "Emily Davis",
    "Robert Wilson",
];
const SALES_REGIONS: [&str; 4] = ["North", "South", "East", "West"];
const SALES_PRODUCTS: [&str; 5] = ["Product X", "Product Y", "Product Z", "Service A", "Service B"];

/// Twelve month-spaced dates ending at `today`, oldest first. A day that does
/// not exist in an earlier month is clamped to that month's last day.
pub fn trailing_months(today: NaiveDate) -> Vec<String> {
    let mut dates: Vec<String> = (0..12u32)
        .filter_map(|i| today.checked_sub_months(Months::new(i)))
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect();
    dates.reverse();
    dates
}

fn int<R: Rng + ?Sized>(rng: &mut R, lo: i64, hi: i64) -> Value {
    Value::Number(rng.gen_range(lo..hi) as f64)
}

/// Build the raw rows for `profile`. Values are drawn from `rng`; the shape
/// (columns, row count, value ranges) only depends on the profile.
pub fn generate<R: Rng + ?Sized>(profile: Profile, today: NaiveDate, rng: &mut R) -> Vec<RawRow> {
    let dates = trailing_months(today);
    let mut rows = Vec::new();

    match profile {
        Profile::Retail => {
            for date in &dates {
                for (category, products) in &RETAIL_CATEGORIES {
                    for region in RETAIL_REGIONS {
                        for channel in RETAIL_CHANNELS {
                            for product in products {
                                rows.push(RawRow::from([
                                    ("date", Value::text(date.as_str())),
                                    ("category", Value::text(*category)),
                                    ("region", Value::text(region)),
                                    ("channel", Value::text(channel)),
                                    ("product", Value::text(*product)),
                                    ("sales", int(rng, 1000, 10000)),
                                    ("quantity", int(rng, 10, 100)),
                                ]));
                            }
                        }
                    }
                }
            }
        }
        Profile::Ecommerce => {
            for date in &dates {
                for (category, products) in &ECOMMERCE_CATEGORIES {
                    for region in ECOMMERCE_REGIONS {
                        for channel in ECOMMERCE_CHANNELS {
                            for product in products {
                                let conversion_rate = rng.gen_range(1.0..10.0f64);
                                rows.push(RawRow::from([
                                    ("date", Value::text(date.as_str())),
                                    ("category", Value::text(*category)),
                                    ("region", Value::text(region)),
                                    ("channel", Value::text(channel)),
                                    ("product", Value::text(*product)),
                                    ("sales", int(rng, 1000, 10000)),
                                    ("quantity", int(rng, 10, 100)),
                                    ("visitors", int(rng, 100, 1000)),
                                    (
                                        "conversionRate",
                                        Value::Text(format!("{:.2}", conversion_rate)),
                                    ),
                                ]));
                            }
                        }
                    }
                }
            }
        }
        Profile::Marketing => {
            for date in &dates {
                for campaign in MARKETING_CAMPAIGNS {
                    for region in MARKETING_REGIONS {
                        for channel in MARKETING_CHANNELS {
                            let conversions = int(rng, 10, 500);
                            rows.push(RawRow::from([
                                ("date", Value::text(date.as_str())),
                                ("campaign", Value::text(campaign)),
                                ("region", Value::text(region)),
                                ("channel", Value::text(channel)),
                                ("spend", int(rng, 1000, 10000)),
                                ("impressions", int(rng, 10000, 100000)),
                                ("clicks", int(rng, 100, 5000)),
                                ("conversions", conversions.clone()),
                                ("sales", int(rng, 5000, 50000)),
                                ("quantity", conversions),
                            ]));
                        }
                    }
                }
            }
        }
        Profile::Sales => {
            for date in &dates {
                for rep in SALES_REPS {
                    for region in SALES_REGIONS {
                        for product in SALES_PRODUCTS {
                            rows.push(RawRow::from([
                                ("date", Value::text(date.as_str())),
                                ("salesRep", Value::text(rep)),
                                ("region", Value::text(region)),
                                ("product", Value::text(product)),
                                ("sales", int(rng, 1000, 10000)),
                                ("quantity", int(rng, 1, 10)),
                                ("meetings", int(rng, 1, 10)),
                                ("calls", int(rng, 5, 30)),
                            ]));
                        }
                    }
                }
            }
        }
    }

    debug!(profile = %profile, rows = rows.len(), "generated sample rows");
    rows
}

/// Generate `profile` as of today (UTC) and run it through the pipeline.
pub fn sample_dashboard<R: Rng + ?Sized>(profile: Profile, rng: &mut R) -> DashboardData {
    let today = Utc::now().date_naive();
    process_rows(&generate(profile, today, rng))
}
