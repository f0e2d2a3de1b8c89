use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PriceUnit {
    PerHour,
    PerVisit,
    PerService,
}

impl PriceUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceUnit::PerHour => "per-hour",
            PriceUnit::PerVisit => "per-visit",
            PriceUnit::PerService => "per-service",
        }
    }

    pub fn try_parse(s: &str) -> Option<Self> {
        match s {
            "per-hour" => Some(PriceUnit::PerHour),
            "per-visit" => Some(PriceUnit::PerVisit),
            "per-service" => Some(PriceUnit::PerService),
            _ => None,
        }
    }
}

/// A bookable service, flattened: category identity is denormalized onto
/// every entry so catalog lookups never need a join.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDefinition {
    pub id: String,
    pub category_id: String,
    pub category_name: String,
    pub name: String,
    pub description: String,
    pub base_price: f64,
    pub price_unit: PriceUnit,
    pub duration_minutes: i32,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
}
