use std::collections::HashMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::models::{Category, PriceUnit, ServiceDefinition};

/// Read-only registry of bookable services. Built once at startup and
/// shared through `AppState`; lookups never touch the database.
pub struct ServiceCatalog {
    categories: Vec<Category>,
    services: Vec<ServiceDefinition>,
    category_index: HashMap<String, usize>,
    service_index: HashMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "lowercase")]
pub enum SearchHit {
    Category(Category),
    Service(ServiceDefinition),
}

// Shape of the catalog document: categories with nested services. Loading
// flattens it and denormalizes category identity onto every service.
#[derive(Deserialize)]
struct CatalogFile {
    categories: Vec<CatalogCategory>,
}

#[derive(Deserialize)]
struct CatalogCategory {
    id: String,
    name: String,
    description: String,
    services: Vec<CatalogService>,
}

#[derive(Deserialize)]
struct CatalogService {
    id: String,
    name: String,
    description: String,
    base_price: f64,
    price_unit: PriceUnit,
    duration_minutes: i32,
    #[serde(default)]
    keywords: Vec<String>,
}

impl ServiceCatalog {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let file: CatalogFile = serde_json::from_str(s).context("failed to parse catalog")?;

        let mut categories = Vec::new();
        let mut services = Vec::new();
        let mut category_index = HashMap::new();
        let mut service_index = HashMap::new();

        for category in file.categories {
            if category_index
                .insert(category.id.clone(), categories.len())
                .is_some()
            {
                anyhow::bail!("duplicate category id in catalog: {}", category.id);
            }

            for service in &category.services {
                if service.duration_minutes <= 0 {
                    anyhow::bail!(
                        "service {} has non-positive duration: {}",
                        service.id,
                        service.duration_minutes
                    );
                }
                if service.base_price < 0.0 {
                    anyhow::bail!(
                        "service {} has negative base price: {}",
                        service.id,
                        service.base_price
                    );
                }
                if service_index
                    .insert(service.id.clone(), services.len())
                    .is_some()
                {
                    anyhow::bail!("duplicate service id in catalog: {}", service.id);
                }

                services.push(ServiceDefinition {
                    id: service.id.clone(),
                    category_id: category.id.clone(),
                    category_name: category.name.clone(),
                    name: service.name.clone(),
                    description: service.description.clone(),
                    base_price: service.base_price,
                    price_unit: service.price_unit,
                    duration_minutes: service.duration_minutes,
                    keywords: service.keywords.clone(),
                });
            }

            categories.push(Category {
                id: category.id,
                name: category.name,
                description: category.description,
            });
        }

        Ok(Self {
            categories,
            services,
            category_index,
            service_index,
        })
    }

    /// The catalog shipped with the binary.
    pub fn builtin() -> anyhow::Result<Self> {
        Self::from_json(include_str!("../data/catalog.json"))
    }

    /// Operator override: load from a file when a path is configured,
    /// otherwise fall back to the embedded catalog.
    pub fn load(path: Option<&str>) -> anyhow::Result<Self> {
        match path {
            Some(p) => {
                let text = std::fs::read_to_string(p)
                    .with_context(|| format!("failed to read catalog file: {p}"))?;
                Self::from_json(&text)
            }
            None => Self::builtin(),
        }
    }

    pub fn service(&self, id: &str) -> Option<&ServiceDefinition> {
        self.service_index.get(id).map(|&i| &self.services[i])
    }

    pub fn category(&self, id: &str) -> Option<&Category> {
        self.category_index.get(id).map(|&i| &self.categories[i])
    }

    /// Flattened list; every entry carries its owning category id/name.
    pub fn services(&self) -> &[ServiceDefinition] {
        &self.services
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Case-insensitive substring match over category names, service names,
    /// descriptions and keywords. Minimum query length is the caller's job.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let q = query.to_lowercase();
        let mut hits = Vec::new();

        for category in &self.categories {
            if category.name.to_lowercase().contains(&q) {
                hits.push(SearchHit::Category(category.clone()));
            }
        }

        for service in &self.services {
            let matched = service.name.to_lowercase().contains(&q)
                || service.description.to_lowercase().contains(&q)
                || service
                    .keywords
                    .iter()
                    .any(|k| k.to_lowercase().contains(&q));
            if matched {
                hits.push(SearchHit::Service(service.clone()));
            }
        }

        hits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = ServiceCatalog::builtin().unwrap();
        assert!(!catalog.services().is_empty());
        assert!(!catalog.categories().is_empty());
    }

    #[test]
    fn test_every_flattened_entry_resolves_by_id() {
        let catalog = ServiceCatalog::builtin().unwrap();
        for entry in catalog.services() {
            let found = catalog.service(&entry.id).unwrap();
            assert_eq!(found.name, entry.name);
            assert_eq!(found.category_id, entry.category_id);
            assert_eq!(found.category_name, entry.category_name);
        }
    }

    #[test]
    fn test_full_home_cleaning_entry() {
        let catalog = ServiceCatalog::builtin().unwrap();
        let service = catalog.service("full-home-cleaning").unwrap();
        assert_eq!(service.name, "Full Home Cleaning");
        assert_eq!(service.base_price, 50.0);
        assert_eq!(service.price_unit, PriceUnit::PerHour);
        assert_eq!(service.duration_minutes, 120);
        assert_eq!(service.category_id, "cleaning");
    }

    #[test]
    fn test_unknown_ids_return_none() {
        let catalog = ServiceCatalog::builtin().unwrap();
        assert!(catalog.service("no-such-service").is_none());
        assert!(catalog.category("no-such-category").is_none());
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let catalog = ServiceCatalog::builtin().unwrap();
        let hits = catalog.search("CLEANING");
        assert!(!hits.is_empty());
        for hit in &hits {
            match hit {
                SearchHit::Category(c) => {
                    assert!(c.name.to_lowercase().contains("cleaning"));
                }
                SearchHit::Service(s) => {
                    let q = "cleaning";
                    assert!(
                        s.name.to_lowercase().contains(q)
                            || s.description.to_lowercase().contains(q)
                            || s.keywords.iter().any(|k| k.to_lowercase().contains(q))
                    );
                }
            }
        }
    }

    #[test]
    fn test_search_matches_keywords() {
        let catalog = ServiceCatalog::builtin().unwrap();
        let hits = catalog.search("geyser");
        assert!(hits.iter().any(|hit| matches!(
            hit,
            SearchHit::Service(s) if s.id == "water-heater-installation"
        )));
    }

    #[test]
    fn test_search_no_matches() {
        let catalog = ServiceCatalog::builtin().unwrap();
        assert!(catalog.search("zzzzzz").is_empty());
    }

    #[test]
    fn test_duplicate_service_id_rejected() {
        let json = r#"{"categories":[{"id":"a","name":"A","description":"","services":[
            {"id":"svc","name":"One","description":"","base_price":10,"price_unit":"per-visit","duration_minutes":30},
            {"id":"svc","name":"Two","description":"","base_price":20,"price_unit":"per-visit","duration_minutes":30}
        ]}]}"#;
        assert!(ServiceCatalog::from_json(json).is_err());
    }

    #[test]
    fn test_non_positive_duration_rejected() {
        let json = r#"{"categories":[{"id":"a","name":"A","description":"","services":[
            {"id":"svc","name":"One","description":"","base_price":10,"price_unit":"per-visit","duration_minutes":0}
        ]}]}"#;
        assert!(ServiceCatalog::from_json(json).is_err());
    }

    #[test]
    fn test_search_hit_wire_shape() {
        let catalog = ServiceCatalog::builtin().unwrap();
        let hits = catalog.search("termite");
        let json = serde_json::to_value(&hits).unwrap();
        let first = &json.as_array().unwrap()[0];
        assert_eq!(first["type"], "service");
        assert!(first["data"]["id"].is_string());
    }
}
