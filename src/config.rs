use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub catalog_path: Option<String>,
    pub google_places_api_key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            database_url: env::var("DATABASE_URL").unwrap_or_else(|_| "genie.db".to_string()),
            catalog_path: env::var("CATALOG_PATH").ok().filter(|v| !v.is_empty()),
            google_places_api_key: env::var("GOOGLE_PLACES_API_KEY").unwrap_or_default(),
        }
    }
}
