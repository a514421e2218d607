use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

/// Shown in place of an article image that is missing or fails to load.
pub const FALLBACK_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1504711434969-e33886168f5c?w=800&h=400&fit=crop";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewsItem {
    pub id: i64,

    #[serde(alias = "titulo")]
    pub title: String,

    pub link: Url,

    #[serde(default, alias = "imagem")]
    pub image: Option<String>,

    #[serde(alias = "resumo")]
    pub summary: String,

    #[serde(alias = "fonte")]
    pub source: String,

    #[serde(default, deserialize_with = "null_as_zero")]
    pub score: f64,

    pub status: String,
}

impl NewsItem {
    pub fn image_or_fallback(&self) -> &str {
        match self.image.as_deref() {
            Some(image) if !image.trim().is_empty() => image,
            _ => FALLBACK_IMAGE_URL,
        }
    }
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// The envelope returned by `GET /news` and `GET /news/{id}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct NewsResponse {
    pub success: bool,
    pub data: Vec<NewsItem>,
    pub total: usize,

    #[serde(default)]
    pub cached: bool,

    pub timestamp: String,
}

/// The body of `GET /health`.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database_connected: bool,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiStatus {
    pub online: bool,
    pub status: String,
    pub version: String,
    pub database_connected: bool,
}

impl ApiStatus {
    pub fn offline() -> Self {
        Self {
            online: false,
            status: "offline".into(),
            version: "1.0.0".into(),
            database_connected: false,
        }
    }
}

impl Default for ApiStatus {
    fn default() -> Self {
        Self::offline()
    }
}

impl From<HealthResponse> for ApiStatus {
    fn from(health: HealthResponse) -> Self {
        Self {
            online: true,
            status: health.status,
            version: health.version,
            database_connected: health.database_connected,
        }
    }
}
