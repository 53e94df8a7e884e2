use crate::errors::CatalogError;
use crate::models::{CatalogRecord, DesignPair};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::{fs, sync::RwLock};
use tracing::{info, warn};
use url::Url;

/// Where the design catalog comes from.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    Remote(Url),
    File(PathBuf),
    Builtin,
}

impl CatalogSource {
    pub async fn load(&self, client: &Client) -> Vec<DesignPair> {
        let loaded = match self {
            CatalogSource::Remote(base) => fetch_remote(client, base).await,
            CatalogSource::File(path) => read_file(path).await,
            CatalogSource::Builtin => return fallback_catalog(),
        };

        match loaded {
            Ok(pairs) => pairs,
            Err(err) => {
                warn!("catalog source unavailable, using fallback data: {err}");
                fallback_catalog()
            }
        }
    }
}

async fn fetch_remote(client: &Client, base: &Url) -> Result<Vec<DesignPair>, CatalogError> {
    let endpoint = hoodies_endpoint(base)?;
    let records: Vec<serde_json::Value> = client
        .get(endpoint.clone())
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    Ok(ingest(records, Some(&endpoint)))
}

async fn read_file(path: &Path) -> Result<Vec<DesignPair>, CatalogError> {
    let bytes = fs::read(path).await?;
    parse_catalog(&bytes, None)
}

pub fn parse_catalog(bytes: &[u8], base: Option<&Url>) -> Result<Vec<DesignPair>, CatalogError> {
    let records: Vec<serde_json::Value> = serde_json::from_slice(bytes)?;
    Ok(ingest(records, base))
}

fn hoodies_endpoint(base: &Url) -> Result<Url, CatalogError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join("hoodies")?)
}

/// Validates raw records one by one. Malformed records, records without an id
/// and repeated ids are skipped.
pub fn ingest(records: Vec<serde_json::Value>, base: Option<&Url>) -> Vec<DesignPair> {
    let mut seen = HashSet::new();
    let mut pairs = Vec::with_capacity(records.len());

    for value in records {
        let record = match serde_json::from_value::<CatalogRecord>(value) {
            Ok(record) => record,
            Err(err) => {
                warn!("skipping malformed catalog record: {err}");
                continue;
            }
        };
        match to_design_pair(record, base) {
            Ok(pair) => {
                if seen.insert(pair.id.clone()) {
                    pairs.push(pair);
                } else {
                    warn!("skipping duplicate catalog id {}", pair.id);
                }
            }
            Err(err) => warn!("skipping catalog record: {err}"),
        }
    }

    pairs
}

pub fn to_design_pair(record: CatalogRecord, base: Option<&Url>) -> Result<DesignPair, CatalogError> {
    let id = scalar_text(record.id);
    if id.is_empty() {
        return Err(CatalogError::MissingId);
    }

    let text = |value: Option<String>| value.map(|v| v.trim().to_string()).unwrap_or_default();

    Ok(DesignPair {
        id,
        name: text(record.name),
        artist: text(record.artist),
        price: scalar_text(record.price),
        product_url: text(record.product_url),
        original_image_url: resolve_image_url(base, &text(record.original_image_url)),
        ai_image_url: resolve_image_url(base, &text(record.ai_image_url)),
        tags: clean_tags(record.tags.unwrap_or_default()),
        description: text(record.description),
    })
}

// Strings are trimmed, numbers rendered as written, anything else is empty.
fn scalar_text(value: Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(text)) => text.trim().to_string(),
        Some(serde_json::Value::Number(number)) => number.to_string(),
        _ => String::new(),
    }
}

fn clean_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|tag| tag.trim().to_string())
        .filter(|tag| !tag.is_empty() && seen.insert(tag.to_lowercase()))
        .collect()
}

/// Absolute URLs pass through; relative ones are joined onto the catalog location.
pub fn resolve_image_url(base: Option<&Url>, image: &str) -> String {
    if image.is_empty() || Url::parse(image).is_ok() {
        return image.to_string();
    }
    match base.and_then(|base| base.join(image).ok()) {
        Some(url) => url.to_string(),
        None => image.to_string(),
    }
}

struct CachedCatalog {
    pairs: Arc<Vec<DesignPair>>,
    fetched_at: DateTime<Utc>,
}

/// Read-through cache in front of a [`CatalogSource`].
#[derive(Clone)]
pub struct CatalogCache {
    source: CatalogSource,
    client: Client,
    ttl: Duration,
    cached: Arc<RwLock<Option<CachedCatalog>>>,
}

impl CatalogCache {
    pub fn new(source: CatalogSource, client: Client, ttl: Duration) -> Self {
        Self {
            source,
            client,
            ttl,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    pub async fn pairs(&self) -> Arc<Vec<DesignPair>> {
        let now = Utc::now();
        if let Some(cached) = self.cached.read().await.as_ref() {
            if now - cached.fetched_at < self.ttl {
                return Arc::clone(&cached.pairs);
            }
        }

        let mut guard = self.cached.write().await;
        if let Some(cached) = guard.as_ref() {
            if now - cached.fetched_at < self.ttl {
                return Arc::clone(&cached.pairs);
            }
        }

        let pairs = Arc::new(self.source.load(&self.client).await);
        info!("loaded {} design pairs", pairs.len());
        *guard = Some(CachedCatalog {
            pairs: Arc::clone(&pairs),
            fetched_at: Utc::now(),
        });
        pairs
    }

    pub async fn find(&self, id: &str) -> Option<DesignPair> {
        self.pairs().await.iter().find(|pair| pair.id == id).cloned()
    }

    pub async fn invalidate(&self) {
        *self.cached.write().await = None;
    }
}

/// Served when no catalog source is configured or the configured one fails.
pub fn fallback_catalog() -> Vec<DesignPair> {
    let records = serde_json::from_str::<Vec<serde_json::Value>>(FALLBACK_CATALOG).unwrap_or_default();
    ingest(records, None)
}

const FALLBACK_CATALOG: &str = r#"[
  {
    "id": "1",
    "name": "LCR Run Kit Pullover Sweatshirt",
    "artist": "WILLO23",
    "price": "£33.71",
    "product_url": "https://www.redbubble.com/i/sweatshirt/LCR-Run-Kit-by-WILLO23/172329451.LEP2X",
    "original_image_url": "data/images/original/1.png",
    "ai_image_url": "data/images/generated/1.png",
    "tags": ["grayscale", "trendy", "cool", "graphic design", "bold", "sharp", "sports"],
    "description": "LCR rise and grind text with a cartoon drink cup mascot running next to it"
  },
  {
    "id": "2",
    "name": "Urban Explorer Hoodie",
    "artist": "StreetDesigns",
    "price": "£29.99",
    "product_url": "https://example.com/urban-explorer",
    "original_image_url": "data/images/original/2.png",
    "ai_image_url": "data/images/generated/2.png",
    "tags": ["urban", "streetwear", "modern", "casual"],
    "description": "A sleek urban hoodie perfect for city adventures and street exploration"
  },
  {
    "id": "3",
    "name": "Cosmic Wanderer",
    "artist": "SpaceArt",
    "price": "£35.50",
    "product_url": "https://example.com/cosmic-wanderer",
    "original_image_url": "data/images/original/3.png",
    "ai_image_url": "data/images/generated/3.png",
    "tags": ["space", "galaxy", "cosmic", "abstract", "colorful"],
    "description": "Space-themed hoodie with galaxy patterns and cosmic vibes for stargazers"
  }
]"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_catalog_path() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let mut path = std::env::temp_dir();
        path.push(format!("hoodie_vote_catalog_{}_{}.json", std::process::id(), nanos));
        path
    }

    #[test]
    fn fallback_catalog_has_three_pairs() {
        let pairs = fallback_catalog();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].id, "1");
        assert_eq!(pairs[2].name, "Cosmic Wanderer");
    }

    #[test]
    fn ingest_skips_missing_and_duplicate_ids() {
        let json = br#"[
            {"id": "a", "name": "First"},
            {"name": "No id"},
            {"id": "   "},
            {"id": "a", "name": "Second"},
            {"id": 42, "tags": [" bold ", "", "Bold", "retro"]}
        ]"#;
        let pairs = parse_catalog(json, None).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].name, "First");
        assert_eq!(pairs[1].id, "42");
        assert_eq!(pairs[1].tags, vec!["bold", "retro"]);
        assert_eq!(pairs[1].artist, "");
    }

    #[test]
    fn malformed_records_do_not_drop_the_rest() {
        let json = br#"[
            {"id": "1", "name": "Good"},
            {"id": "2", "price": 33.71},
            {"id": "3", "tags": ["ok", 7]},
            "not an object",
            {"id": "4", "name": ["wrong"]},
            {"id": "5", "name": "Also good"}
        ]"#;
        let pairs = parse_catalog(json, None).unwrap();
        let ids: Vec<_> = pairs.iter().map(|pair| pair.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "5"]);
        assert_eq!(pairs[1].price, "33.71");
    }

    #[test]
    fn parse_rejects_non_list() {
        assert!(matches!(
            parse_catalog(br#"{"id": "1"}"#, None),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn image_urls_resolve_against_catalog_location() {
        let base = Url::parse("https://api.example.com/v1/hoodies").unwrap();
        assert_eq!(
            resolve_image_url(Some(&base), "data/images/original/1.png"),
            "https://api.example.com/v1/data/images/original/1.png"
        );
        assert_eq!(
            resolve_image_url(Some(&base), "https://cdn.example.com/1.png"),
            "https://cdn.example.com/1.png"
        );
        assert_eq!(resolve_image_url(None, "images/1.png"), "images/1.png");
        assert_eq!(resolve_image_url(Some(&base), ""), "");
    }

    #[test]
    fn endpoint_appends_hoodies() {
        let base = Url::parse("https://api.example.com/v1").unwrap();
        assert_eq!(
            hoodies_endpoint(&base).unwrap().as_str(),
            "https://api.example.com/v1/hoodies"
        );
        let root = Url::parse("http://localhost:8000").unwrap();
        assert_eq!(
            hoodies_endpoint(&root).unwrap().as_str(),
            "http://localhost:8000/hoodies"
        );
    }

    #[tokio::test]
    async fn file_source_reads_catalog() {
        let path = unique_catalog_path();
        fs::write(&path, br#"[{"id": "x", "name": "From file"}]"#)
            .await
            .unwrap();
        let pairs = CatalogSource::File(path.clone()).load(&Client::new()).await;
        let _ = fs::remove_file(&path).await;
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].name, "From file");
    }

    #[tokio::test]
    async fn missing_file_falls_back() {
        let pairs = CatalogSource::File(unique_catalog_path())
            .load(&Client::new())
            .await;
        assert_eq!(pairs, fallback_catalog());
    }

    #[tokio::test]
    async fn cache_serves_until_invalidated() {
        let path = unique_catalog_path();
        fs::write(&path, br#"[{"id": "x"}]"#).await.unwrap();
        let cache = CatalogCache::new(
            CatalogSource::File(path.clone()),
            Client::new(),
            Duration::seconds(300),
        );
        assert_eq!(cache.pairs().await.len(), 1);

        fs::write(&path, br#"[{"id": "x"}, {"id": "y"}]"#).await.unwrap();
        assert_eq!(cache.pairs().await.len(), 1);
        assert!(cache.find("y").await.is_none());

        cache.invalidate().await;
        assert_eq!(cache.pairs().await.len(), 2);
        assert!(cache.find("y").await.is_some());
        let _ = fs::remove_file(&path).await;
    }
}
