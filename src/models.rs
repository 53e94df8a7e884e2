use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Which design of a pair a vote goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Original,
    Ai,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Original => "original",
            Side::Ai => "ai",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "original" => Ok(Side::Original),
            "ai" => Ok(Side::Ai),
            other => Err(format!("side must be 'original' or 'ai', got '{other}'")),
        }
    }
}

/// One catalog item: an original design and its AI-generated counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignPair {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub price: String,
    pub product_url: String,
    pub original_image_url: String,
    pub ai_image_url: String,
    pub tags: Vec<String>,
    pub description: String,
}

/// Loose shape of a catalog item as it arrives from a catalog source.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogRecord {
    pub id: Option<serde_json::Value>,
    pub name: Option<String>,
    pub artist: Option<String>,
    pub price: Option<serde_json::Value>,
    pub product_url: Option<String>,
    pub original_image_url: Option<String>,
    pub ai_image_url: Option<String>,
    pub tags: Option<Vec<String>>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    #[serde(alias = "votes_original", default)]
    pub original: u64,
    #[serde(alias = "votes_ai", default)]
    pub ai: u64,
}

impl VoteTally {
    pub fn new(original: u64, ai: u64) -> Self {
        Self { original, ai }
    }

    pub fn count(&self, side: Side) -> u64 {
        match side {
            Side::Original => self.original,
            Side::Ai => self.ai,
        }
    }
}

/// Persisted vote rows keyed by pair id.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VoteData {
    pub tallies: BTreeMap<String, VoteTally>,
}

/// A pair joined with its tally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub pair: DesignPair,
    pub votes: VoteTally,
    pub total: u64,
    pub original_share: f64,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub side: String,
}

#[derive(Debug, Deserialize)]
pub struct ShopQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HoodiePair {
    #[serde(flatten)]
    pub pair: DesignPair,
    pub votes: VoteTally,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HoodieDetailResponse {
    #[serde(flatten)]
    pub pair: DesignPair,
    pub votes: VoteTally,
    pub total: u64,
    pub pct_original: u8,
    pub pct_ai: u8,
}

#[derive(Debug, Serialize)]
pub struct ResultEntry {
    pub id: String,
    pub name: String,
    pub price: String,
    pub original_image_url: String,
    pub ai_image_url: String,
    pub original: u64,
    pub ai: u64,
    pub total: u64,
    pub pct_original: u8,
    pub pct_ai: u8,
}

#[derive(Debug, Serialize)]
pub struct TopPick {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image_url: String,
    pub share_pct: f64,
}

#[derive(Debug, Serialize)]
pub struct ResultsResponse {
    pub generated_at: String,
    pub total_votes: u64,
    pub total_original: u64,
    pub total_ai: u64,
    pub original_pct: f64,
    pub ai_pct: f64,
    pub top_original: Option<TopPick>,
    pub top_ai: Option<TopPick>,
    pub ranked: Vec<ResultEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_parses_loosely() {
        assert_eq!(" AI ".parse::<Side>(), Ok(Side::Ai));
        assert_eq!("Original".parse::<Side>(), Ok(Side::Original));
        assert!("both".parse::<Side>().is_err());
    }

    #[test]
    fn tally_accepts_backend_column_names() {
        let tally: VoteTally =
            serde_json::from_str(r#"{"votes_original": 4, "votes_ai": 9}"#).unwrap();
        assert_eq!(tally, VoteTally::new(4, 9));

        let partial: VoteTally = serde_json::from_str(r#"{"ai": 2}"#).unwrap();
        assert_eq!(partial, VoteTally::new(0, 2));
    }

    #[test]
    fn hoodie_pair_flattens_design_fields() {
        let pair = DesignPair {
            id: "7".into(),
            name: "Night Owl".into(),
            artist: "inkwell".into(),
            price: "£30.00".into(),
            product_url: "https://example.com/7".into(),
            original_image_url: "https://cdn.example.com/o/7.png".into(),
            ai_image_url: "https://cdn.example.com/g/7.png".into(),
            tags: vec!["owl".into()],
            description: "An owl".into(),
        };
        let json = serde_json::to_value(HoodiePair {
            pair,
            votes: VoteTally::new(1, 2),
        })
        .unwrap();
        assert_eq!(json["id"], "7");
        assert_eq!(json["votes"]["ai"], 2);
    }
}
