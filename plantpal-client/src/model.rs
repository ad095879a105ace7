//! Identification response model
//!
//! The upstream schema is owned by the identification API and treated as
//! untrusted: every field is optional, and `null` is read as "absent".
//! Match order is kept exactly as received.

use serde::{Deserialize, Deserializer};

use crate::error::{ClientError, ClientResult};

/// Top-level identification response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IdentificationResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub results: Vec<Match>,
    pub best_match: Option<String>,
}

/// One candidate identification
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Match {
    /// Confidence, 0.0 to 1.0
    #[serde(deserialize_with = "null_as_default")]
    pub score: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub species: Species,
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<ReferenceImage>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Species {
    pub scientific_name_without_author: Option<String>,
    pub scientific_name: Option<String>,
    pub scientific_name_authorship: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub common_names: Vec<String>,
    pub genus: Option<Taxon>,
    pub family: Option<Taxon>,
}

/// Genus or family
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Taxon {
    pub scientific_name_without_author: Option<String>,
    pub scientific_name: Option<String>,
}

/// Reference image attached to a match
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ReferenceImage {
    pub organ: Option<String>,
    pub author: Option<String>,
    pub license: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub url: ImageUrls,
}

/// Original, medium and small renditions
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImageUrls {
    pub o: Option<String>,
    pub m: Option<String>,
    pub s: Option<String>,
}

impl IdentificationResponse {
    pub fn from_json(body: &str) -> ClientResult<Self> {
        serde_json::from_str(body).map_err(|e| ClientError::MalformedResponse(e.to_string()))
    }
}

impl Species {
    /// Name without authorship, falling back to the full name
    pub fn display_name(&self) -> &str {
        non_empty(self.scientific_name_without_author.as_deref())
            .or_else(|| non_empty(self.scientific_name.as_deref()))
            .unwrap_or("Unknown")
    }

    /// Common names with blanks removed, in upstream order
    pub fn common_names(&self) -> Vec<&str> {
        self.common_names
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .collect()
    }
}

impl Match {
    /// Confidence as a percentage with two decimals, e.g. `87.34%`
    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.score * 100.0)
    }

    /// Displayable reference image URLs (medium rendition preferred)
    pub fn image_urls(&self) -> Vec<&str> {
        self.images.iter().filter_map(ReferenceImage::best_url).collect()
    }
}

impl ReferenceImage {
    pub fn best_url(&self) -> Option<&str> {
        non_empty(self.url.m.as_deref())
            .or_else(|| non_empty(self.url.o.as_deref()))
            .or_else(|| non_empty(self.url.s.as_deref()))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
