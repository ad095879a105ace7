//! "Add to collection" action
//!
//! Each match card carries the names needed to save the plant. Saving is not
//! implemented; performing the action only acknowledges it.

use tracing::info;

/// Names captured from a match card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionRequest {
    pub scientific_name: String,
    pub common_names: Vec<String>,
}

impl CollectionRequest {
    /// Preferred label: first common name, else the scientific name
    pub fn label(&self) -> &str {
        self.common_names
            .first()
            .map(String::as_str)
            .unwrap_or(&self.scientific_name)
    }
}

/// Perform the action; returns the notice to show the user
pub fn add_to_collection(request: &CollectionRequest) -> String {
    info!(
        scientific_name = %request.scientific_name,
        common_names = ?request.common_names,
        "Add to collection requested"
    );
    format!(
        "Saving {} ({}) to your collection is coming soon.",
        request.label(),
        request.scientific_name
    )
}
