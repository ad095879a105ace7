//! Output surface adapter
//!
//! Controller, renderer and auth state produce plain view values. A
//! [`Surface`] is the only thing that writes them out, and every write
//! replaces the whole region: nothing is appended.

use std::collections::BTreeMap;

use crate::auth::{AuthTab, HeaderView, LoginModal};
use crate::render::{MatchCard, ResultView, Tone};
use crate::upload::UploadView;

/// Independently replaceable part of the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Region {
    Header,
    Upload,
    Results,
    Notice,
    LoginModal,
}

/// Something that can be shown as an HTML fragment or as plain text
pub trait View {
    fn html(&self) -> String;
    fn text(&self) -> String;
}

/// Output target
pub trait Surface {
    /// Replace everything in `region` with `view`
    fn replace(&mut self, region: Region, view: &dyn View);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    #[default]
    Text,
    Html,
}

/// Surface kept in memory, one string per region
#[derive(Debug, Default)]
pub struct MemorySurface {
    format: Format,
    regions: BTreeMap<Region, String>,
    writes: usize,
}

impl MemorySurface {
    pub fn new(format: Format) -> Self {
        Self {
            format,
            ..Self::default()
        }
    }

    pub fn content(&self, region: Region) -> Option<&str> {
        self.regions.get(&region).map(String::as_str)
    }

    /// Number of replace calls so far
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// All non-empty regions in page order
    pub fn render_all(&self) -> String {
        self.regions
            .values()
            .filter(|content| !content.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Surface for MemorySurface {
    fn replace(&mut self, region: Region, view: &dyn View) {
        let content = match self.format {
            Format::Text => view.text(),
            Format::Html => view.html(),
        };
        self.regions.insert(region, content);
        self.writes += 1;
    }
}

pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

impl View for String {
    fn html(&self) -> String {
        format!("<p class=\"notice\">{}</p>", escape_html(self))
    }

    fn text(&self) -> String {
        self.clone()
    }
}

impl View for UploadView {
    fn html(&self) -> String {
        let preview = match &self.preview {
            Some(preview) => format!(
                "<img id=\"preview\" src=\"{}\" alt=\"{}\">",
                escape_html(&preview.src),
                escape_html(&preview.file_name)
            ),
            None => "<img id=\"preview\" hidden>".to_string(),
        };
        let disabled = if self.submit_enabled { "" } else { " disabled" };

        format!(
            "<div class=\"upload\">{}<button type=\"submit\" id=\"identify-btn\"{}>Identify</button></div>",
            preview, disabled
        )
    }

    fn text(&self) -> String {
        let selection = match &self.preview {
            Some(preview) => format!(
                "Selected: {} ({}, {} bytes)",
                preview.file_name, preview.mime_type, preview.size_bytes
            ),
            None => "No image selected".to_string(),
        };
        if self.submit_enabled {
            selection
        } else {
            format!("{} [identifying]", selection)
        }
    }
}

impl View for MatchCard {
    fn html(&self) -> String {
        let mut html = format!(
            "<div class=\"identified-plant-result\"><h3>{}. <strong>{}</strong></h3><p>Confidence: {}</p>",
            self.rank,
            escape_html(&self.scientific_name),
            self.confidence
        );
        if !self.common_names.is_empty() {
            html.push_str(&format!(
                "<p>Common names: {}</p>",
                escape_html(&self.common_names_joined())
            ));
        }
        for url in &self.image_urls {
            html.push_str(&format!(
                "<img class=\"reference\" src=\"{}\" alt=\"{}\">",
                escape_html(url),
                escape_html(&self.scientific_name)
            ));
        }
        html.push_str(&format!(
            "<button class=\"add-to-collection\" data-rank=\"{}\">Add to Collection</button></div>",
            self.rank
        ));
        html
    }

    fn text(&self) -> String {
        let mut text = format!(
            "{}. {} ({})",
            self.rank, self.scientific_name, self.confidence
        );
        if !self.common_names.is_empty() {
            text.push_str(&format!("\n   Common names: {}", self.common_names_joined()));
        }
        text
    }
}

impl View for ResultView {
    fn html(&self) -> String {
        match self {
            ResultView::Empty => String::new(),
            ResultView::Message { tone, text } => {
                let class = match tone {
                    Tone::Info => "info",
                    Tone::Error => "error",
                };
                format!("<p class=\"{}\">{}</p>", class, escape_html(text))
            }
            ResultView::Matches(cards) => cards.iter().map(View::html).collect(),
        }
    }

    fn text(&self) -> String {
        match self {
            ResultView::Empty => String::new(),
            ResultView::Message { text, .. } => text.clone(),
            ResultView::Matches(cards) => cards
                .iter()
                .map(View::text)
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }
}

impl View for HeaderView {
    fn html(&self) -> String {
        format!(
            "<span class=\"login-status\">{}</span><button class=\"login-btn\">{}</button>",
            escape_html(&self.status),
            self.action.label()
        )
    }

    fn text(&self) -> String {
        format!("{} [{}]", self.status, self.action.label())
    }
}

impl View for LoginModal {
    fn html(&self) -> String {
        if !self.is_open() {
            return String::new();
        }

        let tab = |t: AuthTab| {
            let active = if self.tab() == t { " active" } else { "" };
            format!("<button class=\"tab{}\">{}</button>", active, t.label())
        };
        let form = match self.tab() {
            AuthTab::Login => "<div id=\"login-form\"><input id=\"login-email\" type=\"email\" placeholder=\"Email\"><input id=\"login-password\" type=\"password\" placeholder=\"Password\"><button id=\"login-submit\">Login</button></div>",
            AuthTab::SignUp => "<div id=\"signup-form\"><input id=\"signup-name\" type=\"text\" placeholder=\"Name\"><input id=\"signup-email\" type=\"email\" placeholder=\"Email\"><input id=\"signup-password\" type=\"password\" placeholder=\"Password\"><button id=\"signup-submit\">Sign Up</button></div>",
        };

        format!(
            "<div id=\"login-modal\">{}{}{}<div id=\"login-error\">{}</div></div>",
            tab(AuthTab::Login),
            tab(AuthTab::SignUp),
            form,
            escape_html(self.error().unwrap_or(""))
        )
    }

    fn text(&self) -> String {
        if !self.is_open() {
            return String::new();
        }
        match self.error() {
            Some(error) => format!("[{}] {}", self.tab().label(), error),
            None => format!("[{}]", self.tab().label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::CollectionRequest;
    use crate::render::render_body;

    fn card() -> MatchCard {
        MatchCard {
            rank: 1,
            scientific_name: "Ficus lyrata".to_string(),
            confidence: "87.34%".to_string(),
            common_names: vec!["Fiddle Leaf Fig".to_string()],
            image_urls: vec![],
            action: CollectionRequest {
                scientific_name: "Ficus lyrata".to_string(),
                common_names: vec!["Fiddle Leaf Fig".to_string()],
            },
        }
    }

    #[test]
    fn test_replace_overwrites_region() {
        let mut surface = MemorySurface::new(Format::Text);

        surface.replace(Region::Results, &ResultView::pending());
        surface.replace(Region::Results, &ResultView::Matches(vec![card()]));

        let content = surface.content(Region::Results).unwrap();
        assert!(content.contains("Ficus lyrata"));
        assert!(!content.contains("Please wait"));
        assert_eq!(surface.writes(), 2);
    }

    #[test]
    fn test_same_view_twice_renders_once() {
        let view = render_body(
            r#"{"results":[{"score":0.8734,"species":{"scientificNameWithoutAuthor":"Ficus lyrata"}}]}"#,
            3,
        );
        let mut surface = MemorySurface::new(Format::Html);

        surface.replace(Region::Results, &view);
        let first = surface.content(Region::Results).unwrap().to_string();
        surface.replace(Region::Results, &view);

        assert_eq!(surface.content(Region::Results).unwrap(), first);
        assert_eq!(first.matches("identified-plant-result").count(), 1);
    }

    #[test]
    fn test_card_text() {
        assert_eq!(
            card().text(),
            "1. Ficus lyrata (87.34%)\n   Common names: Fiddle Leaf Fig"
        );
    }

    #[test]
    fn test_html_escapes_upstream_text() {
        let mut card = card();
        card.scientific_name = "<script>alert(1)</script>".to_string();

        let html = card.html();

        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_upload_view_disables_button_in_flight() {
        let view = UploadView {
            preview: None,
            submit_enabled: false,
        };

        assert!(view.html().contains("disabled"));
        assert!(view.html().contains("hidden"));
    }

    #[test]
    fn test_closed_modal_renders_nothing() {
        assert_eq!(LoginModal::default().html(), "");
    }

    #[test]
    fn test_error_message_html_class() {
        let html = ResultView::error("Image too large").html();
        assert_eq!(html, "<p class=\"error\">Image too large</p>");
    }
}
