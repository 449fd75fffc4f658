//! HTML page rendering.
//!
//! Templates are plain HTML with `{{ slot }}` placeholders. They are parsed
//! once at startup into a `PageRenderer`, which the server hands to the page
//! handlers as shared application data.

use std::fmt::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::formatters::escape_html;

const LAYOUT_FILE: &str = "layout.html";
const ROCKETPOOL_PAGE_FILE: &str = "pools_rocketpool.html";

/// Container the ad script fills in on pages that carry a header ad.
const HEADER_AD_MARKUP: &str = r#"<div id="header-ad" class="header-ad"></div>"#;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("error reading template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unterminated placeholder in {template}")]
    Unterminated { template: String },

    #[error("unknown placeholder `{slot}` in {template}")]
    UnknownSlot { template: String, slot: String },

    #[error("{template} has no content placeholder")]
    MissingContent { template: String },

    #[error("content placeholder is only allowed in the layout, found in {template}")]
    UnexpectedContent { template: String },

    #[error("error writing page: {0}")]
    Fmt(#[from] std::fmt::Error),
}

/// Per-request page context: what the layout needs to draw navigation and
/// the document head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageData {
    /// Navigation entry to highlight.
    pub active: String,
    pub path: String,
    pub title: String,
    pub header_ad: bool,
}

impl PageData {
    pub fn new(active: &str, path: &str, title: &str) -> Self {
        PageData {
            active: active.to_string(),
            path: path.to_string(),
            title: title.to_string(),
            header_ad: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Title,
    Path,
    Active,
    HeaderAd,
    Content,
}

impl Slot {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "title" => Some(Slot::Title),
            "path" => Some(Slot::Path),
            "active" => Some(Slot::Active),
            "header_ad" => Some(Slot::HeaderAd),
            "content" => Some(Slot::Content),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Slot(Slot),
}

#[derive(Debug, Clone)]
struct Template {
    segments: Vec<Segment>,
}

impl Template {
    fn parse(name: &str, source: &str) -> Result<Self, RenderError> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Text(rest[..open].to_string()));
            }
            let after_open = &rest[open + 2..];
            let close = after_open.find("}}").ok_or_else(|| RenderError::Unterminated {
                template: name.to_string(),
            })?;
            let slot_name = after_open[..close].trim();
            let slot = Slot::from_name(slot_name).ok_or_else(|| RenderError::UnknownSlot {
                template: name.to_string(),
                slot: slot_name.to_string(),
            })?;
            segments.push(Segment::Slot(slot));
            rest = &after_open[close + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Template { segments })
    }

    fn has_slot(&self, slot: Slot) -> bool {
        self.segments.iter().any(|s| *s == Segment::Slot(slot))
    }

    fn render_into(
        &self,
        out: &mut String,
        data: &PageData,
        content: &str,
    ) -> Result<(), RenderError> {
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Slot(Slot::Title) => write!(out, "{}", escape_html(&data.title))?,
                Segment::Slot(Slot::Path) => write!(out, "{}", escape_html(&data.path))?,
                Segment::Slot(Slot::Active) => write!(out, "{}", escape_html(&data.active))?,
                Segment::Slot(Slot::HeaderAd) => {
                    if data.header_ad {
                        out.push_str(HEADER_AD_MARKUP);
                    }
                }
                Segment::Slot(Slot::Content) => out.push_str(content),
            }
        }
        Ok(())
    }
}

/// The parsed layout and Rocket Pool page body.
#[derive(Debug, Clone)]
pub struct PageRenderer {
    layout: Template,
    page: Template,
}

impl PageRenderer {
    /// Reads `layout.html` and `pools_rocketpool.html` from `dir`.
    pub fn from_dir(dir: &Path) -> Result<Self, RenderError> {
        let layout = read_template(&dir.join(LAYOUT_FILE))?;
        let page = read_template(&dir.join(ROCKETPOOL_PAGE_FILE))?;
        Self::parse(&layout, &page)
    }

    pub fn parse(layout: &str, page: &str) -> Result<Self, RenderError> {
        let layout = Template::parse(LAYOUT_FILE, layout)?;
        if !layout.has_slot(Slot::Content) {
            return Err(RenderError::MissingContent {
                template: LAYOUT_FILE.to_string(),
            });
        }
        let page = Template::parse(ROCKETPOOL_PAGE_FILE, page)?;
        if page.has_slot(Slot::Content) {
            return Err(RenderError::UnexpectedContent {
                template: ROCKETPOOL_PAGE_FILE.to_string(),
            });
        }
        Ok(PageRenderer { layout, page })
    }

    pub fn render(&self, data: &PageData) -> Result<String, RenderError> {
        let mut body = String::new();
        self.page.render_into(&mut body, data, "")?;

        let mut html = String::with_capacity(body.len() + 4096);
        self.layout.render_into(&mut html, data, &body)?;
        Ok(html)
    }
}

fn read_template(path: &Path) -> Result<String, RenderError> {
    std::fs::read_to_string(path).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}
