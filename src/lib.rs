//! Render CMS rich-text content (plain strings, raw markup, or block trees
//! from a rich-text editor) into a keyed presentation tree, and from there
//! into HTML, Typst, SVG or PDF.

mod block;
mod config;
mod error;
mod html;
mod media;
mod parser;
mod render;
mod typst;

pub use block::{Block, ContentValue, ListFormat, Media, TextRun, TextStyle};
pub use config::{Config, MEDIA_URL_ENV};
pub use error::{Error, Result};
pub use html::{node_to_html, to_html};
pub use media::MediaResolver;
pub use parser::parse_block;
pub use render::{
    DEFAULT_HEADING_LEVEL, Key, Node, NodeKind, Output, PLACEHOLDER_HREF, TrustedMarkup,
    looks_like_markup, render, render_block,
};
pub use typst::to_typst;

use tracing::debug;
use typst_as_lib::TypstEngine;
use typst_as_lib::typst_kit_options::TypstKitFontOptions;
use typst_pdf::PdfOptions;

/// Classify an already-decoded CMS value.
pub fn parse(value: &serde_json::Value) -> ContentValue {
    parser::parse(value)
}

/// Decode JSON text and classify it.
pub fn parse_json(json: &str) -> Result<ContentValue> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    Ok(parser::parse(&value))
}

/// Render, then resolve image sources against the configured media base.
pub fn render_with_config(content: &ContentValue, config: &Config) -> Option<Output> {
    let mut output = render(content)?;
    if config.media.resolve {
        let resolver = MediaResolver::new(&config.media.base_url);
        debug!(base = resolver.base(), "resolving media urls");
        resolver.resolve_output(&mut output);
    }
    Some(output)
}

/// Convert content to HTML. Image sources are left as the CMS sent them.
pub fn content_to_html(content: &ContentValue) -> String {
    render(content).map(|output| to_html(&output)).unwrap_or_default()
}

/// Convert content to HTML, resolving media per config.
pub fn content_to_html_with_config(content: &ContentValue, config: &Config) -> String {
    render_with_config(content, config)
        .map(|output| to_html(&output))
        .unwrap_or_default()
}

/// Convert content to Typst markup using default config.
pub fn content_to_typst(content: &ContentValue) -> String {
    content_to_typst_with_config(content, &Config::compiled_default())
}

/// Convert content to Typst markup with custom config.
pub fn content_to_typst_with_config(content: &ContentValue, config: &Config) -> String {
    match render_with_config(content, config) {
        Some(output) => to_typst(&output, config),
        // Still a valid (empty) document
        None => to_typst(&Output::Nodes(Vec::new()), config),
    }
}

/// Convert content to PDF bytes using default config.
pub fn content_to_pdf(content: &ContentValue) -> Result<Vec<u8>> {
    content_to_pdf_with_config(content, &Config::compiled_default())
}

/// Lays out the Typst source for `content` with the embedded fonts only,
/// so output does not depend on the fonts installed on the host.
fn compile_document(
    content: &ContentValue,
    config: &Config,
) -> Result<typst_library::layout::PagedDocument> {
    let typst_content = content_to_typst_with_config(content, config);

    let font_options = TypstKitFontOptions::new()
        .include_embedded_fonts(true)
        .include_system_fonts(false);

    let engine = TypstEngine::builder()
        .main_file(typst_content)
        .search_fonts_with(font_options)
        .build();

    engine
        .compile()
        .output
        .map_err(|e| Error::Typst(format!("{:?}", e)))
}

/// PDF bytes for `content`, using `config` for page setup and media URLs.
pub fn content_to_pdf_with_config(content: &ContentValue, config: &Config) -> Result<Vec<u8>> {
    let doc = compile_document(content, config)?;

    typst_pdf::pdf(&doc, &PdfOptions::default()).map_err(|e| Error::Pdf(format!("{:?}", e)))
}

/// Laid-out pages as standalone SVG strings, one per page.
///
/// `width_pt`/`height_pt` describe the first page; [`A4_PT`] when there are
/// no pages.
pub struct SvgDocument {
    pub pages: Vec<String>,
    pub width_pt: f64,
    pub height_pt: f64,
}

/// A4 in points
pub const A4_PT: (f64, f64) = (595.0, 842.0);

/// SVG pages for `content` with the bundled defaults.
pub fn content_to_svg(content: &ContentValue) -> Result<SvgDocument> {
    content_to_svg_with_config(content, &Config::compiled_default())
}

pub fn content_to_svg_with_config(content: &ContentValue, config: &Config) -> Result<SvgDocument> {
    let doc = compile_document(content, config)?;

    let pages: Vec<String> = doc.pages.iter().map(typst_svg::svg).collect();

    let (width_pt, height_pt) = doc.pages.first().map_or(A4_PT, |page| {
        let size = page.frame.size();
        (size.x.to_pt(), size.y.to_pt())
    });

    Ok(SvgDocument {
        pages,
        width_pt,
        height_pt,
    })
}
