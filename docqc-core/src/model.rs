//! Object model of a WordprocessingML document.
//!
//! A read-only projection of the markup tree: body paragraphs, body tables
//! (rows -> cells -> paragraphs), runs with their directly-set formatting,
//! and the geometry of the first section. Values that are not set on the
//! element itself stay `None`; they inherit from styles and are never
//! treated as asserted by the rules.

use crate::markup::{MarkupTree, XmlElement};
use serde::Serialize;
use std::collections::HashMap;

pub const TWIPS_PER_INCH: f64 = 1440.0;

pub fn twips_to_inches(twips: f64) -> f64 {
    twips / TWIPS_PER_INCH
}

/// Formatting set directly on a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunAttributes {
    pub font_name: Option<String>,
    pub font_size_pt: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
}

impl RunAttributes {
    fn from_run_properties(rpr: Option<&XmlElement>) -> Self {
        let Some(rpr) = rpr else {
            return Self::default();
        };

        let font_name = rpr.child("rFonts").and_then(|fonts| {
            fonts
                .attr("w:ascii")
                .or_else(|| fonts.attr("w:hAnsi"))
                .map(str::to_string)
        });

        // w:sz is expressed in half-points
        let font_size_pt = rpr
            .child("sz")
            .and_then(|sz| sz.attr("w:val"))
            .and_then(|val| val.trim().parse::<f64>().ok())
            .map(|half_points| half_points / 2.0);

        Self {
            font_name,
            font_size_pt,
            bold: rpr.child("b").map(toggle_value),
            italic: rpr.child("i").map(toggle_value),
        }
    }
}

/// On/off properties: present without `w:val` means on.
fn toggle_value(element: &XmlElement) -> bool {
    !matches!(element.attr("w:val"), Some("0") | Some("false") | Some("off"))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    pub text: String,
    pub attributes: RunAttributes,
    /// Byte offsets into `text` at which a manual page break occurs
    pub page_breaks: Vec<usize>,
}

impl Run {
    fn from_element(element: &XmlElement) -> Self {
        let mut text = String::new();
        let mut page_breaks = Vec::new();

        for child in element.child_elements() {
            match child.local_name() {
                "t" => text.push_str(&child.own_text()),
                "tab" => text.push('\t'),
                "br" if child.attr("w:type") == Some("page") => page_breaks.push(text.len()),
                "br" | "cr" => text.push('\n'),
                "noBreakHyphen" => text.push('-'),
                _ => {}
            }
        }

        Self {
            text,
            attributes: RunAttributes::from_run_properties(element.child("rPr")),
            page_breaks,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    pub style_name: Option<String>,
    pub runs: Vec<Run>,
}

impl Paragraph {
    fn from_element(element: &XmlElement, styles: &StyleCatalog) -> Self {
        let style_id = element
            .child("pPr")
            .and_then(|ppr| ppr.child("pStyle"))
            .and_then(|style| style.attr("w:val"));
        let style_name = match style_id {
            Some(id) => Some(styles.display_name(id)),
            None => styles.default_paragraph_style.clone(),
        };

        // Runs nested in hyperlinks are part of the paragraph's visible text
        let mut runs = Vec::new();
        for child in element.child_elements() {
            match child.local_name() {
                "r" => runs.push(Run::from_element(child)),
                "hyperlink" => runs.extend(child.children_named("r").map(Run::from_element)),
                _ => {}
            }
        }

        Self { style_name, runs }
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn style_starts_with(&self, prefix: &str) -> bool {
        self.style_name
            .as_deref()
            .map(|name| name.starts_with(prefix))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCell {
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    pub cells: Vec<TableCell>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub rows: Vec<TableRow>,
}

impl Table {
    fn from_element(element: &XmlElement, styles: &StyleCatalog) -> Self {
        let rows = element
            .children_named("tr")
            .map(|row| TableRow {
                cells: row
                    .children_named("tc")
                    .map(|cell| TableCell {
                        paragraphs: cell
                            .children_named("p")
                            .map(|p| Paragraph::from_element(p, styles))
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        Self { rows }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Portrait,
    Landscape,
}

/// Page geometry of the first section, in twips as written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionGeometry {
    pub orientation: Option<Orientation>,
    pub page_width: Option<f64>,
    pub page_height: Option<f64>,
    pub margin_top: Option<f64>,
    pub margin_right: Option<f64>,
    pub margin_bottom: Option<f64>,
    pub margin_left: Option<f64>,
    pub header_distance: Option<f64>,
    pub footer_distance: Option<f64>,
}

impl SectionGeometry {
    fn from_section_properties(sect_pr: &XmlElement) -> Self {
        let twips = |element: Option<&XmlElement>, name: &str| {
            element
                .and_then(|e| e.attr(name))
                .and_then(|value| value.trim().parse::<f64>().ok())
        };

        let pg_sz = sect_pr.child("pgSz");
        let pg_mar = sect_pr.child("pgMar");

        let orientation = pg_sz
            .and_then(|sz| sz.attr("w:orient"))
            .map(|orient| match orient {
                "landscape" => Orientation::Landscape,
                _ => Orientation::Portrait,
            });

        Self {
            orientation,
            page_width: twips(pg_sz, "w:w"),
            page_height: twips(pg_sz, "w:h"),
            margin_top: twips(pg_mar, "w:top"),
            margin_right: twips(pg_mar, "w:right"),
            margin_bottom: twips(pg_mar, "w:bottom"),
            margin_left: twips(pg_mar, "w:left"),
            header_distance: twips(pg_mar, "w:header"),
            footer_distance: twips(pg_mar, "w:footer"),
        }
    }
}

/// Style id -> display name map from `word/styles.xml`.
#[derive(Debug, Clone, Default)]
pub struct StyleCatalog {
    names: HashMap<String, String>,
    default_paragraph_style: Option<String>,
}

impl StyleCatalog {
    pub fn from_markup(styles: &MarkupTree) -> Self {
        let mut catalog = Self::default();

        for style in styles.descendants("style") {
            let Some(id) = style.attr("w:styleId") else {
                continue;
            };
            let name = style
                .child("name")
                .and_then(|name| name.attr("w:val"))
                .map(ui_style_name)
                .unwrap_or_else(|| id.to_string());

            let is_default = style.attr("w:type") == Some("paragraph")
                && matches!(style.attr("w:default"), Some("1") | Some("true"));
            if is_default {
                catalog.default_paragraph_style = Some(name.clone());
            }

            catalog.names.insert(id.to_string(), name);
        }

        catalog
    }

    /// Display name for a style id; unknown ids are shown as-is
    pub fn display_name(&self, id: &str) -> String {
        self.names
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }
}

/// Built-in styles are stored lowercase ("heading 1", "toc 2"); Word shows
/// them capitalised.
fn ui_style_name(name: &str) -> String {
    let lower = name.to_lowercase();
    if let Some(level) = lower.strip_prefix("heading ") {
        return format!("Heading {level}");
    }
    if let Some(level) = lower.strip_prefix("toc ") {
        return format!("TOC {level}");
    }
    match lower.as_str() {
        "normal" | "title" | "subtitle" | "caption" | "header" | "footer" => {
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => lower,
            }
        }
        _ => name.to_string(),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentModel {
    pub paragraphs: Vec<Paragraph>,
    pub tables: Vec<Table>,
    pub section: Option<SectionGeometry>,
}

impl DocumentModel {
    pub fn from_markup(document: &MarkupTree, styles: &StyleCatalog) -> Self {
        let mut model = Self::default();

        if let Some(body) = document.first("body") {
            collect_blocks(body, styles, &mut model);
        }

        model.section = document
            .first("sectPr")
            .map(SectionGeometry::from_section_properties);

        model
    }

    /// Text of every body paragraph, in order
    pub fn paragraph_texts(&self) -> Vec<String> {
        self.paragraphs.iter().map(Paragraph::text).collect()
    }

    /// Body paragraph texts joined by single spaces
    pub fn full_text(&self) -> String {
        self.paragraph_texts().join(" ")
    }
}

/// Body-level blocks; block content controls (`w:sdt`, which is where Word
/// puts generated tables of contents) are unwrapped in place.
fn collect_blocks(container: &XmlElement, styles: &StyleCatalog, model: &mut DocumentModel) {
    for child in container.child_elements() {
        match child.local_name() {
            "p" => model.paragraphs.push(Paragraph::from_element(child, styles)),
            "tbl" => model.tables.push(Table::from_element(child, styles)),
            "sdt" => {
                if let Some(content) = child.child("sdtContent") {
                    collect_blocks(content, styles, model);
                }
            }
            _ => {}
        }
    }
}
