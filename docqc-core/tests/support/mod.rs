//! In-memory `.docx` fixtures for integration tests.
//!
//! Documents are assembled from WordprocessingML snippets and zipped with
//! `zip::ZipWriter`, so no binary fixtures live in the repository.

#![allow(dead_code)]

use docqc_core::acronyms::AcronymTable;
use docqc_core::links::{LinkProber, LinkStatus};
use docqc_core::{DocumentChecker, QcConfig, QcReport, QcResult};
use std::collections::HashMap;
use std::io::{Cursor, Write};
use zip::write::FileOptions;
use zip::ZipWriter;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
  <w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/></w:style>
  <w:style w:type="paragraph" w:styleId="TOC1"><w:name w:val="toc 1"/></w:style>
</w:styles>"#;

/// Escape text for use inside `<w:t>`
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// A run with optional direct font and size
pub fn run(text: &str, font: Option<&str>, size_pt: Option<f64>) -> String {
    let mut props = String::new();
    if let Some(font) = font {
        props.push_str(&format!(r#"<w:rFonts w:ascii="{font}" w:hAnsi="{font}"/>"#));
    }
    if let Some(size) = size_pt {
        props.push_str(&format!(r#"<w:sz w:val="{}"/>"#, (size * 2.0).round() as i64));
    }
    let props = if props.is_empty() {
        String::new()
    } else {
        format!("<w:rPr>{props}</w:rPr>")
    };
    format!(r#"<w:r>{props}<w:t xml:space="preserve">{}</w:t></w:r>"#, escape(text))
}

/// A run holding only a manual page break
pub fn page_break() -> String {
    r#"<w:r><w:br w:type="page"/></w:r>"#.to_string()
}

pub fn paragraph(runs: &[String]) -> String {
    format!("<w:p>{}</w:p>", runs.concat())
}

pub fn styled_paragraph(style_id: &str, text: &str) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="{style_id}"/></w:pPr>{}</w:p>"#,
        run(text, None, None)
    )
}

pub fn text_paragraph(text: &str) -> String {
    paragraph(&[run(text, None, None)])
}

/// A table from rows of cell texts, each cell one paragraph with one run
pub fn table(rows: &[&[String]]) -> String {
    let rows: String = rows
        .iter()
        .map(|cells| {
            let cells: String = cells
                .iter()
                .map(|cell| format!("<w:tc>{}</w:tc>", paragraph(std::slice::from_ref(cell))))
                .collect();
            format!("<w:tr>{cells}</w:tr>")
        })
        .collect();
    format!("<w:tbl>{rows}</w:tbl>")
}

pub fn external_hyperlink(rel_id: &str, url: &str) -> String {
    format!(
        r#"<w:p><w:hyperlink r:id="{rel_id}">{}</w:hyperlink></w:p>"#,
        run(url, None, None)
    )
}

pub fn internal_hyperlink(anchor: &str, text: &str) -> String {
    format!(
        r#"<w:p><w:hyperlink w:anchor="{anchor}">{}</w:hyperlink></w:p>"#,
        run(text, None, None)
    )
}

pub fn bookmark(name: &str, text: &str) -> String {
    format!(
        r#"<w:p><w:bookmarkStart w:id="0" w:name="{name}"/>{}<w:bookmarkEnd w:id="0"/></w:p>"#,
        run(text, None, None)
    )
}

/// Margins and header/footer distances in inches
#[derive(Debug, Clone, Copy)]
pub struct PageSetup {
    pub width: f64,
    pub height: f64,
    pub landscape: bool,
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub header: f64,
    pub footer: f64,
}

impl Default for PageSetup {
    fn default() -> Self {
        Self {
            width: 8.5,
            height: 11.0,
            landscape: false,
            left: 1.0,
            right: 1.0,
            top: 1.0,
            bottom: 1.0,
            header: 0.5,
            footer: 0.5,
        }
    }
}

fn twips(inches: f64) -> i64 {
    (inches * 1440.0).round() as i64
}

impl PageSetup {
    fn to_xml(self) -> String {
        let orient = if self.landscape { r#" w:orient="landscape""# } else { "" };
        format!(
            r#"<w:sectPr><w:pgSz w:w="{}" w:h="{}"{orient}/><w:pgMar w:top="{}" w:right="{}" w:bottom="{}" w:left="{}" w:header="{}" w:footer="{}" w:gutter="0"/></w:sectPr>"#,
            twips(self.width),
            twips(self.height),
            twips(self.top),
            twips(self.right),
            twips(self.bottom),
            twips(self.left),
            twips(self.header),
            twips(self.footer),
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocxBuilder {
    blocks: Vec<String>,
    page: Option<PageSetup>,
    raw_section: Option<String>,
    styles: bool,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self {
            styles: true,
            ..Self::default()
        }
    }

    pub fn block(mut self, xml: impl Into<String>) -> Self {
        self.blocks.push(xml.into());
        self
    }

    pub fn text(self, text: &str) -> Self {
        self.block(text_paragraph(text))
    }

    pub fn page(mut self, page: PageSetup) -> Self {
        self.page = Some(page);
        self
    }

    /// Section properties written verbatim
    pub fn raw_section(mut self, xml: &str) -> Self {
        self.raw_section = Some(xml.to_string());
        self
    }

    pub fn without_styles(mut self) -> Self {
        self.styles = false;
        self
    }

    pub fn document_xml(&self) -> String {
        let section = match (&self.raw_section, self.page) {
            (Some(raw), _) => raw.clone(),
            (None, Some(page)) => page.to_xml(),
            (None, None) => String::new(),
        };
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}" xmlns:r="{R_NS}"><w:body>{}{section}</w:body></w:document>"#,
            self.blocks.concat()
        )
    }

    pub fn build(&self) -> Vec<u8> {
        let mut parts = vec![("word/document.xml", self.document_xml())];
        if self.styles {
            parts.push(("word/styles.xml", STYLES_XML.to_string()));
        }
        zip_parts(&parts)
    }
}

pub fn zip_parts(parts: &[(&str, String)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();
    for (name, content) in parts {
        writer.start_file(*name, options).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Prober answering from a fixed table; unknown URLs are reachable
#[derive(Debug, Clone, Default)]
pub struct FixedProber {
    responses: HashMap<String, LinkStatus>,
}

impl FixedProber {
    pub fn with(mut self, url: &str, status: LinkStatus) -> Self {
        self.responses.insert(url.to_string(), status);
        self
    }
}

impl LinkProber for FixedProber {
    fn probe(&self, url: &str) -> LinkStatus {
        self.responses
            .get(url)
            .cloned()
            .unwrap_or(LinkStatus::Reachable { status: 200 })
    }
}

pub fn checker_with(config: QcConfig, prober: FixedProber) -> DocumentChecker {
    DocumentChecker::with_prober(config, AcronymTable::builtin().unwrap(), Box::new(prober)).unwrap()
}

pub fn checker() -> DocumentChecker {
    checker_with(QcConfig::default(), FixedProber::default())
}

pub fn check(doc: &DocxBuilder) -> QcReport {
    checker().check_bytes(&doc.build(), "fixture.docx")
}

pub fn rule(report: &QcReport, number: u8) -> &QcResult {
    report
        .results()
        .iter()
        .find(|r| r.rule_number == number)
        .unwrap_or_else(|| panic!("no result for rule {number}"))
}
