// Rules 4-6: page geometry.
//
// Each value is resolved through a chain of sources: the section geometry
// of the document model, then the first matching element of the raw markup,
// then a default. When only the default is left, or a source is unreadable,
// the rule passes on the assumed value and says so (`assumed_default`).

use super::{CheckContext, QcRule};
use crate::markup::XmlElement;
use crate::model::{twips_to_inches, Orientation};
use crate::types::{QcResult, Resolution, ViolationLocation, ViolationType};
use anyhow::{anyhow, Result};

pub struct PageOrientationRule;
pub struct MarginsRule;
pub struct HeaderFooterDistanceRule;

const DEFAULT_MARGIN_INCHES: f64 = 1.0;
const DEFAULT_HEADER_FOOTER_TWIPS: f64 = 720.0;

fn twips_attr(element: &XmlElement, name: &str) -> Result<Option<f64>> {
    match element.attr(name) {
        Some(raw) => raw
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| anyhow!("invalid {name} value '{raw}'")),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageShape {
    pub orientation: Orientation,
    /// Width and height in inches, when known
    pub dimensions: Option<(f64, f64)>,
}

fn shape_from_dimensions(width: f64, height: f64) -> PageShape {
    let (width, height) = (twips_to_inches(width), twips_to_inches(height));
    PageShape {
        orientation: if width < height {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        },
        dimensions: Some((width, height)),
    }
}

pub fn resolve_orientation(ctx: &CheckContext) -> Result<Resolution<PageShape>> {
    let section = ctx.document.model.section.as_ref();

    if let Some(orientation) = section.and_then(|s| s.orientation) {
        return Ok(Resolution::Measured {
            value: PageShape {
                orientation,
                dimensions: None,
            },
            source: "section orientation",
        });
    }

    if let Some(pg_sz) = ctx.document.markup.select("//w:pgSz").into_iter().next() {
        if let (Some(width), Some(height)) = (twips_attr(pg_sz, "w:w")?, twips_attr(pg_sz, "w:h")?) {
            return Ok(Resolution::Measured {
                value: shape_from_dimensions(width, height),
                source: "page size markup",
            });
        }
    }

    if let Some((width, height)) = section.and_then(|s| Some((s.page_width?, s.page_height?))) {
        return Ok(Resolution::Measured {
            value: shape_from_dimensions(width, height),
            source: "section page size",
        });
    }

    Ok(Resolution::Assumed {
        value: PageShape {
            orientation: Orientation::Portrait,
            dimensions: None,
        },
        reason: "Could not determine exact orientation, assuming portrait".to_string(),
    })
}

impl QcRule for PageOrientationRule {
    fn number(&self) -> u8 {
        4
    }

    fn name(&self) -> &str {
        "Page Orientation Check"
    }

    fn check(&self, ctx: &CheckContext) -> Result<QcResult> {
        let resolution = resolve_orientation(ctx).unwrap_or_else(|e| Resolution::Assumed {
            value: PageShape {
                orientation: Orientation::Portrait,
                dimensions: None,
            },
            reason: format!("Error reading orientation: {e}, assuming portrait"),
        });

        let shape = match resolution {
            Resolution::Assumed { reason, .. } => {
                return Ok(QcResult::success(
                    self.number(),
                    self.name(),
                    "Page orientation appears to be Portrait (default)",
                )
                .with_details(reason)
                .assumed());
            }
            Resolution::Measured { value, .. } => value,
        };

        let result = match shape.orientation {
            Orientation::Portrait => {
                QcResult::success(self.number(), self.name(), "Page orientation is Portrait")
            }
            Orientation::Landscape => QcResult::violation(
                self.number(),
                self.name(),
                ViolationType::Error,
                "Page orientation is Landscape (should be Portrait)",
            )
            .with_locations(vec![ViolationLocation::new("section", Some(0))]),
        };

        Ok(match shape.dimensions {
            Some((width, height)) => {
                result.with_details(format!("Page dimensions: {width:.2}\" x {height:.2}\""))
            }
            None => result,
        })
    }
}

/// Margins in inches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Margins {
    pub fn uniform(inches: f64) -> Self {
        Self {
            left: inches,
            right: inches,
            top: inches,
            bottom: inches,
        }
    }

    fn sides(&self) -> [(&'static str, f64); 4] {
        [
            ("left", self.left),
            ("right", self.right),
            ("top", self.top),
            ("bottom", self.bottom),
        ]
    }
}

/// Margins plus the sides that fell back to the default
#[derive(Debug, Clone, PartialEq)]
pub struct MarginReading {
    pub margins: Margins,
    pub defaulted: Vec<&'static str>,
}

fn page_margin_markup<'a>(ctx: &'a CheckContext) -> Option<&'a XmlElement> {
    ctx.document.markup.select("//w:pgMar").into_iter().next()
}

/// Each side resolves on its own: section properties, then the raw
/// `w:pgMar` attribute, then the 1-inch default.
pub fn resolve_margins(ctx: &CheckContext) -> Result<Resolution<MarginReading>> {
    let section = ctx.document.model.section.as_ref();
    let pg_mar = page_margin_markup(ctx);

    let mut defaulted = Vec::new();
    let mut side = |name: &'static str, attr: &str, from_section: Option<f64>| -> Result<f64> {
        let twips = match from_section {
            Some(twips) => Some(twips),
            None => match pg_mar {
                Some(pg_mar) => twips_attr(pg_mar, attr)?,
                None => None,
            },
        };
        Ok(match twips {
            Some(twips) => twips_to_inches(twips),
            None => {
                defaulted.push(name);
                DEFAULT_MARGIN_INCHES
            }
        })
    };

    let margins = Margins {
        left: side("left", "w:left", section.and_then(|s| s.margin_left))?,
        right: side("right", "w:right", section.and_then(|s| s.margin_right))?,
        top: side("top", "w:top", section.and_then(|s| s.margin_top))?,
        bottom: side("bottom", "w:bottom", section.and_then(|s| s.margin_bottom))?,
    };

    if defaulted.len() == 4 {
        return Ok(Resolution::Assumed {
            value: MarginReading { margins, defaulted },
            reason: "No margin settings found, assuming standard 1-inch margins".to_string(),
        });
    }

    Ok(Resolution::Measured {
        value: MarginReading { margins, defaulted },
        source: "section properties",
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarginClass {
    Ok,
    Warning,
    Error,
}

pub fn classify_margin(margin: f64, required: f64, minimum: f64, tolerance: f64) -> MarginClass {
    if margin < minimum {
        MarginClass::Error
    } else if (margin - required).abs() > tolerance {
        MarginClass::Warning
    } else {
        MarginClass::Ok
    }
}

fn capitalize(side: &str) -> String {
    let mut chars = side.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl QcRule for MarginsRule {
    fn number(&self) -> u8 {
        5
    }

    fn name(&self) -> &str {
        "Page Margins Check"
    }

    fn check(&self, ctx: &CheckContext) -> Result<QcResult> {
        let layout = &ctx.config.layout;

        let resolution = resolve_margins(ctx).unwrap_or_else(|e| Resolution::Assumed {
            value: MarginReading {
                margins: Margins::uniform(DEFAULT_MARGIN_INCHES),
                defaulted: vec!["left", "right", "top", "bottom"],
            },
            reason: format!("Error reading margins: {e}, assuming standard 1-inch margins"),
        });
        if let Resolution::Assumed { reason, .. } = &resolution {
            return Ok(QcResult::success(
                self.number(),
                self.name(),
                "Page margins appear to be standard (1 inch)",
            )
            .with_details(reason.clone())
            .assumed());
        }
        let MarginReading { margins, defaulted } = resolution.value();
        let assumed_note = (!defaulted.is_empty()).then(|| {
            format!(
                "Not set, assuming {DEFAULT_MARGIN_INCHES} inch: {}",
                defaulted.join(", ")
            )
        });

        let mut errors = Vec::new();
        let mut warnings = Vec::new();
        for (side, margin) in margins.sides() {
            match classify_margin(
                margin,
                layout.required_margin,
                layout.min_margin,
                layout.margin_tolerance,
            ) {
                MarginClass::Error => errors.push((
                    side,
                    format!(
                        "{} margin: {margin:.2}\" (below minimum {}\")",
                        capitalize(side),
                        layout.min_margin
                    ),
                )),
                MarginClass::Warning => warnings.push((
                    side,
                    format!(
                        "{} margin: {margin:.2}\" (should be {}\")",
                        capitalize(side),
                        layout.required_margin
                    ),
                )),
                MarginClass::Ok => {}
            }
        }

        let report = |kind: ViolationType, message: String, found: &[(&str, String)]| {
            let details = found
                .iter()
                .map(|(_, line)| line.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            let locations = found
                .iter()
                .map(|(side, line)| ViolationLocation::new("section", Some(0)).with_preview(&format!("{side}: {line}")))
                .collect();
            QcResult::violation(self.number(), self.name(), kind, message)
                .with_details(details)
                .with_locations(locations)
        };

        let with_note = |result: QcResult| match &assumed_note {
            Some(note) => {
                let details = match &result.details {
                    Some(details) => format!("{details}\n{note}"),
                    None => note.clone(),
                };
                result.with_details(details).assumed()
            }
            None => result,
        };

        if !errors.is_empty() {
            let sides: Vec<&str> = errors.iter().map(|(side, _)| *side).collect();
            Ok(with_note(report(
                ViolationType::Error,
                format!("Found {} margin errors ({})", errors.len(), sides.join(", ")),
                &errors,
            )))
        } else if !warnings.is_empty() {
            let sides: Vec<&str> = warnings.iter().map(|(side, _)| *side).collect();
            Ok(with_note(report(
                ViolationType::Warning,
                format!(
                    "Margins acceptable but {} warnings ({})",
                    warnings.len(),
                    sides.join(", ")
                ),
                &warnings,
            )))
        } else {
            Ok(with_note(
                QcResult::success(
                    self.number(),
                    self.name(),
                    format!("All margins are exactly {} inch", layout.required_margin),
                )
                .with_details(format!(
                    "Left: {:.2}\", Right: {:.2}\", Top: {:.2}\", Bottom: {:.2}\"",
                    margins.left, margins.right, margins.top, margins.bottom
                )),
            ))
        }
    }
}

/// Header and footer distance in inches
pub fn resolve_header_footer(ctx: &CheckContext) -> Result<Resolution<(f64, f64)>> {
    let section = ctx.document.model.section.as_ref();
    let pg_mar = page_margin_markup(ctx);

    if section.is_none() && pg_mar.is_none() {
        return Ok(Resolution::Assumed {
            value: (0.5, 0.5),
            reason: "No page margin settings found, assuming standard 0.5-inch distances"
                .to_string(),
        });
    }

    let distance = |from_section: Option<f64>, attr: &str| -> Result<f64> {
        let twips = match from_section {
            Some(twips) => twips,
            None => match pg_mar {
                Some(pg_mar) => twips_attr(pg_mar, attr)?.unwrap_or(DEFAULT_HEADER_FOOTER_TWIPS),
                None => DEFAULT_HEADER_FOOTER_TWIPS,
            },
        };
        Ok(twips_to_inches(twips))
    };

    let header = distance(section.and_then(|s| s.header_distance), "w:header")?;
    let footer = distance(section.and_then(|s| s.footer_distance), "w:footer")?;

    Ok(Resolution::Measured {
        value: (header, footer),
        source: "section properties",
    })
}

impl QcRule for HeaderFooterDistanceRule {
    fn number(&self) -> u8 {
        6
    }

    fn name(&self) -> &str {
        "Header/Footer Distance Check"
    }

    fn check(&self, ctx: &CheckContext) -> Result<QcResult> {
        let minimum = ctx.config.layout.min_header_footer_distance;

        let resolution = resolve_header_footer(ctx).unwrap_or_else(|e| Resolution::Assumed {
            value: (0.5, 0.5),
            reason: format!("Error reading distances: {e}, assuming standard 0.5-inch distances"),
        });
        if let Resolution::Assumed { reason, .. } = &resolution {
            return Ok(QcResult::success(
                self.number(),
                self.name(),
                "Header and footer distances appear to be standard",
            )
            .with_details(reason.clone())
            .assumed());
        }
        let &(header, footer) = resolution.value();

        if header < minimum || footer < minimum {
            Ok(QcResult::violation(
                self.number(),
                self.name(),
                ViolationType::Error,
                "Header or footer distance is below minimum",
            )
            .with_details(format!(
                "Header distance: {header:.2}\", Footer distance: {footer:.2}\" (minimum: {minimum}\")"
            ))
            .with_locations(vec![ViolationLocation::new("section", Some(0))]))
        } else {
            Ok(QcResult::success(
                self.number(),
                self.name(),
                "Header and footer distances are acceptable",
            )
            .with_details(format!("Header: {header:.2}\", Footer: {footer:.2}\"")))
        }
    }
}
