use anyhow::{bail, Context, Result};
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;

// Default value functions for serde
fn default_required_font() -> String {
    "Times New Roman".to_string()
}

fn default_font_variants() -> Vec<String> {
    ["times new roman", "times", "timesnewroman", "times new roman,serif"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_normal_size() -> f64 {
    12.0
}

fn default_table_size() -> f64 {
    9.0
}

fn default_required_margin() -> f64 {
    1.0
}

fn default_min_margin() -> f64 {
    0.75
}

fn default_margin_tolerance() -> f64 {
    0.01
}

fn default_min_header_footer() -> f64 {
    0.38
}

fn default_link_timeout() -> u64 {
    10
}

fn default_max_redirects() -> u32 {
    5
}

fn default_user_agent() -> String {
    "DOCX-QC-Checker/1.0".to_string()
}

fn default_max_concurrent_probes() -> usize {
    8
}

fn default_toc_patterns() -> Vec<String> {
    strings(&["table of contents", "contents", "toc", "index", "outline"])
}

fn default_section_reference_patterns() -> Vec<String> {
    strings(&[
        r"section\s+(\d+)",
        r"see\s+section\s+(\d+)",
        r"refer\s+to\s+section\s+(\d+)",
        r"as\s+discussed\s+in\s+section\s+(\d+)",
    ])
}

fn default_definition_patterns() -> Vec<String> {
    strings(&[
        r"([A-Z]{2,})\s*\(([^)]+)\)",
        r"([^)]+)\s*\(([A-Z]{2,})\)",
        r"([A-Z]{2,})\s*[-–]\s*([^.]*)",
        r"([A-Z]{2,})\s*stands for\s*([^.]*)",
        r"([A-Z]{2,})\s*means\s*([^.]*)",
        r"([A-Z]{2,})\s*refers to\s*([^.]*)",
        r"([A-Z]{2,})\s*is\s*([^.]*)",
        r"([A-Z]{2,})\s*denotes\s*([^.]*)",
        r"([A-Z]{2,})\s*represents\s*([^.]*)",
        r"([A-Z]{2,})\s*abbreviation for\s*([^.]*)",
        r"([A-Z]{2,})\s*short for\s*([^.]*)",
        r"([A-Z]{2,})\s*abbreviated as\s*([^.]*)",
    ])
}

fn default_acronym_stoplist() -> Vec<String> {
    strings(&[
        // Common English words
        "THE", "AND", "FOR", "ARE", "BUT", "NOT", "YOU", "ALL", "CAN", "HAD", "HER", "WAS", "ONE",
        "OUR", "OUT", "DAY", "GET", "HAS", "HIM", "HIS", "HOW", "MAN", "NEW", "NOW", "OLD", "SEE",
        "TWO", "WAY", "WHO", "BOY", "DID", "ITS", "LET", "PUT", "SAY", "SHE", "TOO", "USE", "DAD",
        "MOM", "YES", "NO", "OK", "IT", "OF", "IN", "ON", "AT", "TO", "IS", "AS", "BE", "OR", "IF",
        "DO", "GO", "SO", "UP", "BY", "MY", "ME", "WE", "HE", "US", "AM", "AN",
        // Abbreviations
        "ETC", "EG", "IE", "VS", "REF", "FIG", "TAB", "SEC", "CH", "PAGE", "PAGES", "VOL", "NUM",
        // Document structure
        "LIST", "DEFINITIONS", "ABBREVIATIONS", "CONTENTS", "TOC", "INDEX", "OUTLINE",
        // Placeholders and domain terms
        "XXX", "IB", "DS", "DRF", "FIH", "MTD", "GLP",
        // Agencies and standards bodies
        "FDA", "NMPA", "EPA", "CDC", "NIH", "NSF", "OSHA", "EMA", "PMDA", "ISO", "ASTM", "ANSI",
        "IEEE", "IEC", "ITU", "W3C", "OASIS",
        "HNSTD", "PK", "TK",
    ])
}

fn default_present_indicators() -> Vec<String> {
    strings(&["is", "are", "has", "have", "does", "do", "goes", "go", "runs", "run", "works", "work"])
}

fn default_past_indicators() -> Vec<String> {
    // "went" is listed twice and counts twice
    strings(&["was", "were", "had", "did", "went", "came", "made", "ran", "worked", "went"])
}

fn default_future_indicators() -> Vec<String> {
    strings(&["will", "shall", "going to", "gonna", "about to"])
}

fn default_tense_threshold() -> usize {
    3
}

fn default_max_reported_locations() -> usize {
    10
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigProfile {
    #[default]
    Development,
    Production,
    Testing,
}

impl ConfigProfile {
    /// Accepts the long names and the `dev`/`prod`/`test` shorthands
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "dev" | "development" | "default" => Some(ConfigProfile::Development),
            "prod" | "production" => Some(ConfigProfile::Production),
            "test" | "testing" => Some(ConfigProfile::Testing),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QcConfig {
    #[serde(default)]
    pub profile: ConfigProfile,
    #[serde(default)]
    pub fonts: FontConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub links: LinkConfig,
    #[serde(default)]
    pub toc: TocConfig,
    #[serde(default)]
    pub internal_links: InternalLinkConfig,
    #[serde(default)]
    pub acronyms: AcronymConfig,
    #[serde(default)]
    pub tense: TenseConfig,
    /// Cap on violation locations (and detail lines) kept per result
    #[serde(default = "default_max_reported_locations")]
    pub max_reported_locations: usize,
    /// Evaluate rules on a thread pool; report order is unchanged
    #[serde(default)]
    pub parallel_rules: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    #[serde(default = "default_required_font")]
    pub required_font: String,
    /// Lowercase spellings accepted as the required font
    #[serde(default = "default_font_variants")]
    pub accepted_variants: Vec<String>,
    #[serde(default = "default_normal_size")]
    pub normal_size_pt: f64,
    #[serde(default = "default_table_size")]
    pub table_size_pt: f64,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            required_font: default_required_font(),
            accepted_variants: default_font_variants(),
            normal_size_pt: default_normal_size(),
            table_size_pt: default_table_size(),
        }
    }
}

/// Page layout limits, in inches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_required_margin")]
    pub required_margin: f64,
    #[serde(default = "default_min_margin")]
    pub min_margin: f64,
    #[serde(default = "default_margin_tolerance")]
    pub margin_tolerance: f64,
    #[serde(default = "default_min_header_footer")]
    pub min_header_footer_distance: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            required_margin: default_required_margin(),
            min_margin: default_min_margin(),
            margin_tolerance: default_margin_tolerance(),
            min_header_footer_distance: default_min_header_footer(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    #[serde(default = "default_link_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: u32,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_concurrent_probes")]
    pub max_concurrent_probes: usize,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_link_timeout(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
            max_concurrent_probes: default_max_concurrent_probes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TocConfig {
    /// Case-insensitive patterns searched in trimmed paragraph text
    #[serde(default = "default_toc_patterns")]
    pub patterns: Vec<String>,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            patterns: default_toc_patterns(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalLinkConfig {
    /// Textual section references; capture group 1 is the section number
    #[serde(default = "default_section_reference_patterns")]
    pub section_reference_patterns: Vec<String>,
}

impl Default for InternalLinkConfig {
    fn default() -> Self {
        Self {
            section_reference_patterns: default_section_reference_patterns(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcronymConfig {
    /// Case-insensitive definition patterns; a match defines an acronym
    /// when one of its capture groups contains it
    #[serde(default = "default_definition_patterns")]
    pub definition_patterns: Vec<String>,
    /// Uppercase tokens never treated as acronyms
    #[serde(default = "default_acronym_stoplist")]
    pub stoplist: Vec<String>,
}

impl Default for AcronymConfig {
    fn default() -> Self {
        Self {
            definition_patterns: default_definition_patterns(),
            stoplist: default_acronym_stoplist(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenseConfig {
    #[serde(default = "default_present_indicators")]
    pub present_indicators: Vec<String>,
    #[serde(default = "default_past_indicators")]
    pub past_indicators: Vec<String>,
    #[serde(default = "default_future_indicators")]
    pub future_indicators: Vec<String>,
    /// Mixed tenses are only reported once the dominant count exceeds this
    #[serde(default = "default_tense_threshold")]
    pub threshold: usize,
}

impl Default for TenseConfig {
    fn default() -> Self {
        Self {
            present_indicators: default_present_indicators(),
            past_indicators: default_past_indicators(),
            future_indicators: default_future_indicators(),
            threshold: default_tense_threshold(),
        }
    }
}

impl Default for QcConfig {
    fn default() -> Self {
        Self {
            profile: ConfigProfile::Development,
            fonts: FontConfig::default(),
            layout: LayoutConfig::default(),
            links: LinkConfig::default(),
            toc: TocConfig::default(),
            internal_links: InternalLinkConfig::default(),
            acronyms: AcronymConfig::default(),
            tense: TenseConfig::default(),
            max_reported_locations: default_max_reported_locations(),
            parallel_rules: false,
        }
    }
}

/// Regex lists from the configuration, compiled once per session.
#[derive(Debug, Clone)]
pub struct CompiledPatterns {
    pub toc: Vec<Regex>,
    pub section_references: Vec<Regex>,
    pub acronym_definitions: Vec<Regex>,
}

fn compile_all(kind: &str, patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .with_context(|| format!("Invalid {kind} pattern: {pattern}"))
        })
        .collect()
}

impl QcConfig {
    /// Load config from file path
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        let config: QcConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {path}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Load config with fallback to the built-in profile
    pub fn load_with_fallback(path: Option<&str>, profile: ConfigProfile) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                log::warn!("Failed to load config from {p}: {e:#}, using {profile:?} defaults");
                Self::for_profile(profile)
            }),
            None => Self::for_profile(profile),
        }
    }

    pub fn for_profile(profile: ConfigProfile) -> Self {
        let mut config = Self {
            profile,
            ..Self::default()
        };
        if profile == ConfigProfile::Testing {
            config.links.timeout_secs = 5;
        }
        config
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Checks limits and compiles every pattern list
    pub fn validate(&self) -> Result<CompiledPatterns> {
        if self.layout.min_margin > self.layout.required_margin {
            bail!(
                "min_margin ({}) exceeds required_margin ({})",
                self.layout.min_margin,
                self.layout.required_margin
            );
        }
        if self.layout.margin_tolerance < 0.0 {
            bail!("margin_tolerance must not be negative");
        }
        if self.links.max_concurrent_probes == 0 {
            bail!("links.max_concurrent_probes must be at least 1");
        }
        if self.fonts.accepted_variants.is_empty() {
            bail!("fonts.accepted_variants must not be empty");
        }

        let patterns = CompiledPatterns {
            toc: compile_all("TOC", &self.toc.patterns)?,
            section_references: compile_all(
                "section reference",
                &self.internal_links.section_reference_patterns,
            )?,
            acronym_definitions: compile_all("acronym definition", &self.acronyms.definition_patterns)?,
        };

        if let Some(pattern) = patterns
            .section_references
            .iter()
            .find(|regex| regex.captures_len() < 2)
        {
            bail!("Section reference pattern needs a capture group: {}", pattern.as_str());
        }

        Ok(patterns)
    }
}

#[derive(Debug, Clone)]
pub struct ConfigManager {
    configs: HashMap<ConfigProfile, QcConfig>,
    default_config: QcConfig,
}

impl ConfigManager {
    pub fn new() -> Self {
        let mut configs = HashMap::new();
        for profile in [
            ConfigProfile::Development,
            ConfigProfile::Production,
            ConfigProfile::Testing,
        ] {
            configs.insert(profile, QcConfig::for_profile(profile));
        }

        Self {
            configs,
            default_config: QcConfig::default(),
        }
    }

    pub fn get_config(&self, profile: ConfigProfile) -> &QcConfig {
        self.configs.get(&profile).unwrap_or(&self.default_config)
    }

    /// Replaces the built-in config for the profile named in the file
    pub fn load_config_from_file(&mut self, path: &str) -> Result<ConfigProfile> {
        let config = QcConfig::load_from_file(path)?;
        let profile = config.profile;
        self.configs.insert(profile, config);
        Ok(profile)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_validate() {
        let config = QcConfig::default();
        let patterns = config.validate().unwrap();
        assert_eq!(patterns.toc.len(), 5);
        assert_eq!(patterns.section_references.len(), 4);
        assert_eq!(patterns.acronym_definitions.len(), 12);
        assert_eq!(config.fonts.normal_size_pt, 12.0);
        assert_eq!(config.tense.past_indicators.len(), 10);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "profile: production\nfonts:\n  normal_size_pt: 11\nlinks:\n  timeout_secs: 3\n";
        let config: QcConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.profile, ConfigProfile::Production);
        assert_eq!(config.fonts.normal_size_pt, 11.0);
        assert_eq!(config.fonts.table_size_pt, 9.0);
        assert_eq!(config.links.timeout_secs, 3);
        assert_eq!(config.links.max_redirects, 5);
        assert_eq!(config.max_reported_locations, 10);
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let mut config = QcConfig::default();
        config.toc.patterns.push("([unclosed".to_string());
        let err = config.validate().unwrap_err();
        assert!(format!("{err:#}").contains("Invalid TOC pattern"));
    }

    #[test]
    fn test_section_pattern_requires_group() {
        let mut config = QcConfig::default();
        config.internal_links.section_reference_patterns = vec![r"chapter\s+\d+".to_string()];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_profiles() {
        let manager = ConfigManager::new();
        assert_eq!(manager.get_config(ConfigProfile::Testing).links.timeout_secs, 5);
        assert_eq!(manager.get_config(ConfigProfile::Production).links.timeout_secs, 10);
        assert_eq!(ConfigProfile::parse("prod"), Some(ConfigProfile::Production));
        assert_eq!(ConfigProfile::parse("staging"), None);
    }

    #[test]
    fn test_load_from_file_and_fallback() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "profile: testing\ntense:\n  threshold: 7").unwrap();
        let path = file.path().to_str().unwrap();

        let mut manager = ConfigManager::new();
        let profile = manager.load_config_from_file(path).unwrap();
        assert_eq!(profile, ConfigProfile::Testing);
        assert_eq!(manager.get_config(ConfigProfile::Testing).tense.threshold, 7);

        let fallback = QcConfig::load_with_fallback(Some("/nonexistent/config.yaml"), ConfigProfile::Testing);
        assert_eq!(fallback.links.timeout_secs, 5);
    }

    #[test]
    fn test_yaml_round_trip_of_defaults() {
        let yaml = QcConfig::default().to_yaml().unwrap();
        let parsed: QcConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed, QcConfig::default());
    }
}
