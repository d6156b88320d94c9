//! Acronym reference table.
//!
//! The built-in table is parsed once from `data/acronyms.yaml` and shared
//! read-only (`Arc<AcronymTable>`) by every check session. Administrative
//! edits go through [`AcronymTableEditor`], an owned copy that never touches
//! the shared instance.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

const BUILTIN_ACRONYMS: &str = include_str!("../data/acronyms.yaml");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcronymRecord {
    pub acronym: String,
    pub full_name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcronymTable {
    records: BTreeMap<String, AcronymRecord>,
}

impl AcronymTable {
    /// The table shipped with the crate
    pub fn builtin() -> Result<Arc<Self>> {
        let table = Self::from_yaml(BUILTIN_ACRONYMS).context("Failed to parse built-in acronym table")?;
        log::debug!("Loaded {} built-in acronyms", table.len());
        Ok(Arc::new(table))
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let records: Vec<AcronymRecord> = serde_yaml::from_str(yaml)?;
        Ok(Self::from_records(records))
    }

    /// Later records replace earlier ones with the same key
    pub fn from_records(records: impl IntoIterator<Item = AcronymRecord>) -> Self {
        let mut table = Self::default();
        for mut record in records {
            record.acronym = record.acronym.to_uppercase();
            table.records.insert(record.acronym.clone(), record);
        }
        table
    }

    pub fn get(&self, acronym: &str) -> Option<&AcronymRecord> {
        self.records.get(&acronym.to_uppercase())
    }

    pub fn contains(&self, acronym: &str) -> bool {
        self.get(acronym).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &AcronymRecord> {
        self.records.values()
    }

    pub fn categories(&self) -> BTreeSet<&str> {
        self.records.values().map(|r| r.category.as_str()).collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&AcronymRecord> {
        self.records
            .values()
            .filter(|r| r.category == category)
            .collect()
    }

    /// Case-insensitive search over acronym, expansion and description
    pub fn search(&self, query: &str) -> Vec<&AcronymRecord> {
        let query = query.to_lowercase();
        self.records
            .values()
            .filter(|r| {
                r.acronym.to_lowercase().contains(&query)
                    || r.full_name.to_lowercase().contains(&query)
                    || r.description
                        .as_deref()
                        .map(|d| d.to_lowercase().contains(&query))
                        .unwrap_or(false)
            })
            .collect()
    }

    /// Owned, editable copy of this table
    pub fn to_mutable(&self) -> AcronymTableEditor {
        AcronymTableEditor {
            table: self.clone(),
        }
    }
}

/// JSON layout used for export/import
#[derive(Debug, Serialize, Deserialize)]
struct AcronymExport {
    acronyms: BTreeMap<String, ExportedRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ExportedRecord {
    full_name: String,
    category: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AcronymTableEditor {
    table: AcronymTable,
}

impl AcronymTableEditor {
    pub fn add(&mut self, acronym: &str, full_name: &str, category: &str, description: Option<&str>) {
        let acronym = acronym.to_uppercase();
        self.table.records.insert(
            acronym.clone(),
            AcronymRecord {
                acronym,
                full_name: full_name.to_string(),
                category: category.to_string(),
                description: description.map(str::to_string),
            },
        );
    }

    pub fn remove(&mut self, acronym: &str) -> bool {
        self.table.records.remove(&acronym.to_uppercase()).is_some()
    }

    pub fn table(&self) -> &AcronymTable {
        &self.table
    }

    pub fn export_json(&self) -> Result<String> {
        let export = AcronymExport {
            acronyms: self
                .table
                .records
                .iter()
                .map(|(key, r)| {
                    (
                        key.clone(),
                        ExportedRecord {
                            full_name: r.full_name.clone(),
                            category: r.category.clone(),
                            description: r.description.clone(),
                        },
                    )
                })
                .collect(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Replaces the current contents
    pub fn import_json(&mut self, json: &str) -> Result<()> {
        let export: AcronymExport = serde_json::from_str(json).context("Invalid acronym export")?;
        self.table = AcronymTable::from_records(export.acronyms.into_iter().map(|(acronym, r)| {
            AcronymRecord {
                acronym,
                full_name: r.full_name,
                category: r.category,
                description: r.description,
            }
        }));
        Ok(())
    }

    pub fn into_shared(self) -> Arc<AcronymTable> {
        Arc::new(self.table)
    }
}
