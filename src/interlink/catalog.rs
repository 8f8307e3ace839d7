use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::interlink::elements::OrbitalElements;
use crate::interlink::error::CatalogError;

/// Catalog listing for a satellite loaded from disk
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SatelliteInfo {
    pub name: String,
    pub norad_id: u64,
    pub tle_source: String,
    pub epoch: DateTime<Utc>,
}

pub struct CatalogEntry {
    pub info: SatelliteInfo,
    pub elements: OrbitalElements,
}

/// Element sets read from every `.tle`/`.txt` file in a folder, keyed by
/// NORAD id. When two files carry the same id, the one read last wins.
pub struct TleCatalog {
    tle_dir: PathBuf,
    satellites: BTreeMap<u64, CatalogEntry>,
}

impl TleCatalog {
    pub fn new(tle_dir: PathBuf) -> Self {
        Self {
            tle_dir,
            satellites: BTreeMap::new(),
        }
    }

    /// Load all TLE files from the directory
    pub fn load_all(&mut self) -> Result<usize, CatalogError> {
        if !self.tle_dir.is_dir() {
            return Err(CatalogError::DirectoryNotFound(
                self.tle_dir.display().to_string(),
            ));
        }

        self.satellites.clear();

        let mut paths: Vec<PathBuf> = fs::read_dir(&self.tle_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_tle_file(path))
            .collect();
        paths.sort();

        for path in paths {
            match parse_tle_file(&path) {
                Ok(entries) => {
                    for entry in entries {
                        self.satellites.insert(entry.info.norad_id, entry);
                    }
                }
                Err(e) => {
                    log::warn!("Failed to parse TLE file {}: {}", path.display(), e);
                }
            }
        }

        log::info!(
            "Loaded {} satellites from {}",
            self.satellites.len(),
            self.tle_dir.display()
        );
        Ok(self.satellites.len())
    }

    pub fn get(&self, norad_id: u64) -> Option<&CatalogEntry> {
        self.satellites.get(&norad_id)
    }

    /// Satellites in NORAD id order
    pub fn satellites(&self) -> Vec<&CatalogEntry> {
        self.satellites.values().collect()
    }

    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }
}

fn is_tle_file(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("tle") | Some("txt")
    )
}

/// Parse a single TLE file (may contain multiple satellites)
fn parse_tle_file(path: &Path) -> Result<Vec<CatalogEntry>, CatalogError> {
    let content = fs::read_to_string(path)?;
    let filename = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    split_tle_sets(&content)
        .into_iter()
        .map(|(name, line1, line2)| -> Result<CatalogEntry, CatalogError> {
            let elements = OrbitalElements::from_tle(name, line1, line2).map_err(|source| {
                CatalogError::InvalidTle {
                    file: filename.clone(),
                    source,
                }
            })?;

            Ok(CatalogEntry {
                info: SatelliteInfo {
                    name: elements.name().to_string(),
                    norad_id: elements.norad_id(),
                    tle_source: filename.clone(),
                    epoch: elements.epoch(),
                },
                elements,
            })
        })
        .collect()
}

/// Split catalog text into (name, line1, line2) sets. Named and unnamed
/// sets may be mixed; lines that fit neither shape are skipped.
fn split_tle_sets(content: &str) -> Vec<(Option<String>, &str, &str)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            result.push((None, lines[i], lines[i + 1]));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            let name = lines[i].strip_prefix("0 ").unwrap_or(lines[i]);
            result.push((Some(name.to_string()), lines[i + 1], lines[i + 2]));
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}
