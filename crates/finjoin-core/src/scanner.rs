//! Directory scanner for pairing annual and quarterly statement files

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

const ANNUAL_SUFFIXES: &[&str] = &["annual", "year", "y"];
const QUARTERLY_SUFFIXES: &[&str] = &["quarterly", "quarter", "q"];
const EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// Which statement a file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    Annual,
    Quarterly,
}

/// An annual file and its quarterly counterpart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementPair {
    /// Shared stem, e.g. "SBER" for "SBER_annual.csv"
    pub name: String,
    pub annual: PathBuf,
    pub quarterly: PathBuf,
}

/// Result of scanning directories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Root directories that were scanned
    pub roots: Vec<PathBuf>,
    /// Complete pairs, sorted by name
    pub pairs: Vec<StatementPair>,
    /// Statement files without a counterpart
    pub unpaired: Vec<PathBuf>,
}

impl ScanResult {
    /// Find a pair by name
    pub fn find_pair(&self, name: &str) -> Option<&StatementPair> {
        self.pairs.iter().find(|p| p.name == name)
    }
}

#[derive(Default)]
struct Slots {
    annual: Option<PathBuf>,
    quarterly: Option<PathBuf>,
}

/// Scan one or more directories for statement files and pair them by name
///
/// Entries below a root that cannot be read (broken links, filesystem loops,
/// permission errors) are logged and skipped.
pub fn scan_directory<P: AsRef<Path>>(roots: &[P]) -> Result<ScanResult> {
    let mut slots: BTreeMap<String, Slots> = BTreeMap::new();
    let mut unpaired = Vec::new();

    for root in roots {
        for entry in WalkDir::new(root.as_ref()).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                // A root that cannot be walked at all is an error
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => {
                    warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || !has_statement_extension(path) {
                continue;
            }

            let Some((name, kind)) = path
                .file_stem()
                .and_then(|s| s.to_str())
                .and_then(classify_stem)
            else {
                continue;
            };

            let slot = slots.entry(name).or_default();
            let target = match kind {
                StatementKind::Annual => &mut slot.annual,
                StatementKind::Quarterly => &mut slot.quarterly,
            };
            if target.is_some() {
                warn!(path = %path.display(), "duplicate statement file, ignoring");
                unpaired.push(path.to_path_buf());
            } else {
                *target = Some(path.to_path_buf());
            }
        }
    }

    let mut pairs = Vec::new();
    for (name, slot) in slots {
        match (slot.annual, slot.quarterly) {
            (Some(annual), Some(quarterly)) => pairs.push(StatementPair {
                name,
                annual,
                quarterly,
            }),
            (Some(path), None) | (None, Some(path)) => unpaired.push(path),
            (None, None) => {}
        }
    }

    Ok(ScanResult {
        roots: roots.iter().map(|r| r.as_ref().to_path_buf()).collect(),
        pairs,
        unpaired,
    })
}

fn has_statement_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Split a file stem into its pair name and statement kind
///
/// Examples:
/// - "SBER_annual" -> ("SBER", Annual)
/// - "gazp-q" -> ("gazp", Quarterly)
/// - "lkoh_msfo_Year" -> ("lkoh_msfo", Annual)
/// - "notes" -> None
fn classify_stem(stem: &str) -> Option<(String, StatementKind)> {
    let split = stem.rfind(['_', '-'])?;
    let (name, suffix) = (&stem[..split], &stem[split + 1..]);
    if name.is_empty() {
        return None;
    }

    let suffix = suffix.to_ascii_lowercase();
    let kind = if ANNUAL_SUFFIXES.contains(&suffix.as_str()) {
        StatementKind::Annual
    } else if QUARTERLY_SUFFIXES.contains(&suffix.as_str()) {
        StatementKind::Quarterly
    } else {
        return None;
    };

    Some((name.to_string(), kind))
}
