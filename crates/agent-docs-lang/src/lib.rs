#![warn(missing_docs)]
//! `agent-docs-lang` - data-driven language classification for `agent-docs`.
//!
//! The mapping from file names to language ids is configuration, not code: it ships as an
//! embedded JSON asset that is parsed once on first use. Hosts that carry their own table can
//! build a [`LanguageTable`] from JSON and query it the same way.
//!
//! Classification is total. Unknown extensions fall back to the raw extension string, and a file
//! name without an extension classifies as the empty string.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::LazyLock;

const BUILTIN_TABLE: &str = include_str!("../assets/languages.json");

static BUILTIN: LazyLock<LanguageTable> =
    LazyLock::new(|| LanguageTable::from_json(BUILTIN_TABLE).unwrap_or_default());

/// Extension and file-name lookup table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageTable {
    /// Lower-cased extension (without the dot) to language id.
    #[serde(default)]
    pub extensions: HashMap<String, String>,
    /// Exact file names (e.g. `Makefile`) to language id. Checked before extensions.
    #[serde(default)]
    pub file_names: HashMap<String, String>,
}

impl LanguageTable {
    /// Parse a table from its JSON form.
    ///
    /// Extension keys are normalized to lower case without a leading dot.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut table: Self = serde_json::from_str(json)?;
        table.extensions = table
            .extensions
            .into_iter()
            .map(|(ext, lang)| (ext.trim_start_matches('.').to_ascii_lowercase(), lang))
            .collect();
        Ok(table)
    }

    /// The table embedded in this crate.
    pub fn builtin() -> &'static LanguageTable {
        &BUILTIN
    }

    /// Classify a file name (or a path; only the last segment is used).
    pub fn classify(&self, file_name: &str) -> String {
        let base = base_name(file_name);
        if let Some(lang) = self.file_names.get(base) {
            return lang.clone();
        }

        let ext = extension(base);
        self.extensions
            .get(&ext.to_ascii_lowercase())
            .cloned()
            .unwrap_or_else(|| ext.to_string())
    }
}

/// Classify a file name using the built-in table.
pub fn language_for_file_name(file_name: &str) -> String {
    LanguageTable::builtin().classify(file_name)
}

fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Extension of `base` without the dot. Dotfiles like `.bashrc` have no extension.
fn extension(base: &str) -> &str {
    match base.rfind('.') {
        Some(0) | None => "",
        Some(idx) => &base[idx + 1..],
    }
}
