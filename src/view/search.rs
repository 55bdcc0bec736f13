use crate::data::datatable::DataRow;
use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Case-insensitive substring match
    #[default]
    Substring,
    /// Skim-style fuzzy match, case-insensitive
    Fuzzy,
}

/// Matches rows against one search term over a fixed set of field positions
pub struct RowMatcher {
    needle: String,
    mode: SearchMode,
    fields: Vec<usize>,
    fuzzy: SkimMatcherV2,
}

impl RowMatcher {
    pub fn new(term: &str, mode: SearchMode, fields: Vec<usize>) -> Self {
        Self {
            needle: term.to_lowercase(),
            mode,
            fields,
            fuzzy: SkimMatcherV2::default().ignore_case(),
        }
    }

    /// An empty term matches everything
    pub fn matches(&self, row: &DataRow) -> bool {
        if self.needle.is_empty() {
            return true;
        }

        self.fields
            .iter()
            .filter_map(|&idx| row.get(idx))
            .filter(|value| !value.is_null())
            .any(|value| {
                let text = value.to_string();
                match self.mode {
                    SearchMode::Substring => text.to_lowercase().contains(&self.needle),
                    SearchMode::Fuzzy => self.fuzzy.fuzzy_match(&text, &self.needle).is_some(),
                }
            })
    }
}
