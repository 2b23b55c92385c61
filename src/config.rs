use serde_derive::Deserialize;

/// Language selectors used when reading localized fields.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Key of the localized-string field read for folders and files.
    pub language: String,
    /// Numeric language id of the tips block to copy.
    pub tips_language_id: i64,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        ExtractConfig {
            language: "chinese".to_owned(),
            tips_language_id: 40,
        }
    }
}
