use serde::{Deserialize, Serialize};

/// Fields recovered from an anime or scene release file name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileNameInfo {
    /// Original input string.
    pub input: String,

    /// Series title with separators normalized to spaces.
    pub title: Option<String>,

    /// Release group name (e.g., "Nekomoe kissaten", "SubsPlease").
    pub group: Option<String>,

    /// Season number.
    pub season: Option<u32>,

    /// Single episode number. Batch ranges leave this empty.
    pub episode: Option<u32>,

    /// Release year.
    pub year: Option<u16>,

    /// File extension (without leading dot).
    pub extension: Option<String>,
}

impl FileNameInfo {
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Self::default()
        }
    }
}
