//! # Season number heuristics
//!
//! Titles carry their season number in many shapes: `第二季`, `第 2 季`,
//! `Season 3`, a release-name `S02`, a bare trailing `食梦者 3`, or a Roman
//! `进击的巨人Ⅲ`. [`SeasonParser::guess_season_index`] walks the
//! [`GUESS_ORDER`] table and stops at the first strategy that yields a
//! non-zero number. Explicit markers come first; bare trailing numbers come
//! late because they are the most prone to false positives.
//!
//! ## Quick Start
//!
//! ```rust
//! use douban_meta_core::season::SeasonParser;
//!
//! let parser = SeasonParser::with_default_exclusions().unwrap();
//! assert_eq!(parser.parse_season_index("间谍过家家 第二季"), 2);
//! assert_eq!(parser.parse_season_index("Season 3"), 3);
//! assert_eq!(parser.replace_season_index_with("洛基 第二季", 1), "洛基 第1季");
//! ```

use regex::Regex;

use crate::error::Result;
use crate::numeral::{chinese_numeral_to_int, roman_numeral_to_int};
use crate::parser::{FileNameParser, Tokenizer};
use crate::types::{LookupKind, LookupQuery};

/// Prefixes after which a trailing number is part of the title, not a season.
pub const DEFAULT_TRAILING_NUMBER_EXCLUSIONS: &[&str] = &["女神异闻录", "Part "];

/// Folder-name words that mark specials content.
pub const SPECIALS_VOCABULARY: &[&str] = &[
    "sp", "sps", "special", "specials", "ova", "ovas", "oad", "oads", "ncop", "nced", "extra",
    "extras", "bonus", "pv", "cm", "menu", "trailer", "trailers",
];

/// Substrings that mark specials content in CJK folder names.
pub const SPECIALS_CJK_MARKERS: &[&str] = &["特典", "番外", "特别篇", "特別篇", "花絮"];

/// One way of reading a season number out of a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonPattern {
    /// `第N季` / `第N期` / `第N部` / `Season N`.
    Marker,
    /// Season field of the release file-name parser.
    FileNameTokenizer,
    /// A bare 1-2 digit number ending the string.
    TrailingNumber,
    /// A Roman numeral ending the string.
    TrailingRoman,
}

/// The query field a strategy reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryField {
    Name,
    OriginalTitle,
    FileName,
    /// Folder containing the file; consulted for episodes only.
    ParentFolder,
}

/// Strategy precedence for [`SeasonParser::guess_season_index`].
pub const GUESS_ORDER: &[(SeasonPattern, QueryField)] = &[
    (SeasonPattern::Marker, QueryField::Name),
    (SeasonPattern::Marker, QueryField::OriginalTitle),
    (SeasonPattern::Marker, QueryField::FileName),
    (SeasonPattern::Marker, QueryField::ParentFolder),
    (SeasonPattern::FileNameTokenizer, QueryField::FileName),
    (SeasonPattern::TrailingNumber, QueryField::Name),
    (SeasonPattern::TrailingRoman, QueryField::Name),
];

pub struct SeasonParser {
    re_marker: Regex,
    re_trailing_number: Regex,
    re_trailing_roman: Regex,
    re_placeholder: Regex,
    exclusions: Vec<String>,
    file_names: FileNameParser,
    tokenizer: Tokenizer,
}

impl SeasonParser {
    /// Builds a parser with the given trailing-number exclusion prefixes.
    ///
    /// # Errors
    ///
    /// Returns `MetaError::RegexError` if a static pattern fails to compile.
    pub fn new<I, S>(exclusions: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            re_marker: Regex::new(
                r"(?i)\s*第\s*(?P<cn>[一二三四五六七八九十百千万零〇0-9]+)\s*[季期部]|\s*\bSeason\s*(?P<en>[0-9]+)",
            )?,
            re_trailing_number: Regex::new(r"[0-9]+$")?,
            re_trailing_roman: Regex::new(r"(?:^|\s)(?P<ascii>[IVX]{1,4})$|(?P<uni>[\x{2160}-\x{216B}])$")?,
            re_placeholder: Regex::new(r"^(?:第 [0-9]+ 季|Season [0-9]+|未知季|Season Unknown|Specials)$")?,
            exclusions: exclusions.into_iter().map(Into::into).collect(),
            file_names: FileNameParser::new()?,
            tokenizer: Tokenizer::new(),
        })
    }

    pub fn with_default_exclusions() -> Result<Self> {
        Self::new(DEFAULT_TRAILING_NUMBER_EXCLUSIONS.iter().copied())
    }

    /// The release file-name parser shared by the season strategies.
    pub fn file_names(&self) -> &FileNameParser {
        &self.file_names
    }

    /// Season number from an explicit marker, `0` when there is none.
    pub fn parse_season_index(&self, name: &str) -> u32 {
        self.parse_with(name, SeasonPattern::Marker)
    }

    /// Season number read with one specific strategy, `0` when it does not apply.
    pub fn parse_with(&self, name: &str, pattern: SeasonPattern) -> u32 {
        if name.trim().is_empty() {
            return 0;
        }
        match pattern {
            SeasonPattern::Marker => self
                .re_marker
                .captures(name)
                .and_then(|c| c.name("cn").or_else(|| c.name("en")))
                .map_or(0, |m| chinese_numeral_to_int(m.as_str())),
            SeasonPattern::FileNameTokenizer => self
                .file_names
                .parse(name)
                .ok()
                .and_then(|info| info.season)
                .unwrap_or(0),
            SeasonPattern::TrailingNumber => self.trailing_number(name).map_or(0, |(_, n)| n),
            SeasonPattern::TrailingRoman => self
                .re_trailing_roman
                .captures(name)
                .and_then(|c| c.name("ascii").or_else(|| c.name("uni")))
                .map_or(0, |m| roman_numeral_to_int(m.as_str())),
        }
    }

    /// Walks [`GUESS_ORDER`] and returns the first non-zero season number.
    pub fn guess_season_index(&self, query: &LookupQuery) -> u32 {
        GUESS_ORDER
            .iter()
            .filter_map(|(pattern, field)| {
                let value = query_field(query, *field)?;
                Some(self.parse_with(value, *pattern))
            })
            .find(|index| *index != 0)
            .unwrap_or(0)
    }

    /// Whether the query points at a specials folder.
    ///
    /// Checks the season folder (seasons) or the containing folder
    /// (episodes) against [`SPECIALS_VOCABULARY`] word by word and against
    /// [`SPECIALS_CJK_MARKERS`] by substring, then the display name as a
    /// whole. Returns the matching folder or name.
    pub fn is_specials_folder(&self, query: &LookupQuery) -> (bool, Option<String>) {
        let folder = match query.kind {
            LookupKind::Season { .. } => query.file_name(),
            LookupKind::Episode { .. } => query.parent_folder_name(),
            _ => return (false, None),
        };

        if let Some(folder) = folder {
            if self.tokenizer.contains_word(folder, SPECIALS_VOCABULARY)
                || SPECIALS_CJK_MARKERS.iter().any(|m| folder.contains(m))
            {
                return (true, Some(folder.to_string()));
            }
        }

        let name = query.name.trim();
        let lowered = name.to_lowercase();
        if SPECIALS_VOCABULARY.contains(&lowered.as_str()) || SPECIALS_CJK_MARKERS.contains(&name) {
            return (true, Some(name.to_string()));
        }

        (false, None)
    }

    /// Removes any season marker and trailing season number from `name`
    /// and appends `第{index}季`.
    pub fn replace_season_index_with(&self, name: &str, index: u32) -> String {
        format!("{} 第{index}季", self.strip_season(name))
    }

    /// `name` without season markers or a trailing season number, trimmed
    /// at the end.
    pub fn strip_season(&self, name: &str) -> String {
        let stripped = self.re_marker.replace_all(name, "");
        let stripped = match self.trailing_number(&stripped) {
            Some((start, _)) => &stripped[..start],
            None => &stripped[..],
        };
        stripped.trim_end().to_string()
    }

    /// Whether `name` is a season label generated by the host
    /// (`第 2 季`, `Season 2`, `Specials`), which carries nothing searchable.
    pub fn is_placeholder_season_name(&self, name: &str) -> bool {
        self.re_placeholder.is_match(name.trim())
    }

    /// Byte offset and value of a trailing 1-2 digit season number.
    ///
    /// The number must not follow a lowercase letter, `.`, `'`, or one of
    /// the configured exclusion prefixes.
    fn trailing_number(&self, name: &str) -> Option<(usize, u32)> {
        let m = self.re_trailing_number.find(name)?;
        if m.as_str().len() > 2 {
            return None;
        }
        let prefix = &name[..m.start()];
        if let Some(prev) = prefix.chars().last() {
            if prev.is_ascii_lowercase() || prev == '.' || prev == '\'' {
                return None;
            }
        }
        if self.exclusions.iter().any(|ex| prefix.ends_with(ex.as_str())) {
            return None;
        }
        let value: u32 = m.as_str().parse().ok()?;
        Some((m.start(), value))
    }
}

fn query_field(query: &LookupQuery, field: QueryField) -> Option<&str> {
    let value = match field {
        QueryField::Name => Some(query.name.as_str()),
        QueryField::OriginalTitle => query.original_title.as_deref(),
        QueryField::FileName => query.file_name(),
        QueryField::ParentFolder => match query.kind {
            LookupKind::Episode { .. } => query.parent_folder_name(),
            _ => None,
        },
    };
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> SeasonParser {
        SeasonParser::with_default_exclusions().unwrap()
    }

    #[test]
    fn marker_with_spaces() {
        assert_eq!(parser().parse_season_index("第 2 季"), 2);
    }

    #[test]
    fn marker_variants() {
        let p = parser();
        for (input, expected) in [
            ("间谍过家家 第二季", 2),
            ("进击的巨人 第三季 Part.2", 3),
            ("某科学的超电磁炮 第十二期", 12),
            ("三体 第1部", 1),
            ("Season 3", 3),
            ("Loki season 2", 2),
            ("无季节标记", 0),
            ("", 0),
        ] {
            assert_eq!(p.parse_season_index(input), expected, "input: {input}");
        }
    }

    #[test]
    fn trailing_number_rules() {
        let p = parser();
        assert_eq!(p.parse_with("食梦者 3", SeasonPattern::TrailingNumber), 3);
        assert_eq!(p.parse_with("Rocky II 2", SeasonPattern::TrailingNumber), 2);
        assert_eq!(p.parse_with("HEVC 10bit", SeasonPattern::TrailingNumber), 0);
        assert_eq!(p.parse_with("ver2", SeasonPattern::TrailingNumber), 0);
        assert_eq!(p.parse_with("v1.2", SeasonPattern::TrailingNumber), 0);
        assert_eq!(p.parse_with("1917", SeasonPattern::TrailingNumber), 0);
        assert_eq!(p.parse_with("女神异闻录5", SeasonPattern::TrailingNumber), 0);
        assert_eq!(p.parse_with("Final Season Part 2", SeasonPattern::TrailingNumber), 0);
    }

    #[test]
    fn exclusions_are_configurable() {
        let p = SeasonParser::new(["食梦者 "]).unwrap();
        assert_eq!(p.parse_with("食梦者 3", SeasonPattern::TrailingNumber), 0);
        assert_eq!(p.parse_with("女神异闻录5", SeasonPattern::TrailingNumber), 5);
    }

    #[test]
    fn trailing_roman() {
        let p = parser();
        assert_eq!(p.parse_with("进击的巨人Ⅲ", SeasonPattern::TrailingRoman), 3);
        assert_eq!(p.parse_with("Rocky II", SeasonPattern::TrailingRoman), 2);
        assert_eq!(p.parse_with("Final Fantasy XIV", SeasonPattern::TrailingRoman), 14);
        assert_eq!(p.parse_with("CIVIL", SeasonPattern::TrailingRoman), 0);
    }

    #[test]
    fn guess_prefers_markers_over_trailing_numbers() {
        let p = parser();
        let q = LookupQuery::series("食梦者 3").with_original_title("バクマン。 第2シリーズ 第二期");
        assert_eq!(p.guess_season_index(&q), 2);

        let q = LookupQuery::series("食梦者 3");
        assert_eq!(p.guess_season_index(&q), 3);
    }

    #[test]
    fn guess_reads_file_name_and_parent_folder() {
        let p = parser();
        let q = LookupQuery::episode("第 1 集", Some(1), None)
            .with_path("/anime/Spy x Family/Season 2/[Group] Spy x Family - 01.mkv");
        assert_eq!(p.guess_season_index(&q), 2);

        let q = LookupQuery::series("Golden Kamuy")
            .with_path("/anime/[Judas] Golden Kamuy S3 - 01-12 (1080p)");
        assert_eq!(p.guess_season_index(&q), 3);
    }

    #[test]
    fn guess_unknown_is_zero() {
        let p = parser();
        assert_eq!(p.guess_season_index(&LookupQuery::series("三体")), 0);
    }

    #[test]
    fn parent_folder_ignored_for_non_episodes() {
        let p = parser();
        let q = LookupQuery::movie("Movie").with_path("/Season 2/movie.mkv");
        assert_eq!(p.guess_season_index(&q), 0);
    }

    #[test]
    fn replace_removes_old_marker() {
        let p = parser();
        let replaced = p.replace_season_index_with("进击的巨人 第二季 (2023)", 1);
        assert!(!replaced.contains("第二季"), "got: {replaced}");
        assert_eq!(p.parse_season_index(&replaced), 1);
        assert_eq!(replaced, "进击的巨人 (2023) 第1季");
    }

    #[test]
    fn replace_strips_trailing_number() {
        let p = parser();
        assert_eq!(p.replace_season_index_with("食梦者 3", 1), "食梦者 第1季");
        assert_eq!(p.replace_season_index_with("Loki Season 2", 1), "Loki 第1季");
    }

    #[test]
    fn strip_leaves_nothing_for_bare_labels() {
        let p = parser();
        assert_eq!(p.strip_season("第 2 季"), "");
        assert_eq!(p.strip_season("Season 2"), "");
        assert_eq!(p.strip_season("女神异闻录5"), "女神异闻录5");
    }

    #[test]
    fn placeholder_names() {
        let p = parser();
        for name in ["第 2 季", "Season 12", "未知季", "Season Unknown", "Specials"] {
            assert!(p.is_placeholder_season_name(name), "name: {name}");
        }
        assert!(!p.is_placeholder_season_name("间谍过家家 第二季"));
        assert!(!p.is_placeholder_season_name("第二季"));
    }

    #[test]
    fn specials_folder_detection() {
        let p = parser();

        let q = LookupQuery::season("Specials", Some(0)).with_path("/anime/Show/SPs");
        assert_eq!(p.is_specials_folder(&q), (true, Some("SPs".to_string())));

        let q = LookupQuery::episode("x", Some(1), None).with_path("/anime/Show/【特典】/01.mkv");
        assert_eq!(p.is_specials_folder(&q), (true, Some("【特典】".to_string())));

        let q = LookupQuery::season("OVA", None);
        assert_eq!(p.is_specials_folder(&q), (true, Some("OVA".to_string())));

        let q = LookupQuery::season("第 1 季", Some(1)).with_path("/anime/Spy x Family/Season 1");
        assert_eq!(p.is_specials_folder(&q), (false, None));

        let q = LookupQuery::movie("SP").with_path("/movies/SP");
        assert_eq!(p.is_specials_folder(&q), (false, None));
    }
}
