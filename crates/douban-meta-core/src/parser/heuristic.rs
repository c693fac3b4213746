use regex::Regex;

use crate::error::{MetaError, Result};
use crate::types::FileNameInfo;

/// Placeholder that marks a consumed metadata token while isolating the title.
const SENTINEL: char = '\x00';

/// Heuristic parser for anime and scene release file names.
///
/// Recovers the series title, release group, season, episode, year and
/// extension from names such as
/// `[Nekomoe kissaten][Lycoris Recoil][01][1080p][JPSC].mp4` or
/// `Loki.S01E02.1080p.WEB-DL.mkv`. The resolver uses the title as a search
/// candidate, the season as a season-number strategy, and the episode as
/// the fallback episode index.
pub struct FileNameParser {
    re_group: Regex,
    re_extension: Regex,
    re_resolution: Regex,
    re_vcodec: Regex,
    re_acodec: Regex,
    re_source: Regex,
    re_crc32: Regex,
    re_season_episode: Regex,
    re_episode_range: Regex,
    re_episode_version: Regex,
    re_episode_bracket: Regex,
    re_episode_cn: Regex,
    re_episode: Regex,
    re_season: Regex,
    re_season_ordinal: Regex,
    re_year: Regex,
    re_brackets: Regex,
    re_lang_tag: Regex,
    re_junk: Regex,
}

impl FileNameParser {
    /// Constructs a new `FileNameParser` with pre-compiled regex patterns.
    ///
    /// # Errors
    ///
    /// Returns `MetaError::RegexError` if any pattern fails to compile
    /// (should never happen with the static patterns defined here).
    pub fn new() -> Result<Self> {
        Ok(Self {
            re_group: Regex::new(r"^[\[【]([^\]】]+)[\]】]")?,
            re_extension: Regex::new(
                r"(?i)\.(mkv|mp4|avi|m4v|mov|wmv|flv|ts|m2ts|rmvb|webm|iso|strm)$",
            )?,
            re_resolution: Regex::new(
                r"(?i)\b(?:2160|1080|720|576|480)[pi]\b|\b(?:3840|1920|1280)x(?:2160|1080|720)\b|\b4k\b",
            )?,
            re_vcodec: Regex::new(
                r"(?i)\b(?:x\.?264|x\.?265|h\.?264|h\.?265|hevc|avc|av1|vp9|mpeg4|xvid|hi10p?|10-?bit|8-?bit)\b",
            )?,
            re_acodec: Regex::new(
                r"(?i)\b(?:flac|aac|opus|ac3|dts(?:-?hd)?|truehd|mp3|vorbis|e-?aac\+?)\b",
            )?,
            re_source: Regex::new(
                r"(?i)\b(?:blu-?ray\s*remux|bd-?remux|blu-?ray|bdrip|web-?dl|web-?rip|hdtv|dvd(?:rip)?)\b",
            )?,
            re_crc32: Regex::new(r"\[([0-9A-Fa-f]{8})\]")?,
            re_season_episode: Regex::new(r"(?i)\bS(\d{1,2})E(\d{1,4})\b")?,
            re_episode_range: Regex::new(
                r"(?i)(?:[\s\-_\.]|(?:^|[\s\-_\.\[\(])ep?\.?\s*)(\d{1,4})\s*[-~]\s*(\d{1,4})\b",
            )?,
            re_episode_version: Regex::new(
                r"(?i)(?:[\s\-_\.\[]|(?:^|[\s\-_\.\[\(])ep?\.?\s*)(\d{1,4})v(\d)\b",
            )?,
            re_episode_bracket: Regex::new(r"(?i)\[(\d{1,3})(?:v\d)?(?:end|完)?\]")?,
            re_episode_cn: Regex::new(r"第\s*(\d{1,4})\s*[集话話]")?,
            re_episode: Regex::new(
                r"(?i)(?:[\s\-_\.]|(?:^|[\s\-_\.\[\(])(?:ep?\.?|episode)\s*)(\d{1,4})(?:\b|[^0-9v\-~])",
            )?,
            re_season: Regex::new(r"(?i)(?:\bS|\bseason\s*)(\d{1,2})\b")?,
            re_season_ordinal: Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\s+season\b")?,
            re_year: Regex::new(r"(?:^|[^0-9])((?:19|20)\d{2})(?:$|[^0-9pxX])")?,
            re_brackets: Regex::new(r"\[[^\]]*\]|\([^\)]*\)|【[^】]*】")?,
            re_lang_tag: Regex::new(
                r"(?i)^(?:chs|cht|gb|big5|jp|jpn|sc|tc|eng|jpsc|jptc|简|繁|简体|繁体|简日|繁日|简繁|简繁日|中日双语|内封|外挂|(?:multi[\s\-]?)?subs?|[^\]]*字幕[^\]]*)$",
            )?,
            re_junk: Regex::new(
                r"(?i)[\s_,\.\(\)\[\]\-](?:3d|sbs|hdr|ac3|dts|dvd|dvdrip|hdtv|hdrip|proper|repack|bd|bdrip|brrip|bluray|blu-ray|web-?dl|webrip|remux|480p|576p|720p|1080p|2160p|4k|x264|x265|h264|h265|hevc|avc|xvid|aac|flac|10bit|uncut)(?:[\s_,\.\(\)\[\]\-]|$)",
            )?,
        })
    }

    /// Parses a release file name.
    ///
    /// # Errors
    ///
    /// Returns `MetaError::EmptyInput` if the input is empty or whitespace-only.
    pub fn parse(&self, input: &str) -> Result<FileNameInfo> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MetaError::EmptyInput);
        }

        let mut info = FileNameInfo::new(trimmed);

        // Order matters: the year guards episode detection and the title
        // depends on every other field.
        info.group = self.extract_group(trimmed);
        info.extension = self.extract_extension(trimmed);
        info.year = self.extract_year(trimmed);
        let (season, episode) = self.extract_season_episode(trimmed, info.year);
        info.season = season;
        info.episode = episode;
        info.title = self.extract_title(trimmed, &info);

        Ok(info)
    }

    /// Series title of a release name, or `None` when none can be isolated.
    pub fn anime_title(&self, input: &str) -> Option<String> {
        self.parse(input).ok()?.title
    }

    /// Strips release decoration from a name: the leading group tag, the
    /// extension, and everything from the first bracket, year, or
    /// resolution/codec/source token onward.
    ///
    /// Returns `None` when nothing was removed or nothing is left.
    pub fn clean_name(&self, input: &str) -> Option<String> {
        let trimmed = input.trim();
        let mut work = trimmed;

        if let Some(m) = self.re_extension.find(work) {
            work = &work[..m.start()];
        }
        if let Some(m) = self.re_group.find(work) {
            if !work[m.end()..].trim().is_empty() {
                work = &work[m.end()..];
            }
        }
        if let Some(m) = self.re_junk.find(work) {
            work = &work[..m.start()];
        }
        if let Some(pos) = work.find(['[', '(', '【']) {
            if !work[..pos].trim().is_empty() {
                work = &work[..pos];
            }
        }
        if let Some(c) = self.re_year.captures(work) {
            if let Some(m) = c.get(1) {
                if !work[..m.start()].trim().is_empty() {
                    work = &work[..m.start()];
                }
            }
        }

        let cleaned = normalize_separators(work);
        if cleaned.is_empty() || cleaned == trimmed {
            None
        } else {
            Some(cleaned)
        }
    }

    fn extract_group(&self, input: &str) -> Option<String> {
        let caps = self.re_group.captures(input)?;
        let end = caps.get(0)?.end();
        if input[end..].trim().is_empty() {
            return None;
        }
        Some(caps[1].trim().to_string())
    }

    fn extract_extension(&self, input: &str) -> Option<String> {
        self.re_extension
            .captures(input)
            .map(|c| c[1].to_lowercase())
    }

    fn extract_year(&self, input: &str) -> Option<u16> {
        self.re_year
            .captures_iter(input)
            .filter_map(|c| c[1].parse::<u16>().ok())
            .find(|year| (1900..=2099).contains(year))
    }

    fn extract_season_episode(&self, input: &str, year: Option<u16>) -> (Option<u32>, Option<u32>) {
        if let Some(caps) = self.re_season_episode.captures(input) {
            return (caps[1].parse().ok(), caps[2].parse().ok());
        }

        let season = self
            .re_season
            .captures(input)
            .or_else(|| self.re_season_ordinal.captures(input))
            .and_then(|c| c[1].parse().ok());

        let scrubbed = self.scrub(input);
        (season, self.extract_episode(&scrubbed, year))
    }

    /// Blanks every token that could be mistaken for an episode number.
    fn scrub(&self, input: &str) -> String {
        let mut work = input.to_string();
        if let Some(m) = self.re_group.find(&work) {
            work.replace_range(..m.end(), " ");
        }
        if let Some(m) = self.re_extension.find(&work) {
            work.truncate(m.start());
        }
        for pattern in [
            &self.re_crc32,
            &self.re_resolution,
            &self.re_vcodec,
            &self.re_acodec,
            &self.re_source,
            &self.re_season_ordinal,
            &self.re_season,
        ] {
            work = pattern.replace_all(&work, " ").into_owned();
        }
        work
    }

    fn extract_episode(&self, input: &str, year: Option<u16>) -> Option<u32> {
        if let Some(caps) = self.re_episode_range.captures(input) {
            let start: u32 = caps[1].parse().ok()?;
            let end: u32 = caps[2].parse().ok()?;
            if start < end {
                return None;
            }
        }

        if let Some(caps) = self.re_episode_version.captures(input) {
            return caps[1].parse().ok();
        }
        if let Some(caps) = self.re_episode_cn.captures(input) {
            return caps[1].parse().ok();
        }
        if let Some(caps) = self.re_episode_bracket.captures(input) {
            return caps[1].parse().ok();
        }

        self.re_episode
            .captures_iter(input)
            .filter_map(|c| c[1].parse::<u32>().ok())
            .find(|n| year.is_none_or(|y| u32::from(y) != *n))
    }

    /// Extracts the title from the text region between the group tag and
    /// the first metadata token, falling back to the first bracketed
    /// segment that is not metadata (`[Group][Title][01]` layouts).
    fn extract_title(&self, input: &str, info: &FileNameInfo) -> Option<String> {
        let mut work = input.to_string();

        if info.group.is_some() {
            if let Some(m) = self.re_group.find(&work) {
                work = work[m.end()..].to_string();
            }
        }
        if let Some(m) = self.re_extension.find(&work) {
            work.truncate(m.start());
        }

        let sentinel = SENTINEL.to_string();
        for pattern in [
            &self.re_season_episode,
            &self.re_resolution,
            &self.re_vcodec,
            &self.re_acodec,
            &self.re_source,
            &self.re_crc32,
            &self.re_episode_range,
            &self.re_episode_version,
            &self.re_episode_bracket,
            &self.re_episode_cn,
            &self.re_season_ordinal,
            &self.re_season,
        ] {
            work = pattern.replace_all(&work, sentinel.as_str()).into_owned();
        }
        work = self.re_episode.replace_all(&work, sentinel.as_str()).into_owned();

        if let Some(year) = info.year {
            for bracketed in [format!("({year})"), format!("[{year}]")] {
                work = work.replace(&bracketed, &sentinel);
            }
        }

        let bracket_title = self.first_bracket_title(&work);
        work = self.re_brackets.replace_all(&work, " ").into_owned();

        let region = work.split(SENTINEL).next().unwrap_or("");
        // Bilingual names ("间谍过家家 / Spy x Family") keep the first half.
        let region = region
            .split(" / ")
            .map(str::trim)
            .find(|part| !part.is_empty())
            .unwrap_or("");

        let cleaned = normalize_separators(region);
        if cleaned.is_empty() {
            bracket_title
        } else {
            Some(cleaned)
        }
    }

    fn first_bracket_title(&self, work: &str) -> Option<String> {
        self.re_brackets.find_iter(work).find_map(|m| {
            let inner = m.as_str();
            let inner = inner
                .get(inner.chars().next()?.len_utf8()..inner.len() - inner.chars().last()?.len_utf8())?
                .trim();
            if inner.is_empty()
                || inner.contains(SENTINEL)
                || inner.chars().all(|c| c.is_ascii_digit())
                || self.re_lang_tag.is_match(inner)
            {
                return None;
            }
            let cleaned = normalize_separators(inner);
            (!cleaned.is_empty()).then_some(cleaned)
        })
    }
}

/// Replaces dots and underscores with spaces, collapses whitespace, and
/// trims dangling dashes.
fn normalize_separators(text: &str) -> String {
    text.replace(['.', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c == '-' || c == ' ')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> FileNameParser {
        FileNameParser::new().unwrap()
    }

    #[test]
    fn empty_input_errors() {
        let p = parser();
        assert!(matches!(p.parse(""), Err(MetaError::EmptyInput)));
        assert!(matches!(p.parse("   "), Err(MetaError::EmptyInput)));
    }

    #[test]
    fn subsplease_standard_format() {
        let p = parser();
        let r = p
            .parse("[SubsPlease] Jujutsu Kaisen - 24 (1080p) [A1B2C3D4].mkv")
            .unwrap();

        assert_eq!(r.title.as_deref(), Some("Jujutsu Kaisen"));
        assert_eq!(r.group.as_deref(), Some("SubsPlease"));
        assert_eq!(r.episode, Some(24));
        assert_eq!(r.extension.as_deref(), Some("mkv"));
    }

    #[test]
    fn bracketed_title_layout() {
        let p = parser();
        let r = p
            .parse("[Nekomoe kissaten][Lycoris Recoil][01][1080p][JPSC].mp4")
            .unwrap();

        assert_eq!(r.group.as_deref(), Some("Nekomoe kissaten"));
        assert_eq!(r.title.as_deref(), Some("Lycoris Recoil"));
        assert_eq!(r.episode, Some(1));
        assert_eq!(r.extension.as_deref(), Some("mp4"));
    }

    #[test]
    fn bilingual_title_keeps_first_half() {
        let p = parser();
        let r = p
            .parse("[Lilith-Raws] 间谍过家家 / Spy x Family - 01 [Baha][WEB-DL][1080p][AVC AAC][CHT][MP4].mp4")
            .unwrap();

        assert_eq!(r.title.as_deref(), Some("间谍过家家"));
        assert_eq!(r.episode, Some(1));
    }

    #[test]
    fn scene_season_episode() {
        let p = parser();
        let r = p.parse("Loki.S01E02.1080p.WEB-DL.mkv").unwrap();

        assert_eq!(r.title.as_deref(), Some("Loki"));
        assert_eq!(r.season, Some(1));
        assert_eq!(r.episode, Some(2));
    }

    #[test]
    fn season_token_and_batch_range() {
        let p = parser();
        let r = p
            .parse("[Judas] Golden Kamuy S3 - 01-12 (1080p) [Batch]")
            .unwrap();

        assert_eq!(r.group.as_deref(), Some("Judas"));
        assert_eq!(r.title.as_deref(), Some("Golden Kamuy"));
        assert_eq!(r.season, Some(3));
        assert_eq!(r.episode, None);
    }

    #[test]
    fn ordinal_season() {
        let p = parser();
        let r = p.parse("[Group] Mushoku Tensei 2nd Season - 05 [1080p].mkv").unwrap();
        assert_eq!(r.season, Some(2));
        assert_eq!(r.episode, Some(5));
        assert_eq!(r.title.as_deref(), Some("Mushoku Tensei"));
    }

    #[test]
    fn chinese_episode_marker() {
        let p = parser();
        let r = p.parse("葬送的芙莉莲 第12集.mp4").unwrap();
        assert_eq!(r.title.as_deref(), Some("葬送的芙莉莲"));
        assert_eq!(r.episode, Some(12));
    }

    #[test]
    fn season_folder_has_no_title() {
        let p = parser();
        let r = p.parse("Season 2").unwrap();
        assert_eq!(r.season, Some(2));
        assert_eq!(r.episode, None);
        assert_eq!(r.title, None);
    }

    #[test]
    fn year_is_not_an_episode() {
        let p = parser();
        let r = p.parse("三体 2024").unwrap();
        assert_eq!(r.year, Some(2024));
        assert_eq!(r.episode, None);

        let r = p.parse("[Group] Title (2024) - 01 (1080p).mkv").unwrap();
        assert_eq!(r.year, Some(2024));
        assert_eq!(r.episode, Some(1));
        assert_eq!(r.title.as_deref(), Some("Title"));
    }

    #[test]
    fn anime_title_shortcut() {
        let p = parser();
        assert_eq!(
            p.anime_title("[ANi] 葬送的芙莉莲 - 03 [1080P][Baha][WEB-DL][AAC AVC][CHT].mp4")
                .as_deref(),
            Some("葬送的芙莉莲")
        );
        assert_eq!(p.anime_title(""), None);
    }

    #[test]
    fn clean_name_strips_decoration() {
        let p = parser();
        assert_eq!(
            p.clean_name("Loki.S01.1080p.BluRay.x264-GROUP.mkv").as_deref(),
            Some("Loki S01")
        );
        assert_eq!(
            p.clean_name("[Nekomoe kissaten] Lycoris Recoil [01][1080p]").as_deref(),
            Some("Lycoris Recoil")
        );
        assert_eq!(p.clean_name("The Matrix (1999)").as_deref(), Some("The Matrix"));
    }

    #[test]
    fn clean_name_none_when_unchanged() {
        let p = parser();
        assert_eq!(p.clean_name("三体"), None);
        assert_eq!(p.clean_name("Spy x Family"), None);
        assert_eq!(p.clean_name(""), None);
    }

    #[test]
    fn file_name_info_is_serializable() {
        let p = parser();
        let r = p.parse("[SubsPlease] Jujutsu Kaisen - 24 (1080p).mkv").unwrap();

        let json = serde_json::to_string(&r).unwrap();
        let back: FileNameInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
