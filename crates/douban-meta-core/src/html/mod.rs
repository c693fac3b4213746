//! # Catalog response parsing
//!
//! Turns raw catalog pages into typed records. Every function is pure and
//! never fails: a missing node degrades to an empty field, an unknown page
//! shape degrades to an empty list or the not-found sentinel.
//!
//! All knowledge of the catalog markup lives in this module: the
//! `Selectors` table and the regexes compiled by [`ResponseParser::new`].
//!
//! ## Quick Start
//!
//! ```rust
//! use douban_meta_core::html::ResponseParser;
//!
//! let parser = ResponseParser::new().unwrap();
//! let html = r#"<html><head><title>三体 (豆瓣)</title></head>
//! <body><div id="content"><h1><span>三体</span> <span class="year">(2023)</span></h1>
//! <div id="info"><span class="pl">集数:</span> 30<br/></div></div></body></html>"#;
//!
//! let subject = parser.parse_movie(html, "35196946");
//! assert_eq!(subject.name, "三体");
//! assert_eq!(subject.year, Some(2023));
//! assert_eq!(subject.episode_count, 30);
//! ```

mod celebrity;
mod episode;
mod images;
mod person;
mod search;
mod subject;

use std::collections::HashMap;

use regex::Regex;
use scraper::{ElementRef, Html, Node, Selector};

use crate::error::{MetaError, Result};
use crate::season::SeasonParser;

pub use search::SearchIntent;

/// Default image CDN host.
pub const DEFAULT_CDN_SERVER: &str = "https://img2.doubanio.com";

/// Marker the catalog uses for "no information yet".
pub(crate) const NOT_AVAILABLE: &str = "暂无，欢迎添加";

/// Path fragments of placeholder avatars.
const DEFAULT_AVATARS: [&str; 3] = ["celebrity-default", "personage-default", "person-default"];

/// Image handling switches shared by the cast and photo parsers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageOptions {
    /// Host that replaces `https://imgN.doubanio.com` in image URLs.
    pub cdn_server: String,
    /// Attach cast avatars.
    pub fetch_celebrity_images: bool,
    /// Classify photos as backdrop when wider than tall.
    pub distinguish_using_aspect_ratio: bool,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            cdn_server: DEFAULT_CDN_SERVER.to_string(),
            fetch_celebrity_images: true,
            distinguish_using_aspect_ratio: true,
        }
    }
}

/// Compiled CSS selectors for every page shape the parser understands.
pub(crate) struct Selectors {
    // search
    pub result_list: Selector,
    pub result_link: Selector,
    pub result_poster: Selector,
    pub result_type: Selector,
    pub result_rating: Selector,
    pub result_cast: Selector,
    pub result_rating_info: Selector,
    // subject
    pub title: Selector,
    pub content: Selector,
    pub main_pic: Selector,
    pub h1: Selector,
    pub h1_span: Selector,
    pub h1_year: Selector,
    pub rating_num: Selector,
    pub info: Selector,
    pub intro_all: Selector,
    pub intro: Selector,
    pub season_selected: Selector,
    // celebrities
    pub celebrity_lists: Selector,
    pub h2: Selector,
    pub celebrity_items: Selector,
    pub celebrity_name: Selector,
    pub avatar: Selector,
    pub role: Selector,
    // photos
    pub photo_items: Selector,
    pub img: Selector,
    pub photo_prop: Selector,
    pub photo_size: Selector,
    pub photo_name: Selector,
    // episode
    pub episode_info: Selector,
    pub meta_description: Selector,
    // person
    pub headline_img: Selector,
    pub subject_avatar: Selector,
    pub info_list: Selector,
    pub subject_property: Selector,
    pub li: Selector,
    pub person_intro_all: Selector,
    pub person_intro: Selector,
    pub desc_content: Selector,
}

impl Selectors {
    fn new() -> Result<Self> {
        Ok(Self {
            result_list: compile(".result-list")?,
            result_link: compile(".content .title h3 a")?,
            result_poster: compile(".pic img")?,
            result_type: compile(".content .title h3 span")?,
            result_rating: compile(".rating-info .rating_nums")?,
            result_cast: compile(".rating-info .subject-cast")?,
            result_rating_info: compile(".rating-info")?,
            title: compile("title")?,
            content: compile("#content")?,
            main_pic: compile("#mainpic img")?,
            h1: compile("h1")?,
            h1_span: compile("h1 span")?,
            h1_year: compile("h1 .year")?,
            rating_num: compile("#interest_sectl .rating_num")?,
            info: compile("#info")?,
            intro_all: compile("#link-report-intra span.all")?,
            intro: compile("#link-report-intra span")?,
            season_selected: compile("#season option[selected]")?,
            celebrity_lists: compile("#celebrities .list-wrapper")?,
            h2: compile("h2")?,
            celebrity_items: compile("ul.celebrities-list li.celebrity")?,
            celebrity_name: compile("a.name")?,
            avatar: compile(".avatar")?,
            role: compile(".role")?,
            photo_items: compile(".article ul li")?,
            img: compile("img")?,
            photo_prop: compile(".prop")?,
            photo_size: compile(".size")?,
            photo_name: compile(".name a")?,
            episode_info: compile("#content .ep-info li")?,
            meta_description: compile(r#"meta[name="description"]"#)?,
            headline_img: compile("#headline .pic img")?,
            subject_avatar: compile(".subject-target img.avatar")?,
            info_list: compile(".info ul")?,
            subject_property: compile(".subject-target ul.subject-property")?,
            li: compile("li")?,
            person_intro_all: compile("#intro .bd .all")?,
            person_intro: compile("#intro .bd")?,
            desc_content: compile(".desc .content .content")?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| MetaError::Selector {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Stateless parser for catalog pages.
///
/// Construction compiles all selectors and patterns once; the parser is
/// `Send + Sync` and meant to be shared.
pub struct ResponseParser {
    pub(crate) sel: Selectors,
    pub(crate) re_sid: Regex,
    pub(crate) re_image: Regex,
    pub(crate) re_image_url: Regex,
    pub(crate) re_celebrity: Regex,
    pub(crate) re_personage: Regex,
    pub(crate) re_doubanio_host: Regex,
    pub(crate) re_bracket: Regex,
    pub(crate) re_date: Regex,
    pub(crate) re_image_vote: Regex,
    pub(crate) seasons: SeasonParser,
}

impl ResponseParser {
    /// Compiles every selector and pattern.
    ///
    /// # Errors
    ///
    /// Returns `MetaError::Selector` or `MetaError::RegexError` if a static
    /// selector or pattern fails to compile.
    pub fn new() -> Result<Self> {
        Ok(Self {
            sel: Selectors::new()?,
            re_sid: Regex::new(r"\s*sid:\s*(\d+)")?,
            re_image: Regex::new(r"/(p\d+)\.(?:webp|png|jpg|jpeg|gif)$")?,
            re_image_url: Regex::new(r"url\((.+?\.(?:webp|png|jpg|jpeg|gif))\)")?,
            re_celebrity: Regex::new(r"/celebrity/(\d+)/")?,
            re_personage: Regex::new(r"/personage/(\d+)/")?,
            re_doubanio_host: Regex::new(r"https?://img\d+\.doubanio\.com")?,
            re_bracket: Regex::new(r"\(.+?\)?$")?,
            re_date: Regex::new(r"\d{4}-\d\d-\d\d")?,
            re_image_vote: Regex::new(r"(\d+)回应")?,
            seasons: SeasonParser::with_default_exclusions()?,
        })
    }

    /// Photo id (`p2903433431`) of an image URL.
    pub(crate) fn photo_id(&self, src: &str) -> Option<String> {
        self.re_image
            .captures(src)
            .map(|c| c[1].to_string())
    }

    /// Rewrites the image host to `cdn_server`; default avatars become `None`.
    pub(crate) fn rewrite_avatar(&self, url: &str, cdn_server: &str) -> Option<String> {
        if url.is_empty() || DEFAULT_AVATARS.iter().any(|marker| url.contains(marker)) {
            return None;
        }
        Some(self.re_doubanio_host.replace(url, cdn_server).into_owned())
    }

    /// Id captured by `re` from an attribute value.
    pub(crate) fn capture_id(re: &Regex, value: &str) -> Option<String> {
        re.captures(value).map(|c| c[1].to_string())
    }
}

/// First descendant of `scope` matching `selector`.
pub(crate) fn select_first<'a>(scope: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    scope.select(selector).next()
}

/// First element of `document` matching `selector`.
pub(crate) fn select_doc<'a>(document: &'a Html, selector: &Selector) -> Option<ElementRef<'a>> {
    document.select(selector).next()
}

/// Trimmed text content.
pub(crate) fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

pub(crate) fn attr_of<'a>(el: ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value().attr(name)
}

/// Visual lines of an element: `<br>` breaks lines, source newlines do not.
/// Lines are trimmed and empty ones dropped.
pub(crate) fn lines_of(el: ElementRef<'_>) -> Vec<String> {
    let mut out = String::new();
    for node in el.descendants() {
        match node.value() {
            Node::Text(text) => out.push_str(&text.replace(['\n', '\r'], " ")),
            Node::Element(element) if element.name() == "br" => out.push('\n'),
            _ => {}
        }
    }
    out.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Text lines of an element, split on source newlines, trimmed, empty ones dropped.
pub(crate) fn paragraphs_of(el: ElementRef<'_>) -> Vec<String> {
    el.text()
        .collect::<String>()
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// `key: value` pairs; the first occurrence of a key wins.
pub(crate) fn field_map<I, S>(lines: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut map = HashMap::new();
    for line in lines {
        let line = line.as_ref().trim();
        let Some((key, value)) = line.split_once(':').or_else(|| line.split_once('：')) else {
            continue;
        };
        map.entry(key.trim().to_string())
            .or_insert_with(|| value.trim().to_string());
    }
    map
}

/// `/`-separated list, trimmed, empty entries dropped.
pub(crate) fn split_list(value: &str) -> Vec<String> {
    value
        .split('/')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Non-empty value of `key`.
pub(crate) fn field<'a>(map: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    map.get(key).map(String::as_str).filter(|v| !v.is_empty())
}
