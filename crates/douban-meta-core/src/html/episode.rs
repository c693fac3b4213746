use chrono::NaiveDate;
use scraper::Html;

use super::{NOT_AVAILABLE, ResponseParser, attr_of, field_map, select_doc, text_of};
use crate::types::EpisodeSubject;

impl ResponseParser {
    /// Parses an episode page. Fields the catalog marks as not yet
    /// available are `None`; the synopsis comes from the page description.
    pub fn parse_episode(&self, html: &str) -> EpisodeSubject {
        let document = Html::parse_document(html);
        let info = field_map(document.select(&self.sel.episode_info).map(text_of));
        let known = |key: &str| {
            info.get(key)
                .map(String::as_str)
                .filter(|v| !v.is_empty() && *v != NOT_AVAILABLE)
        };

        let air_date = known("播放时间")
            .and_then(|value| self.re_date.find(value))
            .and_then(|date| NaiveDate::parse_from_str(date.as_str(), "%Y-%m-%d").ok());

        let intro = known("剧情简介").and_then(|_| {
            select_doc(&document, &self.sel.meta_description)
                .and_then(|meta| attr_of(meta, "content"))
                .map(|content| content.trim().to_string())
                .filter(|content| !content.is_empty())
        });

        EpisodeSubject {
            name: known("本集中文名").map(str::to_string),
            original_name: known("本集原名").map(str::to_string),
            air_date,
            intro,
        }
    }
}
