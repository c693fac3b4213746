use std::collections::HashMap;

use chrono::NaiveDate;
use scraper::Html;

use super::{ResponseParser, attr_of, field, field_map, lines_of, paragraphs_of, select_doc, select_first, split_list, text_of};
use crate::types::{MovieSubject, SubjectType};

const TITLE_POSTFIX: &str = " (豆瓣)";

impl ResponseParser {
    /// Parses a subject detail page.
    ///
    /// A page without `#content` yields the not-found sentinel. The season
    /// index comes from the selected season dropdown, then the `季数`
    /// field, then season markers on the name, original name and aliases.
    /// A series that still has no season index is season 1.
    pub fn parse_movie(&self, html: &str, sid: &str) -> MovieSubject {
        let document = Html::parse_document(html);
        let Some(content) = select_doc(&document, &self.sel.content) else {
            tracing::warn!(sid = %sid, "subject page has no content block");
            return MovieSubject::default();
        };

        let title = select_doc(&document, &self.sel.title)
            .map(text_of)
            .unwrap_or_default();
        let name = title
            .strip_suffix(TITLE_POSTFIX)
            .unwrap_or(&title)
            .trim()
            .to_string();

        let original_name = select_first(content, &self.sel.h1_span)
            .map(text_of)
            .map(|heading| heading.replace(&name, "").trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| name.clone());

        let year = select_first(content, &self.sel.h1_year)
            .map(text_of)
            .and_then(|y| y.trim_start_matches('(').trim_end_matches(')').parse::<u16>().ok());

        let rating = select_first(content, &self.sel.rating_num)
            .map(text_of)
            .and_then(|r| r.parse::<f64>().ok())
            .unwrap_or(0.0);

        let info = select_first(content, &self.sel.info)
            .map(|el| field_map(lines_of(el)))
            .unwrap_or_default();

        let subject_type = if info.contains_key("集数") || info.contains_key("单集片长") {
            SubjectType::Series
        } else {
            SubjectType::Movie
        };

        let intro = select_first(content, &self.sel.intro_all)
            .or_else(|| select_first(content, &self.sel.intro))
            .map(|el| paragraphs_of(el).join("\n"))
            .filter(|i| !i.is_empty());

        let aliases = field(&info, "又名").map(split_list).unwrap_or_default();
        let poster_id = select_first(content, &self.sel.main_pic)
            .and_then(|img| attr_of(img, "src"))
            .and_then(|src| self.photo_id(src));

        let mut season_index = select_first(content, &self.sel.season_selected)
            .and_then(|option| text_of(option).parse::<u32>().ok())
            .or_else(|| field(&info, "季数").and_then(|n| n.parse::<u32>().ok()))
            .unwrap_or(0);
        if season_index == 0 && subject_type == SubjectType::Series {
            season_index = std::iter::once(name.as_str())
                .chain(std::iter::once(original_name.as_str()))
                .chain(aliases.iter().map(String::as_str))
                .map(|candidate| self.seasons.parse_season_index(candidate))
                .find(|index| *index != 0)
                .unwrap_or(1);
        }

        let subject = MovieSubject {
            sid: sid.to_string(),
            original_name: Some(original_name),
            rating,
            poster_id,
            year,
            genres: field(&info, "类型").map(split_list).unwrap_or_default(),
            countries: field(&info, "制片国家/地区").map(split_list).unwrap_or_default(),
            website: field(&info, "官方网站").map(str::to_string),
            screen_date: self.screen_date(&info),
            imdb_id: field(&info, "IMDb").map(str::to_string),
            season_index,
            episode_count: field(&info, "集数").and_then(|n| n.parse().ok()).unwrap_or(0),
            intro,
            aliases,
            subject_type,
            name,
        };
        tracing::debug!(sid = %sid, name = %subject.name, season = subject.season_index, "parsed subject");
        subject
    }

    /// First `yyyy-MM-dd` date of `上映日期`, else of `首播`. Region
    /// qualifiers such as `(中国大陆)` are stripped.
    fn screen_date(&self, info: &HashMap<String, String>) -> Option<NaiveDate> {
        let dates = info.get("上映日期").or_else(|| info.get("首播"))?;
        dates.split('/').find_map(|part| {
            let stripped = self.re_bracket.replace(part.trim(), "");
            let date = self.re_date.find(&stripped)?;
            NaiveDate::parse_from_str(date.as_str(), "%Y-%m-%d").ok()
        })
    }
}
