use scraper::Html;
use serde::Deserialize;

use super::{ResponseParser, attr_of, field, field_map, lines_of, paragraphs_of, select_doc, select_first, text_of};
use crate::error::Result;
use crate::types::{PartialDate, PersonSubject};

/// One entry of the `subject_suggest` JSON endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SuggestItem {
    id: String,
    title: String,
    sub_title: String,
    img: String,
    #[serde(rename = "type")]
    kind: String,
}

impl ResponseParser {
    /// Parses a person page.
    ///
    /// Handles the legacy celebrity layout (`#headline`, `.info ul`,
    /// `#intro`) and the personage layout (`.subject-target`, `.desc`).
    /// A combined `生卒日期` range takes precedence over separate
    /// `出生日期`/`去世日期` fields.
    pub fn parse_person(&self, html: &str, personage_id: &str, cdn_server: &str) -> PersonSubject {
        let document = Html::parse_document(html);
        let Some(content) = select_doc(&document, &self.sel.content) else {
            tracing::warn!(pid = %personage_id, "person page has no content block");
            return PersonSubject::default();
        };
        let Some(image) = select_first(content, &self.sel.headline_img)
            .or_else(|| select_first(content, &self.sel.subject_avatar))
        else {
            tracing::warn!(pid = %personage_id, "person page has no portrait");
            return PersonSubject::default();
        };

        let name = attr_of(image, "alt").unwrap_or_default().trim().to_string();
        let poster_url = attr_of(image, "src").and_then(|src| self.rewrite_avatar(src, cdn_server));
        let original_name = select_first(content, &self.sel.h1)
            .map(text_of)
            .map(|heading| heading.replace(&name, "").trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| name.clone());

        let info = select_first(content, &self.sel.info_list)
            .or_else(|| select_first(content, &self.sel.subject_property))
            .map(|list| field_map(list.select(&self.sel.li).map(|li| lines_of(li).join(" "))))
            .unwrap_or_default();

        let intro = select_first(content, &self.sel.person_intro_all)
            .or_else(|| select_first(content, &self.sel.person_intro))
            .or_else(|| select_first(content, &self.sel.desc_content))
            .map(|el| paragraphs_of(el).join("\n"))
            .filter(|i| !i.is_empty());

        let (birth, death) = match field(&info, "生卒日期") {
            Some(range) => {
                let mut ends = range.splitn(2, '至').map(str::trim);
                (ends.next(), ends.next())
            }
            None => (field(&info, "出生日期"), field(&info, "去世日期")),
        };

        PersonSubject {
            celebrity_id: None,
            personage_id: Some(personage_id.to_string()),
            original_name: Some(original_name),
            poster_url,
            gender: field(&info, "性别").map(str::to_string),
            birth_date: birth.and_then(PartialDate::parse),
            death_date: death.and_then(PartialDate::parse),
            birthplace: field(&info, "出生地").map(str::to_string),
            website: field(&info, "官方网站").map(str::to_string),
            imdb_id: field(&info, "imdb编号")
                .or_else(|| field(&info, "IMDb编号"))
                .map(str::to_string),
            intro,
            name,
        }
    }

    /// Parses the `subject_suggest` JSON endpoint, keeping celebrities only.
    ///
    /// # Errors
    ///
    /// Returns `MetaError::Json` when the payload is not a JSON array of
    /// objects.
    pub fn parse_subject_suggest(&self, json: &str) -> Result<Vec<PersonSubject>> {
        let items: Vec<SuggestItem> = serde_json::from_str(json)?;
        Ok(items
            .into_iter()
            .filter(|item| item.kind == "celebrity" && !item.id.is_empty())
            .map(|item| PersonSubject {
                celebrity_id: Some(item.id),
                name: item.title,
                original_name: Some(item.sub_title).filter(|s| !s.is_empty()),
                poster_url: Some(item.img).filter(|s| !s.is_empty()),
                ..PersonSubject::default()
            })
            .collect())
    }
}
