use scraper::Html;

use super::{ImageOptions, ResponseParser, attr_of, select_first, text_of};
use crate::types::{CastMember, PersonRole};

/// Markers that open the character part of a role line: `(饰 汪淼)`, `(配 路飞)`.
const CHARACTER_MARKERS: [&str; 2] = ["(饰", "(配"];

impl ResponseParser {
    /// Parses the full cast page of a subject.
    ///
    /// The role label of each entry decides the credit; entries without a
    /// role line, or with an unknown label, inherit the section heading.
    /// Entries for which neither maps to a [`PersonRole`] are skipped.
    pub fn parse_celebrities(&self, html: &str, options: &ImageOptions) -> Vec<CastMember> {
        let document = Html::parse_document(html);
        let mut cast = Vec::new();

        for list in document.select(&self.sel.celebrity_lists) {
            let heading = select_first(list, &self.sel.h2).map(text_of).unwrap_or_default();
            let section = heading.split(' ').next().unwrap_or_default();

            for item in list.select(&self.sel.celebrity_items) {
                let link = select_first(item, &self.sel.celebrity_name);
                let href = link.and_then(|a| attr_of(a, "href")).unwrap_or_default();

                let role_line = select_first(item, &self.sel.role).map(text_of);
                let words: Vec<&str> = match &role_line {
                    Some(line) => line.split(' ').collect(),
                    None => vec![section],
                };
                let label = words.first().copied().unwrap_or_default();
                let Some(role) = PersonRole::from_label(label).or_else(|| PersonRole::from_label(section)) else {
                    continue;
                };

                let image_url = if options.fetch_celebrity_images {
                    select_first(item, &self.sel.avatar)
                        .and_then(|el| attr_of(el, "style"))
                        .and_then(|style| Self::capture_id(&self.re_image_url, style))
                        .and_then(|url| self.rewrite_avatar(&url, &options.cdn_server))
                } else {
                    None
                };

                cast.push(CastMember {
                    name: link
                        .map(text_of)
                        .and_then(|n| n.split(' ').next().map(str::to_string))
                        .unwrap_or_default(),
                    celebrity_id: Self::capture_id(&self.re_celebrity, href),
                    personage_id: Self::capture_id(&self.re_personage, href),
                    role,
                    character: character_of(&words),
                    image_url,
                });
            }
        }

        tracing::debug!(count = cast.len(), "parsed cast");
        cast
    }
}

fn character_of(words: &[&str]) -> String {
    words
        .iter()
        .position(|w| CHARACTER_MARKERS.contains(w))
        .map(|pos| words[pos + 1..].join(" ").trim_end_matches(')').to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAST: &str = r#"<html><body><div id="celebrities">
<div class="list-wrapper">
  <h2>导演 Director</h2>
  <ul class="celebrities-list from-subject __oneline">
    <li class="celebrity">
      <a href="https://movie.douban.com/celebrity/1274476/"><div class="avatar" style="background-image: url(https://img9.doubanio.com/view/celebrity/m/public/p1608880405.jpg)"></div></a>
      <div class="info">
        <span class="name"><a href="https://movie.douban.com/celebrity/1274476/" class="name">杨磊 Lei Yang</a></span>
        <span class="role" title="导演 Director">导演 Director</span>
      </div>
    </li>
  </ul>
</div>
<div class="list-wrapper">
  <h2>演员 Cast</h2>
  <ul class="celebrities-list from-subject __oneline">
    <li class="celebrity">
      <a href="https://www.douban.com/personage/27228768/"><div class="avatar" style="background-image: url(https://img1.doubanio.com/f/movie/celebrity-default-medium.png)"></div></a>
      <div class="info">
        <span class="name"><a href="https://www.douban.com/personage/27228768/" class="name">张鲁一 Luyi Zhang</a></span>
        <span class="role">演员 Actor (饰 史强)</span>
      </div>
    </li>
    <li class="celebrity">
      <div class="info">
        <span class="name"><a href="https://movie.douban.com/celebrity/1313841/" class="name">于和伟 Hewei Yu</a></span>
      </div>
    </li>
    <li class="celebrity">
      <div class="info">
        <span class="name"><a href="https://movie.douban.com/celebrity/1/" class="name">某人</a></span>
        <span class="role">摄影 Cinematography</span>
      </div>
    </li>
  </ul>
</div>
</div></body></html>"#;

    #[test]
    fn parses_roles_and_characters() {
        let p = ResponseParser::new().unwrap();
        let cast = p.parse_celebrities(CAST, &ImageOptions::default());

        assert_eq!(cast.len(), 4);

        assert_eq!(cast[0].name, "杨磊");
        assert_eq!(cast[0].role, PersonRole::Director);
        assert_eq!(cast[0].celebrity_id.as_deref(), Some("1274476"));
        assert_eq!(cast[0].character, "");
        assert_eq!(
            cast[0].image_url.as_deref(),
            Some("https://img2.doubanio.com/view/celebrity/m/public/p1608880405.jpg")
        );

        assert_eq!(cast[1].name, "张鲁一");
        assert_eq!(cast[1].role, PersonRole::Actor);
        assert_eq!(cast[1].character, "史强");
        assert_eq!(cast[1].celebrity_id, None);
        assert_eq!(cast[1].personage_id.as_deref(), Some("27228768"));
        assert_eq!(cast[1].image_url, None);

        // No role line: the section heading decides.
        assert_eq!(cast[2].role, PersonRole::Actor);
        assert_eq!(cast[2].character, "");

        // Unknown label falls back to the heading as well.
        assert_eq!(cast[3].role, PersonRole::Actor);
    }

    #[test]
    fn images_can_be_disabled() {
        let p = ResponseParser::new().unwrap();
        let options = ImageOptions {
            fetch_celebrity_images: false,
            ..ImageOptions::default()
        };
        assert!(p.parse_celebrities(CAST, &options).iter().all(|c| c.image_url.is_none()));
    }

    #[test]
    fn voice_and_multiword_characters() {
        assert_eq!(character_of(&["配音", "Voice", "(配", "蒙奇·D·路飞)"]), "蒙奇·D·路飞");
        assert_eq!(character_of(&["演员", "Actor", "(饰", "Tony", "Stark)"]), "Tony Stark");
        assert_eq!(character_of(&["编剧", "Writer"]), "");
    }

    #[test]
    fn empty_page() {
        let p = ResponseParser::new().unwrap();
        assert!(p.parse_celebrities("<html></html>", &ImageOptions::default()).is_empty());
    }
}
