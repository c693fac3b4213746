use scraper::Html;

use super::{ImageOptions, ResponseParser, attr_of, select_first, text_of};
use crate::types::{ImageKind, RemoteImage};

impl ResponseParser {
    /// Parses one page of a subject photo list.
    ///
    /// With `distinguish_using_aspect_ratio` set, landscape photos become
    /// backdrops and everything else primary; otherwise every photo gets
    /// `kind`. Entries without a photo id are skipped.
    pub fn parse_images(&self, html: &str, kind: ImageKind, options: &ImageOptions) -> Vec<RemoteImage> {
        let document = Html::parse_document(html);
        let cdn = options.cdn_server.trim_end_matches('/');

        document
            .select(&self.sel.photo_items)
            .filter_map(|item| {
                let src = select_first(item, &self.sel.img).and_then(|img| attr_of(img, "src"))?;
                let photo_id = self.photo_id(src)?;

                let (width, height) = select_first(item, &self.sel.photo_prop)
                    .or_else(|| select_first(item, &self.sel.photo_size))
                    .map(text_of)
                    .and_then(|size| {
                        let (w, h) = size.split_once('x')?;
                        Some((w.trim().parse::<u32>().ok()?, h.trim().parse::<u32>().ok()?))
                    })
                    .unwrap_or((0, 0));

                let likes = select_first(item, &self.sel.photo_name)
                    .map(text_of)
                    .and_then(|text| Self::capture_id(&self.re_image_vote, &text))
                    .and_then(|votes| votes.parse::<u32>().ok())
                    .filter(|votes| *votes != 0);

                let kind = if !options.distinguish_using_aspect_ratio {
                    kind
                } else if width > height {
                    ImageKind::Backdrop
                } else {
                    ImageKind::Primary
                };

                Some(RemoteImage {
                    url: format!("{cdn}/view/photo/l/public/{photo_id}.jpg"),
                    thumbnail_url: format!("{cdn}/view/photo/s/public/{photo_id}.jpg"),
                    width,
                    height,
                    kind,
                    likes,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PHOTOS: &str = r#"<html><body><div class="article"><ul class="poster-col3 clearfix">
<li data-id="2886492021">
  <div class="cover"><a href="https://movie.douban.com/photos/photo/2886492021/"><img src="https://img9.doubanio.com/view/photo/m/public/p2886492021.webp"></a></div>
  <div class="prop">1080x1500</div>
  <div class="name">海报 <a href="https://movie.douban.com/photos/photo/2886492021/">12回应</a></div>
</li>
<li data-id="2886492022">
  <div class="cover"><img src="https://img9.doubanio.com/view/photo/m/public/p2886492022.jpg"></div>
  <div class="size">1920x1080</div>
</li>
<li><div class="cover"><img src="https://img9.doubanio.com/f/movie/pics/blank.gif"></div></li>
</ul></div></body></html>"#;

    #[test]
    fn classifies_by_aspect_ratio() {
        let p = ResponseParser::new().unwrap();
        let images = p.parse_images(PHOTOS, ImageKind::Primary, &ImageOptions::default());

        assert_eq!(images.len(), 2);
        assert_eq!(images[0].url, "https://img2.doubanio.com/view/photo/l/public/p2886492021.jpg");
        assert_eq!(images[0].thumbnail_url, "https://img2.doubanio.com/view/photo/s/public/p2886492021.jpg");
        assert_eq!((images[0].width, images[0].height), (1080, 1500));
        assert_eq!(images[0].kind, ImageKind::Primary);
        assert_eq!(images[0].likes, Some(12));

        assert_eq!(images[1].kind, ImageKind::Backdrop);
        assert_eq!(images[1].likes, None);
    }

    #[test]
    fn fixed_kind_without_aspect_ratio() {
        let p = ResponseParser::new().unwrap();
        let options = ImageOptions {
            distinguish_using_aspect_ratio: false,
            cdn_server: "https://img1.doubanio.com/".into(),
            ..ImageOptions::default()
        };
        let images = p.parse_images(PHOTOS, ImageKind::Backdrop, &options);

        assert!(images.iter().all(|i| i.kind == ImageKind::Backdrop));
        assert!(images[0].url.starts_with("https://img1.doubanio.com/view/"));
    }
}
