use douban_meta_core::{IMDB_ID, LookupKind, LookupQuery};

use super::TitleResolver;

impl TitleResolver {
    /// Ordered, de-duplicated search keywords for `query`.
    ///
    /// Episodes use the anime title of the file name, then the containing
    /// folder. Everything else uses, in order: its IMDb id, the series IMDb
    /// id (first seasons only), `"{name} {year}"`, the name,
    /// `"{original} {year}"`, the original title, a synthesized
    /// `"{base} 第{N}季"` (later seasons only), the file name and its anime
    /// title.
    ///
    /// `parent_name` is the resolved parent series name; it is preferred
    /// over the local names as the base of the synthesized season keyword.
    /// Placeholder season labels such as `第 2 季` never become keywords of
    /// a season or episode lookup.
    pub fn candidate_names(&self, query: &LookupQuery, parent_name: Option<&str>) -> Vec<String> {
        let mut names = Candidates::default();
        let file_names = self.seasons.file_names();

        if let LookupKind::Episode { .. } = query.kind {
            if let Some(title) = query.file_name().and_then(|f| file_names.anime_title(f)) {
                names.push(title);
            }
            if let Some(folder) = query.parent_folder_name() {
                names.push(folder);
            }
            return self.finish(query, names);
        }

        let first_season = self.wants_first_season(query);

        if let Some(imdb) = query.provider_ids.get(IMDB_ID) {
            names.push(imdb);
        }
        if first_season {
            if let Some(imdb) = query.series_ids().and_then(|ids| ids.get(IMDB_ID)) {
                names.push(imdb);
            }
        }

        names.push_with_year(&query.name, query.year);
        if let Some(original) = query.original_title.as_deref() {
            names.push_with_year(original, query.year);
        }

        if let LookupKind::Season { series_name, .. } = &query.kind {
            if !first_season {
                let base = parent_name
                    .or(series_name.as_deref())
                    .unwrap_or(&query.name);
                if !self.seasons.strip_season(base).is_empty() {
                    names.push(self.seasons.replace_season_index_with(base, self.season_index(query)));
                }
            }
        }

        if let Some(file_name) = query.file_name() {
            names.push(file_name);
            if let Some(title) = file_names.anime_title(file_name) {
                names.push(title);
            }
        }

        self.finish(query, names)
    }

    /// The candidate itself, then the cleaned and anime-title forms of the
    /// query's display name.
    pub(super) fn keyword_variants(&self, query: &LookupQuery, candidate: &str) -> Vec<String> {
        let file_names = self.seasons.file_names();
        let base = candidate.replace('.', " ");
        let base = base.split_whitespace().collect::<Vec<_>>().join(" ");

        let mut variants = Candidates::default();
        variants.push(base.as_str());
        if let Some(cleaned) = file_names.clean_name(&query.name) {
            variants.push(cleaned);
        }
        if let Some(title) = file_names.anime_title(&query.name) {
            variants.push(title);
        }
        self.finish(query, variants)
    }

    fn finish(&self, query: &LookupQuery, names: Candidates) -> Vec<String> {
        match query.kind {
            LookupKind::Season { .. } | LookupKind::Episode { .. } => {
                names.into_vec(|name| !self.seasons.is_placeholder_season_name(name))
            }
            _ => names.into_vec(|_| true),
        }
    }
}

/// Insertion-ordered keyword list with exact-string de-duplication.
#[derive(Debug, Default)]
struct Candidates(Vec<String>);

impl Candidates {
    fn push(&mut self, name: impl AsRef<str>) {
        let name = name.as_ref().trim();
        if !name.is_empty() && !self.0.iter().any(|n| n == name) {
            self.0.push(name.to_string());
        }
    }

    fn push_with_year(&mut self, name: &str, year: Option<u16>) {
        if let Some(year) = year.filter(|_| !name.trim().is_empty()) {
            self.push(format!("{} {year}", name.trim()));
        }
        self.push(name);
    }

    fn into_vec(self, keep: impl Fn(&str) -> bool) -> Vec<String> {
        self.0.into_iter().filter(|name| keep(name)).collect()
    }
}
