use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A date known to year, month, or day granularity.
///
/// Person pages give birth and death dates as `1965`, `1965-04` or
/// `1965-04-04` (sometimes `1965年4月4日`). The granularity is kept so that
/// callers can tell a known January 1st from an unknown day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PartialDate {
    pub year: i32,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl PartialDate {
    /// Parses the first date-like run of digits in `text`.
    ///
    /// Returns `None` when no four-digit year leads the text or when the
    /// month/day parts do not form a real calendar date.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text
            .split(|c: char| !c.is_ascii_digit())
            .filter(|p| !p.is_empty());

        let year_part = parts.next()?;
        if year_part.len() != 4 {
            return None;
        }
        let year: i32 = year_part.parse().ok()?;
        let month: Option<u32> = parts.next().and_then(|p| p.parse().ok());
        let day: Option<u32> = match month {
            Some(_) => parts.next().and_then(|p| p.parse().ok()),
            None => None,
        };

        let date = Self { year, month, day };
        date.to_naive_date().map(|_| date)
    }

    /// Converts to a calendar date, filling missing parts with 1.
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month.unwrap_or(1), self.day.unwrap_or(1))
    }
}

impl fmt::Display for PartialDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.year)?;
        if let Some(month) = self.month {
            write!(f, "-{month:02}")?;
            if let Some(day) = self.day {
                write!(f, "-{day:02}")?;
            }
        }
        Ok(())
    }
}

/// A person record from the celebrity or personage pages.
///
/// `Default` is the not-found sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonSubject {
    /// Id in the legacy celebrity space (`/celebrity/{cid}/`).
    pub celebrity_id: Option<String>,
    /// Id in the personage space (`/personage/{pid}/`).
    pub personage_id: Option<String>,
    pub name: String,
    pub original_name: Option<String>,
    pub poster_url: Option<String>,
    pub gender: Option<String>,
    pub birth_date: Option<PartialDate>,
    pub death_date: Option<PartialDate>,
    pub birthplace: Option<String>,
    pub website: Option<String>,
    pub imdb_id: Option<String>,
    pub intro: Option<String>,
}

impl PersonSubject {
    pub fn is_found(&self) -> bool {
        let has = |id: &Option<String>| id.as_deref().is_some_and(|id| !id.is_empty());
        has(&self.celebrity_id) || has(&self.personage_id)
    }
}

/// Credit category of a cast member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PersonRole {
    Director,
    Actor,
    Writer,
    Producer,
    Composer,
    Arranger,
}

impl PersonRole {
    /// Maps a catalog credit label. Voice actors count as actors.
    pub fn from_label(label: &str) -> Option<Self> {
        Some(match label {
            "导演" => Self::Director,
            "演员" | "配音" => Self::Actor,
            "编剧" | "脚本" | "剧本" => Self::Writer,
            "制片人" | "制作人" => Self::Producer,
            "作曲" | "音乐" => Self::Composer,
            "编曲" => Self::Arranger,
            _ => return None,
        })
    }
}

/// One credited person of a subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastMember {
    pub name: String,
    pub celebrity_id: Option<String>,
    /// Set when the cast page links the newer `/personage/` page.
    pub personage_id: Option<String>,
    pub role: PersonRole,
    /// Character played or voiced, empty for crew.
    pub character: String,
    pub image_url: Option<String>,
}
