pub mod image;
pub mod person;
pub mod query;
pub mod release;
pub mod subject;

use std::collections::BTreeMap;

pub use image::{ImageKind, PhotoCategory, RemoteImage};
pub use person::{CastMember, PartialDate, PersonRole, PersonSubject};
pub use query::{LookupKind, LookupQuery};
pub use release::FileNameInfo;
pub use subject::{EpisodeSubject, MovieSubject, SearchResult, SeasonOutcome, SubjectType};

/// Provider key to opaque identifier, as stored by the host library.
pub type ProviderIds = BTreeMap<String, String>;

/// Current provider key for catalog subject ids.
pub const PROVIDER_ID: &str = "DoubanID";
/// Legacy spelling of [`PROVIDER_ID`] written by older releases.
pub const PROVIDER_ID_LEGACY: &str = "Douban ID";
/// Key used by the OpenDouban provider for the same subject id space.
pub const PROVIDER_ID_OPEN_DOUBAN: &str = "OpenDoubanID";
/// Current provider key for personage ids.
pub const PERSONAGE_ID: &str = "DoubanPersonageID";
/// Legacy spelling of [`PERSONAGE_ID`].
pub const PERSONAGE_ID_LEGACY: &str = "Douban Personage ID";
/// External IMDb identifier key.
pub const IMDB_ID: &str = "Imdb";

/// Subject id keys, tried in this order.
pub const SUBJECT_ID_KEYS: [&str; 3] = [PROVIDER_ID, PROVIDER_ID_LEGACY, PROVIDER_ID_OPEN_DOUBAN];

/// Personage id keys, tried in this order.
pub const PERSONAGE_ID_KEYS: [&str; 2] = [PERSONAGE_ID, PERSONAGE_ID_LEGACY];
