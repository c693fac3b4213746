use serde::{Deserialize, Serialize};

/// How the host should use an image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageKind {
    #[default]
    Primary,
    Backdrop,
}

/// Photo list category of a subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhotoCategory {
    /// Posters (`type=R`).
    Poster,
    /// Wallpapers (`type=W`).
    Wallpaper,
    /// Stage photos (`type=S`).
    Still,
}

impl PhotoCategory {
    /// The `type` query parameter of the photo list endpoint.
    pub fn code(self) -> &'static str {
        match self {
            Self::Poster => "R",
            Self::Wallpaper => "W",
            Self::Still => "S",
        }
    }

    /// Image kind assumed when aspect-ratio classification is disabled.
    pub fn default_kind(self) -> ImageKind {
        match self {
            Self::Poster => ImageKind::Primary,
            Self::Wallpaper | Self::Still => ImageKind::Backdrop,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteImage {
    pub url: String,
    pub thumbnail_url: String,
    pub width: u32,
    pub height: u32,
    pub kind: ImageKind,
    /// Like count, `None` when the photo has none.
    pub likes: Option<u32>,
}
