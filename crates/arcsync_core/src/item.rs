use bytes::Bytes;

/// Lazily resolved preview image for an archive.
///
/// Items start out `Unresolved` and move to `Resolved` exactly once, when the
/// first successful thumbnail fetch for their id completes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Thumbnail {
    #[default]
    Unresolved,
    Resolved(Bytes),
}

impl Thumbnail {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Thumbnail::Resolved(_))
    }
}

/// A single catalogued archive as presented to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveItem {
    pub id: String,
    pub name: String,
    pub thumbnail: Thumbnail,
}

impl ArchiveItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            thumbnail: Thumbnail::Unresolved,
        }
    }
}
