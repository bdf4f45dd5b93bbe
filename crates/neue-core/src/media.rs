//! Media renditions and best-fit selection.

/// A single rendition of a media object (one size of an image, a video file, a poster).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Media {
    /// Location of the rendition.
    pub url: String,
    /// MIME type, when the upstream reports one.
    pub mime_type: Option<String>,
    /// Width in pixels (0 when unknown).
    pub width: u32,
    /// Height in pixels (0 when unknown).
    pub height: u32,
    /// Whether this rendition carries the dimensions of the original upload.
    pub has_original_dimensions: bool,
}

impl Media {
    /// Create a rendition with known dimensions.
    pub fn new(url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            url: url.into(),
            mime_type: None,
            width,
            height,
            has_original_dimensions: false,
        }
    }

    /// Set the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Mark this rendition as carrying the original dimensions.
    pub fn original(mut self) -> Self {
        self.has_original_dimensions = true;
        self
    }

    /// Whether this rendition is an animated GIF.
    pub fn is_gif(&self) -> bool {
        self.mime_type.as_deref() == Some("image/gif")
    }
}

/// Ordered list of renditions of the same media object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct MediaList(Vec<Media>);

impl MediaList {
    /// Create a media list from renditions, keeping their order.
    pub fn new(media: Vec<Media>) -> Self {
        Self(media)
    }

    /// Renditions in upstream order.
    pub fn as_slice(&self) -> &[Media] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &Media> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First rendition, if any.
    pub fn first(&self) -> Option<&Media> {
        self.0.first()
    }

    /// Dimensions of the first rendition flagged as original.
    pub fn original_dimensions(&self) -> Option<(u32, u32)> {
        self.0
            .iter()
            .find(|m| m.has_original_dimensions)
            .map(|m| (m.width, m.height))
    }

    /// Pick the widest rendition that is no wider than `target_width`.
    ///
    /// When every rendition is wider than the target, the narrowest one is
    /// returned instead. Ties keep the earliest rendition. Returns `None`
    /// only for an empty list.
    pub fn pick_one_size(&self, target_width: u32) -> Option<&Media> {
        let mut best: Option<&Media> = None;
        for media in self.0.iter().filter(|m| m.width <= target_width) {
            if best.is_none_or(|b| media.width > b.width) {
                best = Some(media);
            }
        }
        if best.is_some() {
            return best;
        }

        let mut smallest: Option<&Media> = None;
        for media in &self.0 {
            if smallest.is_none_or(|s| media.width < s.width) {
                smallest = Some(media);
            }
        }
        smallest
    }
}

impl From<Vec<Media>> for MediaList {
    fn from(media: Vec<Media>) -> Self {
        Self(media)
    }
}

impl<'a> IntoIterator for &'a MediaList {
    type Item = &'a Media;
    type IntoIter = std::slice::Iter<'a, Media>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
