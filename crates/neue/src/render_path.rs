//! File names for rendered thread images.
//!
//! A render file name is `{blog}-{id}.{ext}`, or
//! `{blog}-{id}.{modifiers}.{ext}` where `modifiers` is a sorted,
//! comma-separated subset of [`MODIFIERS`]. Sorting makes names for the same
//! request stack identically regardless of the order modifiers were given.

/// Modifiers a render can be requested with.
pub const MODIFIERS: &[&str] = &["dark", "unroll", "oldstyle"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderPathError {
    #[error("invalid render modifier `{0}`")]
    InvalidModifier(String),

    #[error("malformed render filename `{0}`")]
    MalformedFilename(String),
}

/// A render file name split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderName {
    pub blog_name: String,
    pub post_id: String,
    pub extension: String,
    /// Sorted.
    pub modifiers: Vec<String>,
}

impl RenderName {
    /// Format back into a normalized file name.
    pub fn filename(&self) -> Result<String, RenderPathError> {
        filename_for(&self.blog_name, &self.post_id, &self.extension, &self.modifiers)
    }
}

/// File name for a render of `blog_name`/`post_id`.
pub fn filename_for<S: AsRef<str>>(
    blog_name: &str,
    post_id: &str,
    extension: &str,
    modifiers: &[S],
) -> Result<String, RenderPathError> {
    if modifiers.is_empty() {
        return Ok(format!("{blog_name}-{post_id}.{extension}"));
    }
    let mut sorted = Vec::with_capacity(modifiers.len());
    for modifier in modifiers {
        let modifier = modifier.as_ref();
        check_modifier(modifier)?;
        sorted.push(modifier);
    }
    sorted.sort_unstable();
    Ok(format!(
        "{blog_name}-{post_id}.{}.{extension}",
        sorted.join(",")
    ))
}

/// Split a render file name into its parts.
///
/// The blog name is everything before the last `-`, since blog names may
/// themselves contain dashes.
pub fn from_filename(filename: &str) -> Result<RenderName, RenderPathError> {
    let malformed = || RenderPathError::MalformedFilename(filename.to_string());

    let (blog_name, rest) = filename.rsplit_once('-').ok_or_else(malformed)?;
    let parts: Vec<&str> = rest.split('.').collect();
    let (post_id, modifiers, extension) = match parts.as_slice() {
        [post_id, extension] => (*post_id, Vec::new(), *extension),
        [post_id, modifiers, extension] => {
            let mut modifiers: Vec<String> =
                modifiers.split(',').map(str::to_string).collect();
            modifiers.sort_unstable();
            (*post_id, modifiers, *extension)
        }
        _ => return Err(malformed()),
    };
    for modifier in &modifiers {
        check_modifier(modifier).map_err(|_| malformed())?;
    }

    Ok(RenderName {
        blog_name: blog_name.to_string(),
        post_id: post_id.to_string(),
        extension: extension.to_string(),
        modifiers,
    })
}

/// Re-format a render file name with its modifiers sorted.
pub fn normalize_filename(filename: &str) -> Result<String, RenderPathError> {
    from_filename(filename)?.filename()
}

fn check_modifier(modifier: &str) -> Result<(), RenderPathError> {
    if MODIFIERS.contains(&modifier) {
        Ok(())
    } else {
        Err(RenderPathError::InvalidModifier(modifier.to_string()))
    }
}
