use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Longest slug ever produced, in bytes (slugs are ASCII).
pub const MAX_SLUG_LEN: usize = 40;

/// Reduce a human-readable name to a filesystem-safe identifier.
///
/// Diacritics are stripped after NFD decomposition, the result is lowercased,
/// every run of characters outside `[a-z0-9]` collapses to a single `-`,
/// leading/trailing hyphens are trimmed and the output is then capped at
/// [`MAX_SLUG_LEN`] characters.
///
/// # Examples
///
/// ```
/// use multi_claude::utils::slug::slugify;
///
/// assert_eq!(slugify("My Work Account"), "my-work-account");
/// assert_eq!(slugify("Café  Crème!"), "cafe-creme");
/// assert_eq!(slugify("--"), "");
/// ```
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.nfd().filter(|c| !is_combining_mark(*c)) {
        let c = c.to_ascii_lowercase();
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    // Capped after trimming, so a cut right after a separator keeps it
    slug.truncate(MAX_SLUG_LEN);
    slug
}

/// Directory name for an installation: `<id>-<slug(name)>`, or just the id
/// when the name has no sluggable characters.
pub fn compute_dir_name(id: &str, name: &str) -> String {
    let slug = slugify(name);
    if slug.is_empty() {
        id.to_string()
    } else {
        format!("{}-{}", id, slug)
    }
}

/// Eight hex characters taken from a fresh v4 UUID.
pub fn generate_short_id() -> String {
    short_id_from(&uuid::Uuid::new_v4().to_string())
}

/// Shorten an existing (possibly hyphenated) id to its first eight
/// non-hyphen characters.
pub fn short_id_from(id: &str) -> String {
    id.chars().filter(|c| *c != '-').take(8).collect()
}
