//! Maps user supplied recipe names onto the one URL the site serves them at.

pub const DEFAULT_BASE_URL: &str = "https://www.budgetbytes.com";

/// Turns recipe names or slugs into canonical source URLs under `base_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canonicalizer {
    base_url: String,
}

impl Default for Canonicalizer {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl Canonicalizer {
    /// A trailing slash on `base_url` is ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `"Slow-Cooker%2DMashed-Potatoes/"` becomes
    /// `"https://www.budgetbytes.com/slow-cooker-mashed-potatoes/"`.
    ///
    /// Never fails: a name with a malformed escape sequence is used as typed.
    /// Repeated escapes and repeated trailing slashes collapse, so `"%252D"`
    /// becomes `-` and `"a//"` becomes `a`.
    pub fn canonicalize(&self, name: &str) -> String {
        format!("{}/{}/", self.base_url, normalize_slug(name))
    }

    /// Slug portion of a URL produced by [`Canonicalizer::canonicalize`].
    pub fn slug<'u>(&self, url: &'u str) -> Option<&'u str> {
        url.strip_prefix(self.base_url.as_str())?
            .strip_prefix('/')?
            .strip_suffix('/')
    }
}

/// Canonical URL for `name` on the default site.
pub fn canonicalize(name: &str) -> String {
    Canonicalizer::default().canonicalize(name)
}

// Repeats the unescape/trim/lowercase pass until nothing changes so that a
// slug which itself still looks escaped or padded ("%252D", "a/ /") settles.
fn normalize_slug(name: &str) -> String {
    let mut current = name.to_string();
    loop {
        let next = normalize_once(&current);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn normalize_once(name: &str) -> String {
    let unescaped = path_unescape(name).unwrap_or_else(|| name.to_string());
    let trimmed = unescaped.trim();
    let trimmed = trimmed.strip_suffix('/').unwrap_or(trimmed);
    trimmed.to_lowercase()
}

/// `None` when `%` is not followed by two hex digits or the bytes are not UTF-8.
fn path_unescape(name: &str) -> Option<String> {
    let bytes = name.as_bytes();
    let well_formed = bytes.iter().enumerate().all(|(i, b)| {
        *b != b'%'
            || (bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit))
    });
    if !well_formed {
        return None;
    }
    urlencoding::decode(name).ok().map(|decoded| decoded.into_owned())
}
