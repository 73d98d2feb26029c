//! Navigation history.
//!
//! # Responsibilities
//! - Encode route locations into hrefs under a history root
//! - Decode host hrefs back into route locations
//! - Track history entries with back/forward traversal
//!
//! # Design Decisions
//! - Hash mode keeps the route after `#`; no server cooperation needed
//! - Path mode uses real paths; the host must serve every sub-path
//! - Root normalization mirrors browser history: leading `/`, no trailing `/`
//! - MemoryHistory stands in for the browser in non-browser hosts

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// History strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryMode {
    /// Entries are encoded after a `#` fragment.
    Hash,
    /// Entries are real paths.
    Path,
}

/// Normalized history root for one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryBase {
    mode: HistoryMode,
    base: String,
}

impl HistoryBase {
    pub fn new(mode: HistoryMode, root: &str) -> Self {
        let root = match root.trim() {
            "" => "/",
            trimmed => trimmed,
        };
        let base = match mode {
            HistoryMode::Hash if !root.contains('#') => format!("{}#", root),
            _ => root.to_string(),
        };
        Self {
            mode,
            base: normalize(&base),
        }
    }

    pub fn mode(&self) -> HistoryMode {
        self.mode
    }

    /// The normalized prefix every href starts with.
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Href for a route location.
    pub fn href(&self, location: &str) -> String {
        format!("{}{}", self.base, location)
    }

    /// Route location for a host href.
    ///
    /// Accepts absolute URLs, origin-relative hrefs, and bare fragments.
    /// Returns `None` when `href` cannot be parsed as a URL reference.
    pub fn route_location(&self, href: &str) -> Option<String> {
        if let Some(fragment) = href.strip_prefix('#') {
            return Some(match self.mode {
                HistoryMode::Hash => self.from_fragment(fragment),
                HistoryMode::Path => "/".to_string(),
            });
        }

        let url = parse_href(href)?;
        let location = match self.mode {
            HistoryMode::Hash => self.from_fragment(url.fragment().unwrap_or("")),
            HistoryMode::Path => {
                let pathname = url.path();
                let path = match strip_prefix_ignore_case(pathname, &self.base) {
                    Some("") => "/",
                    Some(rest) => rest,
                    None => pathname,
                };
                let mut location = ensure_leading_slash(path);
                if let Some(query) = url.query() {
                    location.push('?');
                    location.push_str(query);
                }
                if let Some(fragment) = url.fragment() {
                    location.push('#');
                    location.push_str(fragment);
                }
                location
            }
        };
        Some(location)
    }

    fn from_fragment(&self, fragment: &str) -> String {
        // Anything the base carries after its '#' prefixes every fragment.
        let hash_prefix = self.base.split_once('#').map(|(_, p)| p).unwrap_or("");
        let fragment = fragment.strip_prefix(hash_prefix).unwrap_or(fragment);
        if fragment.is_empty() {
            "/".to_string()
        } else {
            ensure_leading_slash(fragment)
        }
    }
}

fn normalize(base: &str) -> String {
    let mut base = if base.is_empty() {
        "/".to_string()
    } else if base.starts_with('/') || base.starts_with('#') {
        base.to_string()
    } else {
        format!("/{}", base)
    };
    if base.ends_with('/') {
        base.pop();
    }
    base
}

fn ensure_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

fn strip_prefix_ignore_case<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    let head = s.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix).then(|| &s[prefix.len()..])
}

fn parse_href(href: &str) -> Option<Url> {
    match Url::parse(href) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let origin = Url::parse("http://localhost/").ok()?;
            origin.join(href).ok()
        }
        Err(e) => {
            tracing::debug!(href, error = %e, "Unparsable href");
            None
        }
    }
}

/// One history entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    pub key: Uuid,
    pub href: String,
}

impl HistoryEntry {
    fn new(href: String) -> Self {
        Self {
            key: Uuid::new_v4(),
            href,
        }
    }
}

/// A history mechanism the router can drive.
pub trait History {
    /// Href of the current entry.
    fn location(&self) -> &str;

    /// Add an entry after the current one, dropping any forward entries.
    fn push(&mut self, href: String);

    /// Overwrite the current entry.
    fn replace(&mut self, href: String);

    /// Move by `delta` entries. Returns false (and stays put) when the
    /// target is out of range.
    fn go(&mut self, delta: isize) -> bool;

    fn back(&mut self) -> bool {
        self.go(-1)
    }

    fn forward(&mut self) -> bool {
        self.go(1)
    }

    /// Number of entries.
    fn len(&self) -> usize;
}

/// In-process history stack.
#[derive(Debug, Clone)]
pub struct MemoryHistory {
    entries: Vec<HistoryEntry>,
    cursor: usize,
}

impl MemoryHistory {
    pub fn new(initial_href: impl Into<String>) -> Self {
        Self {
            entries: vec![HistoryEntry::new(initial_href.into())],
            cursor: 0,
        }
    }

    pub fn current(&self) -> &HistoryEntry {
        &self.entries[self.cursor]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn position(&self) -> usize {
        self.cursor
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn location(&self) -> &str {
        &self.current().href
    }

    fn push(&mut self, href: String) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push(HistoryEntry::new(href));
        self.cursor = self.entries.len() - 1;
    }

    fn replace(&mut self, href: String) {
        self.entries[self.cursor] = HistoryEntry::new(href);
    }

    fn go(&mut self, delta: isize) -> bool {
        match self.cursor.checked_add_signed(delta) {
            Some(target) if target < self.entries.len() => {
                self.cursor = target;
                true
            }
            _ => false,
        }
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
