//! Route pattern matching.
//!
//! # Responsibilities
//! - Parse path patterns (`/call`, `/call/:callId`, `/call/:callId?`)
//! - Match a route path and bind named parameters
//! - Build a concrete path back from bound parameters
//!
//! # Design Decisions
//! - Static segments compare ASCII case-insensitively
//! - One trailing slash is tolerated on the matched path
//! - Only the last segment may be an optional parameter
//! - Static segments are limited to characters a URL keeps verbatim
//! - No regex; matching is a single segment walk

use std::collections::BTreeMap;
use std::fmt;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Parameters bound by a matched pattern.
pub type Params = BTreeMap<String, String>;

/// Characters escaped when a parameter value is written into a path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Error parsing a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatternError {
    #[error("pattern '{0}' must start with '/'")]
    MissingLeadingSlash(String),
    #[error("pattern '{0}' contains an empty segment")]
    EmptySegment(String),
    #[error("invalid parameter name '{name}' in pattern '{pattern}'")]
    InvalidParamName { pattern: String, name: String },
    #[error("parameter '{name}' appears twice in pattern '{pattern}'")]
    DuplicateParam { pattern: String, name: String },
    #[error("optional parameter '{name}' must be the last segment of '{pattern}'")]
    MisplacedOptional { pattern: String, name: String },
    #[error("segment '{segment}' of pattern '{pattern}' is not a literal URL path segment")]
    InvalidLiteral { pattern: String, segment: String },
}

/// Error building a path from parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("missing required parameter '{0}'")]
    MissingParam(String),
}

/// One segment of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Static(String),
    Param { name: String, optional: bool },
}

/// Shape position used for collision checks: a static literal (lowercased)
/// or any parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ShapePart {
    Static(String),
    Param,
}

/// A parsed route path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let Some(rest) = pattern.strip_prefix('/') else {
            return Err(PatternError::MissingLeadingSlash(pattern.to_string()));
        };

        let rest = rest.strip_suffix('/').unwrap_or(rest);
        let mut segments = Vec::new();
        if !rest.is_empty() {
            for raw in rest.split('/') {
                if raw.is_empty() {
                    return Err(PatternError::EmptySegment(pattern.to_string()));
                }
                segments.push(Self::parse_segment(pattern, raw)?);
            }
        }

        let mut seen = Vec::new();
        let last = segments.len().saturating_sub(1);
        for (i, segment) in segments.iter().enumerate() {
            if let Segment::Param { name, optional } = segment {
                if seen.contains(&name) {
                    return Err(PatternError::DuplicateParam {
                        pattern: pattern.to_string(),
                        name: name.clone(),
                    });
                }
                if *optional && i != last {
                    return Err(PatternError::MisplacedOptional {
                        pattern: pattern.to_string(),
                        name: name.clone(),
                    });
                }
                seen.push(name);
            }
        }

        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    fn parse_segment(pattern: &str, raw: &str) -> Result<Segment, PatternError> {
        let Some(param) = raw.strip_prefix(':') else {
            if !is_literal_segment(raw) {
                return Err(PatternError::InvalidLiteral {
                    pattern: pattern.to_string(),
                    segment: raw.to_string(),
                });
            }
            return Ok(Segment::Static(raw.to_string()));
        };
        let (name, optional) = match param.strip_suffix('?') {
            Some(name) => (name, true),
            None => (param, false),
        };
        if !is_identifier(name) {
            return Err(PatternError::InvalidParamName {
                pattern: pattern.to_string(),
                name: name.to_string(),
            });
        }
        Ok(Segment::Param {
            name: name.to_string(),
            optional,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of all parameters, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param { name, .. } => Some(name.as_str()),
            Segment::Static(_) => None,
        })
    }

    /// Names of parameters that must be bound to build a path.
    pub fn required_params(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param {
                name,
                optional: false,
            } => Some(name.as_str()),
            _ => None,
        })
    }

    pub fn has_params(&self) -> bool {
        self.param_names().next().is_some()
    }

    /// Every concrete shape this pattern can match. A trailing optional
    /// parameter contributes a shape with and one without it.
    pub fn shapes(&self) -> Vec<Vec<ShapePart>> {
        let full: Vec<ShapePart> = self
            .segments
            .iter()
            .map(|s| match s {
                Segment::Static(lit) => ShapePart::Static(lit.to_ascii_lowercase()),
                Segment::Param { .. } => ShapePart::Param,
            })
            .collect();

        match self.segments.last() {
            Some(Segment::Param { optional: true, .. }) => {
                let short = full[..full.len() - 1].to_vec();
                vec![short, full]
            }
            _ => vec![full],
        }
    }

    /// Match a route path (no query or fragment).
    pub fn matches(&self, path: &str) -> Option<Params> {
        let rest = path.strip_prefix('/')?;
        let rest = rest.strip_suffix('/').unwrap_or(rest);
        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };

        let min = self.required_len();
        if parts.len() < min || parts.len() > self.segments.len() {
            return None;
        }

        let mut params = Params::new();
        for (segment, part) in self.segments.iter().zip(parts.iter()) {
            match segment {
                Segment::Static(lit) => {
                    if !lit.eq_ignore_ascii_case(part) {
                        return None;
                    }
                }
                Segment::Param { name, .. } => {
                    if part.is_empty() {
                        return None;
                    }
                    let value = percent_decode_str(part).decode_utf8().ok()?;
                    params.insert(name.clone(), value.into_owned());
                }
            }
        }
        Some(params)
    }

    /// Ranking key: statics outrank parameters position by position.
    pub fn specificity(&self) -> Vec<u8> {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Static(_) => 2,
                Segment::Param { .. } => 1,
            })
            .collect()
    }

    /// Build a concrete path from `params`.
    pub fn build(&self, params: &Params) -> Result<String, BuildError> {
        let mut path = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Static(lit) => {
                    path.push('/');
                    path.push_str(lit);
                }
                Segment::Param { name, optional } => match params.get(name) {
                    Some(value) if !value.is_empty() => {
                        path.push('/');
                        path.extend(utf8_percent_encode(value, SEGMENT));
                    }
                    _ if *optional => {}
                    _ => return Err(BuildError::MissingParam(name.clone())),
                },
            }
        }
        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }

    fn required_len(&self) -> usize {
        match self.segments.last() {
            Some(Segment::Param { optional: true, .. }) => self.segments.len() - 1,
            _ => self.segments.len(),
        }
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.source)
    }
}

/// Unreserved and sub-delimiter characters only, and never a dot segment.
/// Anything else is rewritten by URL parsing and would not match back.
fn is_literal_segment(raw: &str) -> bool {
    raw != "."
        && raw != ".."
        && raw
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"-._~!$&'()*+,;=:@".contains(&b))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_pattern() {
        let pattern = PathPattern::parse("/call").unwrap();
        assert_eq!(pattern.matches("/call"), Some(Params::new()));
        assert_eq!(pattern.matches("/call/"), Some(Params::new()));
        assert_eq!(pattern.matches("/CALL"), Some(Params::new())); // Case insensitive
        assert_eq!(pattern.matches("/call/abc"), None);
        assert_eq!(pattern.matches("/button"), None);
        assert_eq!(pattern.matches("call"), None);
    }

    #[test]
    fn test_param_binding() {
        let pattern = PathPattern::parse("/call/:callId").unwrap();
        let params = pattern.matches("/call/abc123").unwrap();
        assert_eq!(params.get("callId").map(String::as_str), Some("abc123"));
        assert_eq!(pattern.matches("/call"), None);
        assert_eq!(pattern.matches("/call//"), None);
        assert_eq!(pattern.matches("/call/a/b"), None);
    }

    #[test]
    fn test_optional_param() {
        let pattern = PathPattern::parse("/call/:callId?").unwrap();
        assert_eq!(pattern.matches("/call"), Some(Params::new()));
        let params = pattern.matches("/call/XyZ").unwrap();
        assert_eq!(params["callId"], "XyZ"); // Param keeps case
        assert_eq!(pattern.shapes().len(), 2);
    }

    #[test]
    fn test_param_is_percent_decoded() {
        let pattern = PathPattern::parse("/call/:callId").unwrap();
        let params = pattern.matches("/call/a%20b%2Fc").unwrap();
        assert_eq!(params["callId"], "a b/c");
    }

    #[test]
    fn test_build_round_trip() {
        let pattern = PathPattern::parse("/call/:callId?").unwrap();
        let mut params = Params::new();
        assert_eq!(pattern.build(&params).unwrap(), "/call");

        params.insert("callId".into(), "a b/c".into());
        let path = pattern.build(&params).unwrap();
        assert_eq!(path, "/call/a%20b%2Fc");
        assert_eq!(pattern.matches(&path), Some(params));
    }

    #[test]
    fn test_build_missing_required() {
        let pattern = PathPattern::parse("/call/:callId").unwrap();
        assert_eq!(
            pattern.build(&Params::new()),
            Err(BuildError::MissingParam("callId".into()))
        );
    }

    #[test]
    fn test_root_pattern() {
        let pattern = PathPattern::parse("/").unwrap();
        assert_eq!(pattern.matches("/"), Some(Params::new()));
        assert_eq!(pattern.build(&Params::new()).unwrap(), "/");
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(
            PathPattern::parse("call"),
            Err(PatternError::MissingLeadingSlash(_))
        ));
        assert!(matches!(
            PathPattern::parse("/call//x"),
            Err(PatternError::EmptySegment(_))
        ));
        assert!(matches!(
            PathPattern::parse("/call/:1d"),
            Err(PatternError::InvalidParamName { .. })
        ));
        assert!(matches!(
            PathPattern::parse("/:a/:a"),
            Err(PatternError::DuplicateParam { .. })
        ));
        assert!(matches!(
            PathPattern::parse("/:a?/b"),
            Err(PatternError::MisplacedOptional { .. })
        ));
    }

    #[test]
    fn test_literal_must_survive_url_parsing() {
        for pattern in ["/a b", "/call?x", "/call/#top", "/50%", "/caf\u{e9}", "/call/..", "/./call"] {
            assert!(
                matches!(PathPattern::parse(pattern), Err(PatternError::InvalidLiteral { .. })),
                "{} should be rejected",
                pattern
            );
        }
        let pattern = PathPattern::parse("/v1.2/call-log_~/a=b").unwrap();
        assert_eq!(pattern.build(&Params::new()).unwrap(), "/v1.2/call-log_~/a=b");
    }
}
