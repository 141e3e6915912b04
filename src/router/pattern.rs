use crate::router::error::RouterError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment {
    /// A literal path component, e.g. `users`.
    Literal(String),
    /// A named parameter, e.g. `:id` captures as `"id"`.
    Parameter(String),
    /// A trailing catch-all, e.g. `*rest`. Only valid as the final
    /// segment.
    Wildcard(String),
}

/// A compiled route pattern, e.g. `/users/:id/posts/*rest`.
///
/// Match precedence, applied segment by segment: a literal segment always
/// wins over a parameter at the same position, which always wins over a
/// wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    pub(crate) segments: Vec<Segment>,
    source: String,
}

impl Pattern {
    /// Compile a route pattern string. Segments are separated by `/`;
    /// empty path (`""` or `"/"`) compiles to a single empty-segment
    /// route. A segment starting with `:` is a parameter; one starting
    /// with `*` is a wildcard and must be the last segment.
    pub fn compile(pattern: &str) -> Result<Self, RouterError> {
        let trimmed = pattern.trim_matches('/');
        let mut segments = Vec::new();

        if !trimmed.is_empty() {
            let parts: Vec<&str> = trimmed.split('/').collect();
            for (i, part) in parts.iter().enumerate() {
                if part.is_empty() {
                    return Err(RouterError::InvalidPattern(pattern.to_string()));
                }
                let segment = if let Some(name) = part.strip_prefix(':') {
                    if name.is_empty() {
                        return Err(RouterError::InvalidPattern(pattern.to_string()));
                    }
                    Segment::Parameter(name.to_string())
                } else if let Some(name) = part.strip_prefix('*') {
                    if name.is_empty() || i + 1 != parts.len() {
                        return Err(RouterError::InvalidPattern(pattern.to_string()));
                    }
                    Segment::Wildcard(name.to_string())
                } else {
                    Segment::Literal(part.to_string())
                };
                segments.push(segment);
            }
        }

        Ok(Self {
            segments,
            source: pattern.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Whether this pattern's final segment is a wildcard.
    pub(crate) fn ends_in_wildcard(&self) -> bool {
        matches!(self.segments.last(), Some(Segment::Wildcard(_)))
    }

    /// Concatenate `self` as a path prefix ahead of `suffix`, producing the
    /// pattern a nested router's route would have if flattened into its
    /// parent. `self` must not end in a wildcard (checked at mount time).
    pub(crate) fn concat(&self, suffix: &Pattern) -> Pattern {
        let mut segments = self.segments.clone();
        segments.extend(suffix.segments.clone());
        let prefix = self.source.trim_end_matches('/');
        let rest = suffix.source.trim_start_matches('/');
        let source = if rest.is_empty() {
            prefix.to_string()
        } else {
            format!("{prefix}/{rest}")
        };
        Pattern { segments, source }
    }

    /// A specificity score used to order candidate matches: each literal
    /// segment scores highest, each parameter scores lower, and a
    /// trailing wildcard scores lowest.
    pub(crate) fn specificity(&self) -> Vec<u8> {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(_) => 2,
                Segment::Parameter(_) => 1,
                Segment::Wildcard(_) => 0,
            })
            .collect()
    }

    /// Attempt to match `path` against this pattern in full, returning the
    /// captured parameters on success.
    pub(crate) fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
        let trimmed = path.trim_matches('/');
        let input: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        let mut captures = Vec::new();
        let mut i = 0;
        for segment in &self.segments {
            match segment {
                Segment::Wildcard(name) => {
                    let rest = input.get(i..).unwrap_or(&[]).join("/");
                    captures.push((name.clone(), rest));
                    return Some(captures);
                }
                Segment::Literal(lit) => {
                    if input.get(i) != Some(&lit.as_str()) {
                        return None;
                    }
                    i += 1;
                }
                Segment::Parameter(name) => {
                    let value = input.get(i)?;
                    captures.push((name.clone(), value.to_string()));
                    i += 1;
                }
            }
        }
        if i == input.len() {
            Some(captures)
        } else {
            None
        }
    }

    /// Match this pattern as a prefix of `path`: every segment of the
    /// pattern must consume a leading segment of `path`, but trailing
    /// segments beyond the pattern's own length are left unconsumed and
    /// returned as the remainder. Used by `use` middleware and
    /// nested-router mount points, both of which apply to a path and
    /// everything beneath it.
    pub(crate) fn match_prefix(&self, path: &str) -> Option<(Vec<(String, String)>, String)> {
        let trimmed = path.trim_start_matches('/');
        let input: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        let mut captures = Vec::new();
        let mut i = 0;
        for segment in &self.segments {
            match segment {
                Segment::Wildcard(name) => {
                    let rest = input.get(i..).unwrap_or(&[]).join("/");
                    captures.push((name.clone(), rest));
                    return Some((captures, String::new()));
                }
                Segment::Literal(lit) => {
                    if input.get(i) != Some(&lit.as_str()) {
                        return None;
                    }
                    i += 1;
                }
                Segment::Parameter(name) => {
                    let value = input.get(i)?;
                    captures.push((name.clone(), value.to_string()));
                    i += 1;
                }
            }
        }
        let remainder = input.get(i..).unwrap_or(&[]).join("/");
        Some((captures, remainder))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_pattern_matches_exact_path() {
        let p = Pattern::compile("/users/all").unwrap();
        assert_eq!(p.matches("/users/all"), Some(vec![]));
        assert_eq!(p.matches("/users/other"), None);
    }

    #[test]
    fn parameter_pattern_captures_segment() {
        let p = Pattern::compile("/users/:id").unwrap();
        assert_eq!(
            p.matches("/users/42"),
            Some(vec![("id".to_string(), "42".to_string())])
        );
    }

    #[test]
    fn wildcard_pattern_captures_remainder() {
        let p = Pattern::compile("/static/*path").unwrap();
        assert_eq!(
            p.matches("/static/css/app.css"),
            Some(vec![("path".to_string(), "css/app.css".to_string())])
        );
    }

    #[test]
    fn wildcard_must_be_final_segment() {
        assert!(Pattern::compile("/*rest/more").is_err());
    }

    #[test]
    fn deep_paths_are_not_rejected_by_pattern_compile() {
        let long: String = (0..40)
            .map(|i| format!("/s{i}"))
            .collect::<Vec<_>>()
            .join("");
        assert!(Pattern::compile(&long).is_ok());
    }

    #[test]
    fn specificity_ranks_literal_over_parameter_over_wildcard() {
        let literal = Pattern::compile("/users/all").unwrap().specificity();
        let param = Pattern::compile("/users/:id").unwrap().specificity();
        let wildcard = Pattern::compile("/users/*rest").unwrap().specificity();
        assert!(literal > param);
        assert!(param > wildcard);
    }

    #[test]
    fn match_prefix_leaves_remainder_unconsumed() {
        let p = Pattern::compile("/api").unwrap();
        let (captures, remainder) = p.match_prefix("/api/users/42").unwrap();
        assert!(captures.is_empty());
        assert_eq!(remainder, "users/42");
        assert!(p.match_prefix("/other").is_none());
    }

    #[test]
    fn concat_joins_segments_and_source() {
        let prefix = Pattern::compile("/api").unwrap();
        let suffix = Pattern::compile("/users/:id").unwrap();
        let joined = prefix.concat(&suffix);
        assert_eq!(joined.as_str(), "/api/users/:id");
        assert_eq!(
            joined.matches("/api/users/7"),
            Some(vec![("id".to_string(), "7".to_string())])
        );
    }
}
