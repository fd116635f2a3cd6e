use crate::helper::{Helper, HelperMap};

/// A bulk-registration payload in one of its accepted shapes, plus an
/// optional explicit group marker.
#[derive(Debug, Clone)]
pub struct HelperSource {
    payload: Payload,
    group: Option<bool>,
}

#[derive(Debug, Clone)]
pub(crate) enum Payload {
    Single(Helper),
    Mapping(HelperMap),
    Sequence(Vec<HelperSource>),
    Pattern(String),
}

impl HelperSource {
    /// One callable without a name of its own.
    pub fn single(helper: Helper) -> Self {
        Self {
            payload: Payload::Single(helper),
            group: None,
        }
    }

    /// A mapping of named callables.
    pub fn mapping(map: HelperMap) -> Self {
        Self {
            payload: Payload::Mapping(map),
            group: None,
        }
    }

    /// An ordered sequence of payloads, resolved in order with later entries
    /// overwriting earlier ones on name collision.
    pub fn sequence(sources: Vec<HelperSource>) -> Self {
        Self {
            payload: Payload::Sequence(sources),
            group: None,
        }
    }

    /// A glob pattern to be expanded by the attachment's resolver.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            payload: Payload::Pattern(pattern.into()),
            group: None,
        }
    }

    /// Set the explicit group marker, which the classifier honors regardless
    /// of payload shape or size.
    pub fn grouped(mut self, grouped: bool) -> Self {
        self.group = Some(grouped);
        self
    }

    pub(crate) fn group_marker(&self) -> Option<bool> {
        self.group
    }

    pub(crate) fn payload(&self) -> &Payload {
        &self.payload
    }

    pub(crate) fn into_payload(self) -> Payload {
        self.payload
    }
}

impl From<Helper> for HelperSource {
    fn from(helper: Helper) -> Self {
        Self::single(helper)
    }
}

impl From<HelperMap> for HelperSource {
    fn from(map: HelperMap) -> Self {
        Self::mapping(map)
    }
}

impl From<Vec<HelperSource>> for HelperSource {
    fn from(sources: Vec<HelperSource>) -> Self {
        Self::sequence(sources)
    }
}

impl From<&str> for HelperSource {
    fn from(pattern: &str) -> Self {
        Self::pattern(pattern)
    }
}

impl From<String> for HelperSource {
    fn from(pattern: String) -> Self {
        Self::pattern(pattern)
    }
}

/// Decide whether a `(name, payload)` pair is a namespaced group
/// registration rather than a flat one.
///
/// An explicit marker always wins. Without one, a mapping classifies by its
/// own key count: async-tagged mappings need more than one own key (the tag
/// itself counts as a key), untagged mappings need more than zero. Callers
/// may hand over a single callable that happens to carry an async tag; that
/// must stay a single registration, so a lone callable never classifies as a
/// group by size. Sequences and pattern strings group only via the marker.
pub fn is_helper_group(name: Option<&str>, source: Option<&HelperSource>) -> bool {
    if name.is_none() {
        return false;
    }
    let Some(source) = source else {
        return false;
    };
    if let Some(grouped) = source.group_marker() {
        return grouped;
    }
    match source.payload() {
        Payload::Single(_) => false,
        Payload::Mapping(map) => {
            let keys = map.len() + usize::from(map.is_async_tagged());
            if map.is_async_tagged() {
                keys > 1
            } else {
                keys > 0
            }
        }
        Payload::Sequence(_) | Payload::Pattern(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn noop() -> Helper {
        Helper::new(|_| Ok(Value::Null))
    }

    #[test]
    fn test_no_name_is_never_a_group() {
        let source = HelperSource::mapping(HelperMap::new().with("a", noop()));
        assert!(!is_helper_group(None, Some(&source)));
    }

    #[test]
    fn test_no_payload_is_never_a_group() {
        assert!(!is_helper_group(Some("foo"), None));
    }

    #[test]
    fn test_explicit_marker_wins_both_ways() {
        let marked = HelperSource::single(noop()).grouped(true);
        assert!(is_helper_group(Some("foo"), Some(&marked)));

        let unmarked = HelperSource::mapping(HelperMap::new().with("a", noop()).with("b", noop()))
            .grouped(false);
        assert!(!is_helper_group(Some("foo"), Some(&unmarked)));
    }

    #[test]
    fn test_nonempty_mapping_is_a_group() {
        let source = HelperSource::mapping(
            HelperMap::new().with("x", noop()).with("y", noop()).with("z", noop()),
        );
        assert!(is_helper_group(Some("foo"), Some(&source)));
    }

    #[test]
    fn test_empty_mapping_is_not_a_group() {
        let source = HelperSource::mapping(HelperMap::new());
        assert!(!is_helper_group(Some("foo"), Some(&source)));
    }

    #[test]
    fn test_async_tagged_mapping_needs_two_keys() {
        // The tag counts as one key, so a single-entry tagged mapping makes
        // two and crosses the higher threshold.
        let one = HelperSource::mapping(HelperMap::new().with("a", noop()).tag_async());
        assert!(is_helper_group(Some("foo"), Some(&one)));

        // The tag alone does not.
        let none = HelperSource::mapping(HelperMap::new().tag_async());
        assert!(!is_helper_group(Some("foo"), Some(&none)));
    }

    #[test]
    fn test_single_callable_with_async_tag_is_not_a_group() {
        let source = HelperSource::single(Helper::new_async(|_| Ok(Value::Null)));
        assert!(!is_helper_group(Some("foo"), Some(&source)));
    }

    #[test]
    fn test_sequence_groups_only_via_marker() {
        let sources = vec![
            HelperSource::mapping(HelperMap::new().with("a", noop())),
            HelperSource::mapping(HelperMap::new().with("b", noop())),
        ];
        let plain = HelperSource::sequence(sources.clone());
        assert!(!is_helper_group(Some("foo"), Some(&plain)));

        let marked = HelperSource::sequence(sources).grouped(true);
        assert!(is_helper_group(Some("foo"), Some(&marked)));
    }

    #[test]
    fn test_pattern_is_not_a_group() {
        let source = HelperSource::pattern("helpers/*.js");
        assert!(!is_helper_group(Some("foo"), Some(&source)));
    }
}
