//! Native tag references
//!
//! Native conditions are written `%{TAG}` or `%{TAG:payload}`. `TagRef`
//! is the single place that splits them.

use std::fmt;

/// What kind of thing a tag names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// `%{REMAP_PSEUDO_HOOK}` and friends
    Hook,
    /// `%{GROUP}` / `%{GROUP:END}`
    Group,
    /// `%{TRUE}` / `%{FALSE}`
    Literal,
    /// Everything else
    Condition,
}

/// A split `%{TAG:payload}` reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TagRef<'a> {
    pub namespace: Namespace,
    pub tag: &'a str,
    pub payload: Option<&'a str>,
}

impl<'a> TagRef<'a> {
    /// Split a tag, with or without the `%{ }` wrapper
    ///
    /// Total: any input yields a reference. Only the first `:` separates
    /// the payload, so `INBOUND:CLIENT-CERT:SAN:DNS` has tag `INBOUND`.
    pub fn parse(text: &'a str) -> TagRef<'a> {
        let inner = text.trim();
        let inner = inner
            .strip_prefix("%{")
            .map(|s| s.strip_suffix('}').unwrap_or(s))
            .unwrap_or(inner);

        let (tag, payload) = match inner.split_once(':') {
            Some((tag, payload)) => (tag, Some(payload)),
            None => (inner, None),
        };

        let namespace = if tag.ends_with("_HOOK") {
            Namespace::Hook
        } else if tag == "GROUP" {
            Namespace::Group
        } else if tag == "TRUE" || tag == "FALSE" {
            Namespace::Literal
        } else {
            Namespace::Condition
        };

        TagRef {
            namespace,
            tag,
            payload,
        }
    }

    /// `GROUP:END` closes a group opened by `GROUP`
    pub fn is_group_end(&self) -> bool {
        self.namespace == Namespace::Group && self.payload == Some("END")
    }

    /// The `TAG` or `TAG:payload` body without the wrapper
    pub fn body(&self) -> String {
        match self.payload {
            Some(p) => format!("{}:{}", self.tag, p),
            None => self.tag.to_string(),
        }
    }
}

impl fmt::Display for TagRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{{{}}}", self.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wrapped_with_payload() {
        let t = TagRef::parse("%{HEADER:X-Foo}");
        assert_eq!(t.namespace, Namespace::Condition);
        assert_eq!(t.tag, "HEADER");
        assert_eq!(t.payload, Some("X-Foo"));
        assert_eq!(t.to_string(), "%{HEADER:X-Foo}");
    }

    #[test]
    fn test_parse_nested_payload() {
        let t = TagRef::parse("INBOUND:CLIENT-CERT:SAN:DNS");
        assert_eq!(t.tag, "INBOUND");
        assert_eq!(t.payload, Some("CLIENT-CERT:SAN:DNS"));
    }

    #[test]
    fn test_namespaces() {
        assert_eq!(TagRef::parse("%{REMAP_PSEUDO_HOOK}").namespace, Namespace::Hook);
        assert!(TagRef::parse("%{GROUP:END}").is_group_end());
        assert!(!TagRef::parse("%{GROUP}").is_group_end());
        assert_eq!(TagRef::parse("%{TRUE}").namespace, Namespace::Literal);
    }

    #[test]
    fn test_parse_is_total() {
        let t = TagRef::parse("");
        assert_eq!(t.tag, "");
        assert_eq!(t.payload, None);
        let t = TagRef::parse("%{unterminated");
        assert_eq!(t.tag, "unterminated");
    }
}
