use serde::{Deserialize, Serialize};
use std::fmt;

/// How an attribute value is compared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttrOp {
    Present,
    Equals(String),
    Contains(String),
}

/// A small structured stand-in for CSS selectors.
///
/// Only the shapes the discovery code needs are modelled: a tag name, an
/// attribute test, a compound (`All`, every part must match the same element)
/// and a union (`Any`). Keeping selectors structured lets the in-memory page
/// evaluate them without a CSS engine, while `to_css` still feeds
/// `querySelectorAll` on a real document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    Tag(String),
    Attr { name: String, op: AttrOp },
    All(Vec<Selector>),
    Any(Vec<Selector>),
}

impl Selector {
    pub fn tag<S: Into<String>>(tag: S) -> Self {
        Self::Tag(tag.into().to_lowercase())
    }

    pub fn has_attr<S: Into<String>>(name: S) -> Self {
        Self::Attr {
            name: name.into(),
            op: AttrOp::Present,
        }
    }

    pub fn attr_eq<S: Into<String>, V: Into<String>>(name: S, value: V) -> Self {
        Self::Attr {
            name: name.into(),
            op: AttrOp::Equals(value.into()),
        }
    }

    pub fn attr_contains<S: Into<String>, V: Into<String>>(name: S, value: V) -> Self {
        Self::Attr {
            name: name.into(),
            op: AttrOp::Contains(value.into()),
        }
    }

    pub fn role<V: Into<String>>(role: V) -> Self {
        Self::attr_eq("role", role)
    }

    pub fn any(selectors: Vec<Selector>) -> Self {
        Self::Any(selectors)
    }

    /// Compound selector: `self` and `other` must hold for the same element.
    pub fn and(self, other: Selector) -> Self {
        match self {
            Self::All(mut parts) => {
                parts.push(other);
                Self::All(parts)
            }
            first => Self::All(vec![first, other]),
        }
    }

    /// `input[type="checkbox"], [role="checkbox"]`
    pub fn toggle() -> Self {
        Self::any(vec![
            Self::tag("input").and(Self::attr_eq("type", "checkbox")),
            Self::role("checkbox"),
        ])
    }

    /// Evaluates the selector against one element's tag and attributes.
    pub fn matches_with<F>(&self, tag: &str, attribute: &F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            Self::Tag(expected) => tag.eq_ignore_ascii_case(expected),
            Self::Attr { name, op } => match (attribute(name), op) {
                (None, _) => false,
                (Some(_), AttrOp::Present) => true,
                (Some(value), AttrOp::Equals(expected)) => &value == expected,
                (Some(value), AttrOp::Contains(needle)) => value.contains(needle.as_str()),
            },
            Self::All(parts) => parts.iter().all(|part| part.matches_with(tag, attribute)),
            Self::Any(options) => options.iter().any(|option| option.matches_with(tag, attribute)),
        }
    }

    /// CSS rendering, `None` when the shape has no CSS equivalent
    /// (a union nested inside a compound).
    pub fn to_css(&self) -> Option<String> {
        match self {
            Self::Any(options) => {
                let rendered: Option<Vec<String>> = options.iter().map(compound_css).collect();
                rendered.map(|parts| parts.join(", "))
            }
            other => compound_css(other),
        }
    }
}

fn compound_css(selector: &Selector) -> Option<String> {
    match selector {
        Selector::Tag(tag) => Some(tag.clone()),
        Selector::Attr { name, op } => Some(attr_css(name, op)),
        Selector::All(parts) => {
            let mut tag = String::new();
            let mut attrs = String::new();
            for part in parts {
                match part {
                    Selector::Tag(t) => {
                        if !tag.is_empty() && tag != *t {
                            return None;
                        }
                        tag = t.clone();
                    }
                    Selector::Attr { name, op } => attrs.push_str(&attr_css(name, op)),
                    Selector::All(_) => attrs.push_str(&compound_css(part)?),
                    Selector::Any(_) => return None,
                }
            }
            Some(format!("{}{}", tag, attrs))
        }
        Selector::Any(_) => None,
    }
}

fn attr_css(name: &str, op: &AttrOp) -> String {
    match op {
        AttrOp::Present => format!("[{}]", name),
        AttrOp::Equals(value) => format!("[{}=\"{}\"]", name, escape(value)),
        AttrOp::Contains(value) => format!("[{}*=\"{}\"]", name, escape(value)),
    }
}

fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_css() {
            Some(css) => write!(f, "{}", css),
            None => write!(f, "{:?}", self),
        }
    }
}
