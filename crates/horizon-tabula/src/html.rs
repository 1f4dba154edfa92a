//! HTML attribute bags and tag rendering.
//!
//! Controls build their markup from an ordered [`Attributes`] bag and the
//! small set of tag helpers below. Attribute order is preserved so that the
//! rendered output is stable across requests.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Escape text for inclusion in HTML content or a quoted attribute value.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Render `<tag attrs>inner</tag>`. `inner` is inserted verbatim.
pub fn render_tag(tag: &str, attributes: &Attributes, inner: &str) -> String {
    format!("<{tag}{attributes}>{inner}</{tag}>")
}

/// Render a void element such as `<input>` or `<col>`.
pub fn render_void_tag(tag: &str, attributes: &Attributes) -> String {
    format!("<{tag}{attributes}>")
}

/// An ordered set of HTML attributes.
///
/// Attributes without a value (such as `disabled` or `checked`) are flags.
/// Setting an attribute that already exists replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes {
    entries: Vec<(String, Option<String>)>,
}

impl Attributes {
    /// Create an empty attribute bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.put(name.into(), Some(value.into()));
        self
    }

    /// Set a value-less attribute.
    pub fn set_flag(&mut self, name: impl Into<String>) -> &mut Self {
        self.put(name.into(), None);
        self
    }

    /// Builder form of [`set`](Self::set).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    /// Builder form of [`set_flag`](Self::set_flag).
    pub fn with_flag(mut self, name: impl Into<String>) -> Self {
        self.set_flag(name);
        self
    }

    fn put(&mut self, name: String, value: Option<String>) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Set a `data-*` attribute.
    pub fn set_data(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        self.set(format!("data-{key}"), value)
    }

    /// Get an attribute value. Flags return `Some("")`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    /// Returns `true` if the attribute is present.
    pub fn has(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    /// Remove an attribute, returning whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(n, _)| n != name);
        before != self.entries.len()
    }

    /// The `id` attribute.
    pub fn id(&self) -> Option<&str> {
        self.get("id")
    }

    /// Add one or more space-separated classes, skipping duplicates.
    pub fn add_class(&mut self, classes: &str) -> &mut Self {
        let mut current: Vec<String> = self
            .get("class")
            .map(|c| c.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default();
        for class in classes.split_whitespace() {
            if !current.iter().any(|c| c == class) {
                current.push(class.to_string());
            }
        }
        if !current.is_empty() {
            self.set("class", current.join(" "));
        }
        self
    }

    /// Remove a class.
    pub fn remove_class(&mut self, class: &str) -> &mut Self {
        if let Some(existing) = self.get("class") {
            let kept: Vec<&str> = existing.split_whitespace().filter(|c| *c != class).collect();
            let kept = kept.join(" ");
            if kept.is_empty() {
                self.remove("class");
            } else {
                self.set("class", kept);
            }
        }
        self
    }

    /// Returns `true` if the class list contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.get("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    /// Merge another bag into this one. Classes are unioned, other
    /// attributes from `other` win.
    pub fn merge(&mut self, other: &Attributes) -> &mut Self {
        for (name, value) in &other.entries {
            if name == "class" {
                if let Some(classes) = value {
                    self.add_class(classes);
                }
            } else {
                self.put(name.clone(), value.clone());
            }
        }
        self
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_deref()))
    }
}

/// Renders each attribute with a leading space, ready to follow a tag name.
impl fmt::Display for Attributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.entries {
            match value {
                Some(v) => write!(f, " {}=\"{}\"", name, escape_html(v))?,
                None => write!(f, " {}", name)?,
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Attributes::new();
        for (k, v) in iter {
            attributes.set(k, v);
        }
        attributes
    }
}
