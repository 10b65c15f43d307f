//! Declarative configuration tree handed to systems on configure.

use std::collections::BTreeMap;
use std::str::FromStr;

/// Node of a tag-based configuration tree.
///
/// Every element has a name, an optional text value, string attributes
/// and ordered child elements. Systems read their parameters from the
/// children of the element they were loaded with:
///
/// ```
/// use gantry_core::config::Element;
///
/// let plugin = Element::new("plugin")
///     .with_attribute("name", "detachable_joint")
///     .with_text("parent_link", "body");
///
/// assert_eq!(plugin.get::<String>("parent_link").as_deref(), Some("body"));
/// assert_eq!(plugin.get_or("suppress_child_warning", false), (false, false));
/// ```
///
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    name: String,
    value: Option<String>,
    attributes: BTreeMap<String, String>,
    children: Vec<Element>,
}

impl Element {
    /// Creates empty element with given tag name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets text value of this element.
    pub fn with_value(mut self, value: impl ToString) -> Self {
        self.value = Some(value.to_string());
        self
    }

    /// Sets attribute of this element.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.insert(key.into(), value.to_string());
        self
    }

    /// Appends child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Appends child element which holds only text value.
    pub fn with_text(self, name: impl Into<String>, value: impl ToString) -> Self {
        self.with_child(Element::new(name).with_value(value))
    }

    /// Tag name of this element.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Text value of this element.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Value of the attribute, if present.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// All child elements in declaration order.
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Returns `true` if there is a child element with given name.
    pub fn has_element(&self, name: &str) -> bool {
        self.find_element(name).is_some()
    }

    /// First child element with given name.
    pub fn find_element(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|child| child.name == name)
    }

    /// All child elements with given name.
    pub fn elements<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Parses text value of the first child element with given name.
    ///
    /// Returns `None` if the child is absent or its value cannot be parsed.
    ///
    pub fn get<T>(&self, name: &str) -> Option<T>
    where
        T: FromStr,
    {
        let text = self.find_element(name)?.value()?;
        match text.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                log::warn!(
                    "cannot parse value [{}] of element <{}> inside <{}>",
                    text,
                    name,
                    self.name,
                );
                None
            }
        }
    }

    /// Same as [`get`](Self::get), but falls back to `default`.
    ///
    /// Second item of the pair is `true` if the value was found in the element.
    ///
    pub fn get_or<T>(&self, name: &str, default: T) -> (T, bool)
    where
        T: FromStr,
    {
        match self.get(name) {
            Some(value) => (value, true),
            None => (default, false),
        }
    }

    /// Builds element tree from TOML value.
    ///
    /// Tables become elements with one child per key; keys starting with `@`
    /// become attributes instead. Arrays produce one sibling element per item.
    /// Scalars become text values.
    ///
    pub fn from_toml(name: impl Into<String>, value: &toml::Value) -> Self {
        let mut element = Element::new(name);
        match value {
            toml::Value::Table(table) => {
                for (key, value) in table {
                    if let Some(attribute) = key.strip_prefix('@') {
                        element.attributes.insert(attribute.to_string(), scalar(value));
                        continue;
                    }
                    match value {
                        toml::Value::Array(items) => element.children.extend(
                            items.iter().map(|item| Element::from_toml(key.clone(), item)),
                        ),
                        value => element.children.push(Element::from_toml(key.clone(), value)),
                    }
                }
            }
            value => element.value = Some(scalar(value)),
        }
        element
    }
}

fn scalar(value: &toml::Value) -> String {
    match value {
        toml::Value::String(string) => string.clone(),
        value => value.to_string(),
    }
}
