//! Typed attribute values backing every element.
//!
//! Values come in from markup as strings; [`AttributeValue::from_markup`]
//! types the ones the renderer consumes (paints and lengths) and keeps the
//! rest as text.

use std::collections::HashMap;

use crate::color::Color;

/// Attribute name to value mapping for one element.
pub type AttributeMap = HashMap<String, AttributeValue>;

/// Attributes interpreted as paints.
const COLOR_ATTRIBUTES: &[&str] = &["fill", "stroke", "color", "stop-color", "flood-color"];

/// Attributes interpreted as plain numbers (lengths, opacities).
const NUMBER_ATTRIBUTES: &[&str] = &[
    "cx",
    "cy",
    "r",
    "rx",
    "ry",
    "x",
    "y",
    "x1",
    "y1",
    "x2",
    "y2",
    "width",
    "height",
    "stroke-width",
    "opacity",
    "fill-opacity",
    "stroke-opacity",
];

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AttributeValue {
    /// Not set. Inheritance lookups continue with the parent.
    #[default]
    Absent,
    Text(String),
    Number(f64),
    Color(Color),
}

impl AttributeValue {
    /// Type a raw markup value according to the attribute it belongs to.
    ///
    /// Paint attributes become [`AttributeValue::Color`], geometry and
    /// opacity attributes [`AttributeValue::Number`] (a trailing `px` is
    /// accepted). Values that fail to parse are kept as text.
    pub fn from_markup(name: &str, raw: &str) -> Self {
        if COLOR_ATTRIBUTES.contains(&name) {
            if let Some(color) = Color::parse(raw) {
                return AttributeValue::Color(color);
            }
        } else if NUMBER_ATTRIBUTES.contains(&name) {
            let trimmed = raw.trim();
            let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim_end();
            if let Ok(value) = number.parse::<f64>() {
                return AttributeValue::Number(value);
            }
        }
        AttributeValue::Text(raw.to_string())
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, AttributeValue::Absent)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Absent | AttributeValue::Text(_) | AttributeValue::Color(_) => None,
        }
    }

    pub fn as_color(&self) -> Option<Color> {
        match self {
            AttributeValue::Color(c) => Some(*c),
            AttributeValue::Absent | AttributeValue::Text(_) | AttributeValue::Number(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            AttributeValue::Absent | AttributeValue::Number(_) | AttributeValue::Color(_) => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<Color> for AttributeValue {
    fn from(value: Color) -> Self {
        AttributeValue::Color(value)
    }
}

/// Build an [`AttributeMap`] from raw `(name, value)` markup pairs.
pub fn attributes_from_markup<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> AttributeMap {
    pairs
        .into_iter()
        .map(|(name, raw)| (name.to_string(), AttributeValue::from_markup(name, raw)))
        .collect()
}

/// Local lookup that treats a missing key and an explicit
/// [`AttributeValue::Absent`] the same way.
pub fn lookup<'a>(map: &'a AttributeMap, name: &str) -> Option<&'a AttributeValue> {
    map.get(name).filter(|value| !value.is_absent())
}
