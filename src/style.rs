//! Inline `style` attribute parsing.

use crate::attributes::{AttributeMap, AttributeValue};
use crate::error::{Error, Result};

/// Parse `name: value; ...` declarations into `attributes`.
///
/// Declarations override attributes of the same name. The map is only
/// touched when the whole string parses; on error it is left as it was.
pub fn parse_style(attributes: &mut AttributeMap, style: &str) -> Result<()> {
    let mut declarations = Vec::new();

    for declaration in style.split(';') {
        let declaration = declaration.trim();
        if declaration.is_empty() {
            continue;
        }
        let Some((name, value)) = declaration.split_once(':') else {
            return Err(Error::Style(format!("missing ':' in \"{declaration}\"")));
        };
        let name = name.trim();
        let value = value.trim();
        if !is_property_name(name) {
            return Err(Error::Style(format!("invalid property name \"{name}\"")));
        }
        if value.is_empty() {
            return Err(Error::Style(format!("empty value for \"{name}\"")));
        }
        declarations.push((name, value));
    }

    for (name, value) in declarations {
        attributes.insert(name.to_string(), AttributeValue::from_markup(name, value));
    }
    Ok(())
}

fn is_property_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}
