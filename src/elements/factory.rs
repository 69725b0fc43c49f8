use std::collections::HashMap;

use crate::attributes::AttributeMap;

use super::{Element, GenericElement, ScriptElement, ShapeElement, ShapeKind};

/// Builds an element from its tag name and markup attributes.
pub type ElementConstructor = Box<dyn Fn(&str, AttributeMap) -> Box<dyn Element>>;

/// Maps tag names to element constructors.
///
/// Tags without a registered constructor become [`GenericElement`]s.
pub struct ElementFactory {
    constructors: HashMap<String, ElementConstructor>,
}

impl ElementFactory {
    /// A factory that only knows about generic elements.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Register (or replace) the constructor for `tag`.
    pub fn register(
        &mut self,
        tag: impl Into<String>,
        constructor: impl Fn(&str, AttributeMap) -> Box<dyn Element> + 'static,
    ) -> &mut Self {
        self.constructors.insert(tag.into(), Box::new(constructor));
        self
    }

    pub fn is_registered(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    pub fn create(&self, tag: &str, attributes: AttributeMap) -> Box<dyn Element> {
        match self.constructors.get(tag) {
            Some(constructor) => constructor(tag, attributes),
            None => Box::new(GenericElement::new(tag, attributes)),
        }
    }
}

impl Default for ElementFactory {
    fn default() -> Self {
        let mut factory = Self::empty();
        for kind in ShapeKind::ALL {
            factory.register(kind.tag_name(), move |_, attributes| {
                Box::new(ShapeElement::new(kind, attributes))
            });
        }
        factory.register("script", |_, attributes| {
            Box::new(ScriptElement::new(attributes))
        });
        factory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_tags_are_registered() {
        let factory = ElementFactory::default();
        let circle = factory.create("circle", AttributeMap::new());
        assert_eq!(circle.tag_name(), "circle");
        assert!(circle.path().is_some());

        let unknown = factory.create("foreignObject", AttributeMap::new());
        assert_eq!(unknown.tag_name(), "foreignObject");
        assert!(unknown.path().is_none());
    }

    #[test]
    fn custom_tags_can_be_registered() {
        let mut factory = ElementFactory::empty();
        assert!(!factory.is_registered("circle"));
        factory.register("button", |_, attributes| {
            Box::new(GenericElement::new("button", attributes))
        });
        assert!(factory.is_registered("button"));
        assert_eq!(factory.create("button", AttributeMap::new()).tag_name(), "button");
    }
}
