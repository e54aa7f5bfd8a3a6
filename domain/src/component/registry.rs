//! Component registry and the frozen component set

use super::entities::PromptComponent;
use crate::core::error::DomainError;
use std::sync::Arc;

/// Mutable catalog used while a domain is being defined.
///
/// Registration order is significant: it fixes the bit position of every
/// component in the combination encoding. Call [`ComponentRegistry::build`]
/// once setup is complete to get the read-only [`ComponentSet`].
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    components: Vec<PromptComponent>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component.
    ///
    /// On failure the registry is left exactly as it was.
    pub fn register(&mut self, component: PromptComponent) -> Result<(), DomainError> {
        validate_name(component.name())?;
        if self.contains(component.name()) {
            return Err(DomainError::DuplicateName(component.name().to_string()));
        }
        self.components.push(component);
        Ok(())
    }

    /// Register every component in order, stopping at the first failure.
    pub fn register_all(
        &mut self,
        components: impl IntoIterator<Item = PromptComponent>,
    ) -> Result<(), DomainError> {
        for component in components {
            self.register(component)?;
        }
        Ok(())
    }

    /// Components in registration order.
    pub fn all(&self) -> &[PromptComponent] {
        &self.components
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.iter().any(|c| c.name() == name)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Freeze the catalog into an immutable set.
    pub fn build(self) -> ComponentSet {
        ComponentSet {
            components: self.components.into(),
        }
    }
}

fn validate_name(name: &str) -> Result<(), DomainError> {
    if name.is_empty() {
        return Err(DomainError::InvalidComponent(
            "component name must not be empty".to_string(),
        ));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(DomainError::InvalidComponent(format!(
            "component name '{}' must not contain whitespace",
            name
        )));
    }
    Ok(())
}

/// Ordered, immutable universe of components for one domain.
///
/// Cloning is cheap (shared storage), so the set can be handed to every
/// worker of a concurrent run without locking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentSet {
    components: Arc<[PromptComponent]>,
}

impl ComponentSet {
    /// Build a set directly from a list, applying the registry rules.
    pub fn from_components(
        components: impl IntoIterator<Item = PromptComponent>,
    ) -> Result<Self, DomainError> {
        let mut registry = ComponentRegistry::new();
        registry.register_all(components)?;
        Ok(registry.build())
    }

    /// The empty set (a single "all components off" combination).
    pub fn empty() -> Self {
        ComponentRegistry::new().build()
    }

    /// Components in registration order.
    pub fn all(&self) -> &[PromptComponent] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PromptComponent> {
        self.components.iter().find(|c| c.name() == name)
    }

    /// Bit position of a component.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.components.iter().position(|c| c.name() == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.iter().map(|c| c.name())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PromptComponent> {
        self.components.iter()
    }
}

impl<'a> IntoIterator for &'a ComponentSet {
    type Item = &'a PromptComponent;
    type IntoIter = std::slice::Iter<'a, PromptComponent>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
