//! Element fields of a page object.
//!
//! Any field type implementing [`ElementField`] can carry a load tag. The
//! derive macro collects tagged fields into [`FieldRequirement`]s, in
//! declaration order.

use crate::conditions::ElementState;
use crate::driver::ElementHandle;
use crate::locator::By;
use std::fmt;

/// What a field currently refers to
#[derive(Debug, Clone, Copy)]
pub enum FieldTarget<'a> {
    /// One located element
    Single(&'a ElementHandle),
    /// A located collection, possibly empty
    Many(&'a [ElementHandle]),
    /// A locator resolved by the driver on every check
    Lazy(&'a By),
}

/// A page-object field that refers to zero or more elements.
///
/// `target` returns `None` when the value cannot be obtained.
pub trait ElementField {
    /// Current target of the field
    fn target(&self) -> Option<FieldTarget<'_>>;
}

impl ElementField for ElementHandle {
    fn target(&self) -> Option<FieldTarget<'_>> {
        Some(FieldTarget::Single(self))
    }
}

impl ElementField for Vec<ElementHandle> {
    fn target(&self) -> Option<FieldTarget<'_>> {
        Some(FieldTarget::Many(self))
    }
}

impl ElementField for [ElementHandle] {
    fn target(&self) -> Option<FieldTarget<'_>> {
        Some(FieldTarget::Many(self))
    }
}

impl<T: ElementField> ElementField for Option<T> {
    fn target(&self) -> Option<FieldTarget<'_>> {
        self.as_ref().and_then(|field| field.target())
    }
}

impl<T: ElementField + ?Sized> ElementField for Box<T> {
    fn target(&self) -> Option<FieldTarget<'_>> {
        (**self).target()
    }
}

/// Lazily located elements.
///
/// Holds only a locator; every wait poll asks the driver for fresh matches,
/// so the field tracks elements that appear after the page object is built.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FindBy {
    by: By,
}

impl FindBy {
    /// Wrap a locator
    #[must_use]
    pub const fn new(by: By) -> Self {
        Self { by }
    }

    /// Lazy CSS locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::new(By::css(selector))
    }

    /// Lazy XPath locator
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::new(By::xpath(expr))
    }

    /// Lazy id locator
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::new(By::id(id))
    }

    /// The wrapped locator
    #[must_use]
    pub const fn by(&self) -> &By {
        &self.by
    }
}

impl From<By> for FindBy {
    fn from(by: By) -> Self {
        Self::new(by)
    }
}

impl ElementField for FindBy {
    fn target(&self) -> Option<FieldTarget<'_>> {
        Some(FieldTarget::Lazy(&self.by))
    }
}

/// One tagged field of a page object
#[derive(Clone, Copy)]
pub struct FieldRequirement<'a> {
    /// Field name used in logs and errors
    pub name: &'static str,
    /// State the field must reach
    pub state: ElementState,
    /// The field itself
    pub field: &'a dyn ElementField,
}

impl<'a> FieldRequirement<'a> {
    /// Create a requirement
    #[must_use]
    pub fn new(name: &'static str, state: ElementState, field: &'a dyn ElementField) -> Self {
        Self { name, state, field }
    }
}

impl fmt::Debug for FieldRequirement<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRequirement")
            .field("name", &self.name)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_target() {
        let el = ElementHandle::new("a", "a");
        assert!(matches!(el.target(), Some(FieldTarget::Single(h)) if h.id == "a"));
    }

    #[test]
    fn test_vec_target() {
        let els = vec![ElementHandle::new("a", "a"), ElementHandle::new("b", "a")];
        assert!(matches!(els.target(), Some(FieldTarget::Many(s)) if s.len() == 2));
    }

    #[test]
    fn test_option_none_is_unreadable() {
        let missing: Option<ElementHandle> = None;
        assert!(missing.target().is_none());
        let present = Some(FindBy::css("li"));
        assert!(matches!(present.target(), Some(FieldTarget::Lazy(by)) if by == &By::css("li")));
    }

    #[test]
    fn test_boxed_field() {
        let boxed: Box<dyn ElementField> = Box::new(FindBy::id("x"));
        assert!(matches!(boxed.target(), Some(FieldTarget::Lazy(_))));
    }

    #[test]
    fn test_requirement_debug() {
        let field = FindBy::css("p");
        let req = FieldRequirement::new("intro", ElementState::Visible, &field);
        let dbg = format!("{req:?}");
        assert!(dbg.contains("intro"));
        assert!(dbg.contains("Visible"));
    }
}
