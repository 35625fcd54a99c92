//! Locators for finding elements.
//!
//! A [`By`] describes how the driver should find one or more elements. It
//! carries no matching logic of its own; drivers interpret it. For drivers
//! that work through page-side JavaScript, [`By::to_query_all`] renders the
//! locator as an expression yielding an array of matching elements.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy used to locate elements
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "using", content = "value", rename_all = "snake_case")]
pub enum By {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// XPath expression
    #[serde(rename = "xpath")]
    XPath(String),
    /// `id` attribute
    Id(String),
    /// `name` attribute
    Name(String),
    /// Tag name (e.g., "input")
    TagName(String),
    /// Single class name
    ClassName(String),
    /// Exact visible text of a link
    LinkText(String),
    /// Substring of the visible text of a link
    PartialLinkText(String),
}

impl By {
    /// Create a CSS locator
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    /// Create an XPath locator
    #[must_use]
    pub fn xpath(expr: impl Into<String>) -> Self {
        Self::XPath(expr.into())
    }

    /// Create an id locator
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::Id(id.into())
    }

    /// Create a name-attribute locator
    #[must_use]
    pub fn name(name: impl Into<String>) -> Self {
        Self::Name(name.into())
    }

    /// Create a tag-name locator
    #[must_use]
    pub fn tag_name(tag: impl Into<String>) -> Self {
        Self::TagName(tag.into())
    }

    /// Create a class-name locator
    #[must_use]
    pub fn class_name(class: impl Into<String>) -> Self {
        Self::ClassName(class.into())
    }

    /// Create an exact link-text locator
    #[must_use]
    pub fn link_text(text: impl Into<String>) -> Self {
        Self::LinkText(text.into())
    }

    /// Create a partial link-text locator
    #[must_use]
    pub fn partial_link_text(text: impl Into<String>) -> Self {
        Self::PartialLinkText(text.into())
    }

    /// Name of the location strategy, as used in log lines and errors
    #[must_use]
    pub const fn strategy(&self) -> &'static str {
        match self {
            Self::Css(_) => "css",
            Self::XPath(_) => "xpath",
            Self::Id(_) => "id",
            Self::Name(_) => "name",
            Self::TagName(_) => "tag name",
            Self::ClassName(_) => "class name",
            Self::LinkText(_) => "link text",
            Self::PartialLinkText(_) => "partial link text",
        }
    }

    /// The raw locator value
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Css(v)
            | Self::XPath(v)
            | Self::Id(v)
            | Self::Name(v)
            | Self::TagName(v)
            | Self::ClassName(v)
            | Self::LinkText(v)
            | Self::PartialLinkText(v) => v,
        }
    }

    /// Render as a JavaScript expression returning an `Array` of matches.
    ///
    /// `root` must be an expression evaluating to a `Document` or `Element`.
    #[must_use]
    pub fn to_query_all(&self, root: &str) -> String {
        match self {
            Self::Css(s) | Self::TagName(s) => {
                format!("Array.from({root}.querySelectorAll({s:?}))")
            }
            Self::Id(id) => {
                let css = format!("[id={id:?}]");
                format!("Array.from({root}.querySelectorAll({css:?}))")
            }
            Self::Name(name) => {
                let css = format!("[name={name:?}]");
                format!("Array.from({root}.querySelectorAll({css:?}))")
            }
            Self::ClassName(c) => format!("Array.from({root}.getElementsByClassName({c:?}))"),
            Self::XPath(x) => format!(
                "(() => {{ const r = document.evaluate({x:?}, {root}, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); const out = []; \
                 for (let i = 0; i < r.snapshotLength; i++) out.push(r.snapshotItem(i)); \
                 return out; }})()"
            ),
            Self::LinkText(t) => format!(
                "Array.from({root}.querySelectorAll('a')).filter(a => a.textContent.trim() === {t:?})"
            ),
            Self::PartialLinkText(t) => format!(
                "Array.from({root}.querySelectorAll('a')).filter(a => a.textContent.includes({t:?}))"
            ),
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy(), self.value())
    }
}
