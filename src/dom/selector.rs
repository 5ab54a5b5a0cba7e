//! Selector - Simple selector parsing and matching
//!
//! Supported grammar: `*` | `[tag]['#'id]['.'class]*` with identifier
//! characters `[A-Za-z0-9_-]`. Combinators, attribute selectors and
//! pseudo-classes are out of scope; the delegator only ever needs to
//! answer "does this element match".

use super::element::Element;
use crate::error::DomError;

/// A parsed simple selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

impl Selector {
    /// Parse a selector string.
    pub fn parse(input: &str) -> Result<Selector, DomError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(DomError::InvalidSelector(input.to_string()));
        }
        if input == "*" {
            return Ok(Selector { tag: None, id: None, classes: Vec::new() });
        }

        let mut selector = Selector { tag: None, id: None, classes: Vec::new() };
        let mut chars = input.chars().peekable();

        // Optional leading tag.
        if chars.peek().is_some_and(|c| is_ident_char(*c)) {
            selector.tag = Some(take_ident(&mut chars).to_ascii_lowercase());
        }

        while let Some(marker) = chars.next() {
            let ident = take_ident(&mut chars);
            if ident.is_empty() {
                return Err(DomError::InvalidSelector(input.to_string()));
            }
            match marker {
                '#' => {
                    if selector.id.is_some() {
                        return Err(DomError::InvalidSelector(input.to_string()));
                    }
                    selector.id = Some(ident);
                }
                '.' => selector.classes.push(ident),
                _ => return Err(DomError::InvalidSelector(input.to_string())),
            }
        }

        if selector.tag.is_none() && selector.id.is_none() && selector.classes.is_empty() {
            return Err(DomError::InvalidSelector(input.to_string()));
        }
        Ok(selector)
    }

    /// Whether `element` itself satisfies every part of this selector.
    pub fn matches(&self, element: &Element) -> bool {
        if let Some(tag) = &self.tag
            && element.tag() != *tag
        {
            return false;
        }
        if let Some(id) = &self.id
            && element.id().as_deref() != Some(id.as_str())
        {
            return false;
        }
        self.classes.iter().all(|class| element.has_class(class))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

fn take_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(c) = chars.peek() {
        if is_ident_char(*c) {
            ident.push(*c);
            chars.next();
        } else {
            break;
        }
    }
    ident
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str, id: Option<&str>, class: Option<&str>) -> Element {
        let el = Element::create(tag);
        if let Some(id) = id {
            el.set_attribute("id", id);
        }
        if let Some(class) = class {
            el.set_attribute("class", class);
        }
        el
    }

    #[test]
    fn test_tag_selector() {
        let sel = Selector::parse("button").unwrap();
        assert!(sel.matches(&element("button", None, None)));
        assert!(!sel.matches(&element("div", None, None)));
    }

    #[test]
    fn test_id_selector() {
        let sel = Selector::parse("#app").unwrap();
        assert!(sel.matches(&element("div", Some("app"), None)));
        assert!(!sel.matches(&element("div", Some("other"), None)));
        assert!(!sel.matches(&element("div", None, None)));
    }

    #[test]
    fn test_class_selector() {
        let sel = Selector::parse(".task").unwrap();
        assert!(sel.matches(&element("li", None, Some("task done"))));
        assert!(!sel.matches(&element("li", None, Some("done"))));
    }

    #[test]
    fn test_compound_selector() {
        let sel = Selector::parse("button.delete").unwrap();
        assert!(sel.matches(&element("button", None, Some("delete"))));
        assert!(!sel.matches(&element("a", None, Some("delete"))));
        assert!(!sel.matches(&element("button", None, None)));
    }

    #[test]
    fn test_universal_selector() {
        let sel = Selector::parse("*").unwrap();
        assert!(sel.matches(&element("anything", None, None)));
    }

    #[test]
    fn test_invalid_selectors() {
        for bad in ["", "  ", "#", ".", "div > li", "a[href]", "li#a#b"] {
            assert!(Selector::parse(bad).is_err(), "expected error for {bad:?}");
        }
    }

    #[test]
    fn test_tag_case_insensitive() {
        let sel = Selector::parse("DIV").unwrap();
        assert!(sel.matches(&element("div", None, None)));
    }
}
