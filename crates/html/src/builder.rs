//! Generic node-tree builder.
//!
//! Keeps a stack of open containers. Nodes are appended to the innermost
//! open container; closing a container appends the finished element to its
//! parent. Specialized builders (forms) wrap an `HtmlBuilder` rather than
//! extending it.

use std::ops::{Deref, DerefMut};

use crate::error::{HtmlError, HtmlResult};
use crate::node::{Attributes, Element, HtmlNode, render_nodes, validate_name};
use crate::safe::SafeString;

#[derive(Debug)]
struct Frame {
    element: Option<Element>,
    children: Vec<HtmlNode>,
}

impl Frame {
    fn root() -> Self {
        Self {
            element: None,
            children: Vec::new(),
        }
    }
}

/// Accumulates an [`HtmlNode`] forest.
#[derive(Debug)]
pub struct HtmlBuilder {
    stack: Vec<Frame>,
}

impl Default for HtmlBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlBuilder {
    pub fn new() -> Self {
        Self {
            stack: vec![Frame::root()],
        }
    }

    /// Number of open containers, not counting the root.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Append a finished node to the innermost open container.
    pub fn push(&mut self, node: HtmlNode) {
        if let Some(frame) = self.stack.last_mut() {
            frame.children.push(node);
        }
    }

    /// Append an element without content (`<input>`, or `<div></div>`).
    pub fn element(&mut self, tag: &str, attributes: Attributes) -> HtmlResult<()> {
        let element = checked_element(tag, attributes)?;
        self.push(element.into());
        Ok(())
    }

    /// Append an element whose only child is escaped text.
    pub fn text_element(
        &mut self,
        tag: &str,
        attributes: Attributes,
        content: impl Into<String>,
    ) -> HtmlResult<()> {
        let element =
            checked_element(tag, attributes)?.with_children(vec![HtmlNode::text(content)]);
        self.push(element.into());
        Ok(())
    }

    /// Append an element whose only child is trusted markup.
    pub fn safe_element(
        &mut self,
        tag: &str,
        attributes: Attributes,
        content: SafeString,
    ) -> HtmlResult<()> {
        let element = checked_element(tag, attributes)?.with_children(vec![HtmlNode::raw(content)]);
        self.push(element.into());
        Ok(())
    }

    /// Append escaped text.
    pub fn text(&mut self, content: impl Into<String>) {
        self.push(HtmlNode::text(content));
    }

    /// Append trusted markup.
    pub fn raw(&mut self, content: SafeString) {
        self.push(HtmlNode::raw(content));
    }

    /// Open a container element; following nodes become its children.
    pub fn open(&mut self, tag: &str, attributes: Attributes) -> HtmlResult<()> {
        let element = checked_element(tag, attributes)?;
        self.stack.push(Frame {
            element: Some(element),
            children: Vec::new(),
        });
        Ok(())
    }

    /// Close the innermost open container.
    pub fn close(&mut self) -> HtmlResult<()> {
        if self.stack.len() < 2 {
            return Err(HtmlError::Unbalanced);
        }
        let Some(Frame {
            element: Some(element),
            children,
        }) = self.stack.pop()
        else {
            return Err(HtmlError::Unbalanced);
        };
        self.push(element.with_children(children).into());
        Ok(())
    }

    /// Close open containers until only `depth` remain.
    pub fn close_to(&mut self, depth: usize) -> HtmlResult<()> {
        while self.depth() > depth {
            self.close()?;
        }
        Ok(())
    }

    /// Open `tag`, run `block`, and close it again whether `block`
    /// succeeded, failed or panicked.
    pub fn nest<F, E>(&mut self, tag: &str, attributes: Attributes, block: F) -> Result<(), E>
    where
        F: FnOnce(&mut Self) -> Result<(), E>,
        E: From<HtmlError>,
    {
        let mut scope = ContainerScope::open(self, tag, attributes)?;
        block(&mut *scope)
    }

    /// Take the finished forest. Fails if a container is still open.
    pub fn finish(mut self) -> HtmlResult<Vec<HtmlNode>> {
        if self.stack.len() != 1 {
            return Err(HtmlError::Unbalanced);
        }
        Ok(self.stack.pop().map(|frame| frame.children).unwrap_or_default())
    }

    /// Finish and serialize.
    pub fn render(self) -> HtmlResult<SafeString> {
        Ok(render_nodes(&self.finish()?))
    }
}

/// Guard for an open container. Dropping it closes every container opened
/// since it was created, its own included.
pub struct ContainerScope<'s> {
    html: &'s mut HtmlBuilder,
    restore_depth: usize,
}

impl<'s> ContainerScope<'s> {
    pub fn open(html: &'s mut HtmlBuilder, tag: &str, attributes: Attributes) -> HtmlResult<Self> {
        let restore_depth = html.depth();
        html.open(tag, attributes)?;
        Ok(Self {
            html,
            restore_depth,
        })
    }
}

impl Drop for ContainerScope<'_> {
    fn drop(&mut self) {
        // Every frame above `restore_depth` is open, so closing cannot fail.
        let _ = self.html.close_to(self.restore_depth);
    }
}

impl Deref for ContainerScope<'_> {
    type Target = HtmlBuilder;

    fn deref(&self) -> &Self::Target {
        self.html
    }
}

impl DerefMut for ContainerScope<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.html
    }
}

fn checked_element(tag: &str, attributes: Attributes) -> HtmlResult<Element> {
    validate_name(tag)?;
    attributes.validate()?;
    Ok(Element::new(tag, attributes))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::attrs;

    #[test]
    fn builds_flat_forest() {
        let mut html = HtmlBuilder::new();
        html.element("br", Attributes::new()).unwrap();
        html.text_element("span", attrs! { "class" => "x" }, "<hi>").unwrap();
        assert_eq!(
            html.render().unwrap().as_str(),
            "<br>\n<span class=\"x\">&lt;hi&gt;</span>"
        );
    }

    #[test]
    fn nest_closes_on_error() {
        let mut html = HtmlBuilder::new();
        let result: Result<(), HtmlError> = html.nest("div", Attributes::new(), |html| {
            html.element("hr", Attributes::new())?;
            Err(HtmlError::InvalidName("boom".into()))
        });
        assert!(result.is_err());
        assert_eq!(html.depth(), 0);
        assert_eq!(html.render().unwrap().as_str(), "<div>\n<hr>\n</div>");
    }

    #[test]
    fn nest_closes_after_panic() {
        let mut html = HtmlBuilder::new();
        let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _: Result<(), HtmlError> = html.nest("div", Attributes::new(), |html| {
                html.open("span", Attributes::new())?;
                panic!("inside container")
            });
        }));
        assert!(outcome.is_err());
        assert_eq!(html.depth(), 0);
        html.element("hr", Attributes::new()).unwrap();
        assert_eq!(
            html.render().unwrap().as_str(),
            "<div>\n<span></span>\n</div>\n<hr>"
        );
    }

    #[test]
    fn close_to_unwinds_nested_containers() {
        let mut html = HtmlBuilder::new();
        html.open("fieldset", Attributes::new()).unwrap();
        html.open("div", Attributes::new()).unwrap();
        html.close_to(0).unwrap();
        assert_eq!(html.render().unwrap().as_str(), "<fieldset>\n<div></div>\n</fieldset>");
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut html = HtmlBuilder::new();
        assert_eq!(
            html.element("in put", Attributes::new()),
            Err(HtmlError::InvalidName("in put".into()))
        );
        assert!(html.element("input", attrs! { "x\"y" => "z" }).is_err());
    }

    #[test]
    fn close_without_open_is_unbalanced() {
        let mut html = HtmlBuilder::new();
        assert_eq!(html.close(), Err(HtmlError::Unbalanced));
    }

    #[test]
    fn finish_with_open_container_fails() {
        let mut html = HtmlBuilder::new();
        html.open("fieldset", Attributes::new()).unwrap();
        assert_eq!(html.finish().unwrap_err(), HtmlError::Unbalanced);
    }
}
