//! Repeated children under one parent.

use std::fmt;
use std::marker::PhantomData;

use tracing::debug;

use crate::element::{Element, Parent, Widget};
use crate::locator::Locator;
use crate::result::PomResult;

/// Every node matching `child_locator` under `parent`, wrapped as `T`.
///
/// Nothing is cached between calls: each [`Collection::find_all`] queries
/// the session again. Members wrap the node they were found as and carry
/// no locator, so they go stale once the page re-renders; call
/// `find_all` again instead of holding on to them.
pub struct Collection<T: Widget = Element> {
    parent: Parent,
    child_locator: Locator,
    _child: PhantomData<fn() -> T>,
}

impl<T: Widget> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            parent: self.parent.clone(),
            child_locator: self.child_locator.clone(),
            _child: PhantomData,
        }
    }
}

impl<T: Widget> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("parent", &self.parent.describe())
            .field("child_locator", &self.child_locator)
            .finish()
    }
}

impl<T: Widget> Collection<T> {
    /// Declare a collection of `child_locator` matches under `parent`
    #[must_use]
    pub fn new(parent: impl Into<Parent>, child_locator: Locator) -> Self {
        Self {
            parent: parent.into(),
            child_locator,
            _child: PhantomData,
        }
    }

    /// Locator the children are found by
    #[must_use]
    pub fn child_locator(&self) -> &Locator {
        &self.child_locator
    }

    /// The unresolved parent
    #[must_use]
    pub fn parent(&self) -> &Parent {
        &self.parent
    }

    /// All current matches, in document order.
    ///
    /// Zero matches is an empty vector. There is no wait for children to
    /// appear, but resolving the parent may wait for the parent.
    pub fn find_all(&self) -> PomResult<Vec<T>> {
        let root = self.parent.resolve()?;
        let nodes = self
            .parent
            .session()
            .query_many(&root, &self.child_locator)?;
        debug!(locator = %self.child_locator, count = nodes.len(), "found collection");

        Ok(nodes
            .into_iter()
            .map(|node| T::from_element(Element::from_node(&self.parent, node)))
            .collect())
    }

    /// Number of current matches
    pub fn count(&self) -> PomResult<usize> {
        let root = self.parent.resolve()?;
        Ok(self
            .parent
            .session()
            .query_many(&root, &self.child_locator)?
            .len())
    }

    /// Text of every current match, in document order
    pub fn texts(&self) -> PomResult<Vec<String>> {
        self.find_all()?
            .iter()
            .map(|child| child.element().text())
            .collect()
    }
}
