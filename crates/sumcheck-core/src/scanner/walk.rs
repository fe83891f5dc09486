use crate::backend::TreeProvider;
use crate::error::Error;
use crate::model::{FileNode, NodeKind};
use std::vec::IntoIter;
use tracing::trace;

/// Depth-first, pre-order walk yielding every file under a root.
///
/// Folders are expanded through [`TreeProvider::listing`] in the order the
/// provider returns, and a folder's listing is exhausted before its next
/// sibling is looked at. Only one pending-sibling iterator is held per level,
/// so there is no recursion on the call stack.
///
/// A listing failure is yielded as [`Error::Listing`] and the walk carries on
/// with the remaining siblings.
pub struct FileWalker<'a> {
    tree: &'a dyn TreeProvider,
    root: Option<FileNode>,
    stack: Vec<IntoIter<FileNode>>,
}

impl<'a> FileWalker<'a> {
    pub fn new(tree: &'a dyn TreeProvider, root: FileNode) -> Self {
        Self {
            tree,
            root: Some(root),
            stack: Vec::new(),
        }
    }

    fn next_node(&mut self) -> Option<FileNode> {
        if let Some(root) = self.root.take() {
            return Some(root);
        }
        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(node) => return Some(node),
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

impl Iterator for FileWalker<'_> {
    type Item = Result<FileNode, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let node = self.next_node()?;
            match node.kind {
                NodeKind::File => return Some(Ok(node)),
                NodeKind::Folder => match self.tree.listing(&node) {
                    Ok(children) => {
                        trace!(
                            "Descending into {} ({} entries)",
                            node.display_path(),
                            children.len()
                        );
                        self.stack.push(children.into_iter());
                    }
                    Err(e) => {
                        return Some(Err(Error::Listing {
                            path: node.display_path(),
                            source: Box::new(e),
                        }))
                    }
                },
            }
        }
    }
}
