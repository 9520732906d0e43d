//! In-process registry backend
//!
//! Key and value names are case-insensitive, as in the Windows registry.
//! Clones of a [`MemoryRegistry`] share the same tree.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use super::{RegistryBackend, RegistryKey, RegistryNode, PATH_SEPARATOR};
use crate::error::{ConfigError, Result};
use crate::utils::key::fold_key;

type NodeRef = Rc<RefCell<MemoryNode>>;

#[derive(Debug, Default)]
struct MemoryNode {
    values: BTreeMap<String, String>,
    children: BTreeMap<String, NodeRef>,
}

fn fold(name: &str) -> String {
    fold_key(name, true).into_owned()
}

#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    current_user: NodeRef,
    local_machine: NodeRef,
    open_handles: Rc<Cell<usize>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of key handles currently open against this tree.
    pub fn open_handles(&self) -> usize {
        self.open_handles.get()
    }
}

impl RegistryBackend for MemoryRegistry {
    type Key = MemoryKey;

    fn root(&self, node: RegistryNode) -> Result<MemoryKey> {
        let (root, name) = match node {
            RegistryNode::CurrentUser => (&self.current_user, "HKEY_CURRENT_USER"),
            RegistryNode::LocalMachine => (&self.local_machine, "HKEY_LOCAL_MACHINE"),
        };
        Ok(MemoryKey::new(root.clone(), name.to_string(), &self.open_handles))
    }
}

/// Handle to one key of a [`MemoryRegistry`].
#[derive(Debug)]
pub struct MemoryKey {
    node: NodeRef,
    /// Full path, used in error messages
    path: String,
    open_handles: Rc<Cell<usize>>,
}

impl MemoryKey {
    fn new(node: NodeRef, path: String, open_handles: &Rc<Cell<usize>>) -> Self {
        open_handles.set(open_handles.get() + 1);
        MemoryKey {
            node,
            path,
            open_handles: open_handles.clone(),
        }
    }

    fn child(&self, node: NodeRef, name: &str) -> Self {
        MemoryKey::new(node, self.child_path(name), &self.open_handles)
    }

    fn child_path(&self, name: &str) -> String {
        format!("{}{}{}", self.path, PATH_SEPARATOR, name)
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl Drop for MemoryKey {
    fn drop(&mut self) {
        self.open_handles.set(self.open_handles.get().saturating_sub(1));
    }
}

impl RegistryKey for MemoryKey {
    fn create_subkey(&self, name: &str) -> Result<Self> {
        let node = self
            .node
            .borrow_mut()
            .children
            .entry(fold(name))
            .or_default()
            .clone();
        Ok(self.child(node, name))
    }

    fn open_subkey(&self, name: &str) -> Result<Option<Self>> {
        let node = self.node.borrow().children.get(&fold(name)).cloned();
        Ok(node.map(|node| self.child(node, name)))
    }

    fn get_value(&self, name: &str) -> Result<Option<String>> {
        Ok(self.node.borrow().values.get(&fold(name)).cloned())
    }

    fn set_value(&self, name: &str, value: &str) -> Result<()> {
        self.node
            .borrow_mut()
            .values
            .insert(fold(name), value.to_string());
        Ok(())
    }

    fn delete_value(&self, name: &str) -> Result<()> {
        self.node.borrow_mut().values.remove(&fold(name));
        Ok(())
    }

    fn delete_subkey(&self, name: &str) -> Result<()> {
        let folded = fold(name);
        let mut node = self.node.borrow_mut();
        let has_children = match node.children.get(&folded) {
            Some(child) => !child.borrow().children.is_empty(),
            None => return Err(ConfigError::KeyNotFound(self.child_path(name))),
        };
        if has_children {
            return Err(ConfigError::SubkeyHasChildren(self.child_path(name)));
        }
        node.children.remove(&folded);
        Ok(())
    }

    fn delete_subkey_tree(&self, name: &str) -> Result<()> {
        match self.node.borrow_mut().children.remove(&fold(name)) {
            Some(_) => Ok(()),
            None => Err(ConfigError::KeyNotFound(self.child_path(name))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_case_insensitive() {
        let registry = MemoryRegistry::new();
        let root = registry.root(RegistryNode::CurrentUser).unwrap();
        let key = root.create_subkey("Vendor").unwrap();
        key.set_value("Name", "v").unwrap();

        let reopened = root.open_subkey("VENDOR").unwrap().unwrap();
        assert_eq!(reopened.get_value("name").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_roots_are_separate() {
        let registry = MemoryRegistry::new();
        let user = registry.root(RegistryNode::CurrentUser).unwrap();
        user.create_subkey("Only").unwrap();
        let machine = registry.root(RegistryNode::LocalMachine).unwrap();
        assert!(machine.open_subkey("Only").unwrap().is_none());
    }

    #[test]
    fn test_handle_accounting() {
        let registry = MemoryRegistry::new();
        {
            let root = registry.root(RegistryNode::CurrentUser).unwrap();
            let _child = root.create_subkey("a").unwrap();
            assert_eq!(registry.open_handles(), 2);
        }
        assert_eq!(registry.open_handles(), 0);
    }

    #[test]
    fn test_delete_subkey_rules() {
        let registry = MemoryRegistry::new();
        let root = registry.root(RegistryNode::CurrentUser).unwrap();
        root.create_subkey("parent").unwrap().create_subkey("child").unwrap();

        assert!(matches!(
            root.delete_subkey("parent"),
            Err(ConfigError::SubkeyHasChildren(path)) if path == "HKEY_CURRENT_USER\\parent"
        ));
        assert!(matches!(root.delete_subkey("absent"), Err(ConfigError::KeyNotFound(_))));

        root.delete_subkey_tree("parent").unwrap();
        assert!(root.open_subkey("parent").unwrap().is_none());
        assert!(matches!(root.delete_subkey_tree("parent"), Err(ConfigError::KeyNotFound(_))));
    }

    #[test]
    fn test_delete_missing_value_is_noop() {
        let registry = MemoryRegistry::new();
        let root = registry.root(RegistryNode::CurrentUser).unwrap();
        root.delete_value("nothing").unwrap();
    }
}
