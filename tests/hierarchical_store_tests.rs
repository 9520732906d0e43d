use confstore::registry::MemoryKey;
use confstore::{
    ConfigError, HierarchicalStore, MemoryRegistry, RegistryBackend, RegistryKey, RegistryNode,
};

#[cfg(test)]
mod hierarchical_store_tests {
    use super::*;

    fn open(registry: &MemoryRegistry) -> HierarchicalStore<MemoryKey> {
        HierarchicalStore::open(registry, Some("Acme"), "Widget", RegistryNode::CurrentUser).unwrap()
    }

    #[test]
    fn test_base_key_layout() {
        let registry = MemoryRegistry::new();
        let store = open(&registry);
        store.set_key("version", Some("1.0")).unwrap();

        let root = registry.root(RegistryNode::CurrentUser).unwrap();
        let product = root
            .open_subkey("Software")
            .unwrap()
            .and_then(|k| k.open_subkey("Acme").unwrap())
            .and_then(|k| k.open_subkey("Widget").unwrap())
            .unwrap();
        assert_eq!(product.get_value("version").unwrap().as_deref(), Some("1.0"));
    }

    #[test]
    fn test_without_company() {
        let registry = MemoryRegistry::new();
        let store =
            HierarchicalStore::open(&registry, None, "Solo", RegistryNode::LocalMachine).unwrap();
        store.set_key("x", Some("y")).unwrap();
        assert_eq!(store.company(), None);
        assert_eq!(store.node(), RegistryNode::LocalMachine);

        let root = registry.root(RegistryNode::LocalMachine).unwrap();
        let solo = root
            .open_subkey("Software")
            .unwrap()
            .and_then(|k| k.open_subkey("Solo").unwrap())
            .unwrap();
        assert_eq!(solo.get_value("x").unwrap().as_deref(), Some("y"));
    }

    #[test]
    fn test_set_then_get() {
        let registry = MemoryRegistry::new();
        let store = open(&registry);
        store.set_key("name", Some("value")).unwrap();
        assert_eq!(store.get_key("name").unwrap(), "value");
        store.set_key("name", Some("other")).unwrap();
        assert_eq!(store.get_key("name").unwrap(), "other");
    }

    #[test]
    fn test_path_forms_are_equivalent() {
        let registry = MemoryRegistry::new();
        let store = open(&registry);
        store.set("a\\b", "x", Some("1")).unwrap();
        assert_eq!(store.get("a\\b", "x").unwrap(), "1");
        assert_eq!(store.get(["a", "b"], "x").unwrap(), store.get("a\\b", "x").unwrap());

        store.set(vec!["c", "d"], "y", Some("2")).unwrap();
        assert_eq!(store.get("c\\d", "y").unwrap(), "2");
    }

    #[test]
    fn test_missing_path_reads_empty_without_creating() {
        let registry = MemoryRegistry::new();
        let store = open(&registry);
        assert_eq!(store.get("no\\such\\key", "x").unwrap(), "");
        assert!(matches!(
            store.delete_subkey("no"),
            Err(ConfigError::KeyNotFound(_))
        ));
    }

    #[test]
    fn test_none_deletes_value() {
        let registry = MemoryRegistry::new();
        let store = open(&registry);
        store.set("s", "v", Some("1")).unwrap();
        store.set("s", "v", None).unwrap();
        assert_eq!(store.get("s", "v").unwrap(), "");
        // Deleting again is fine
        store.set("s", "v", None).unwrap();
    }

    #[test]
    fn test_delete_subkeys() {
        let registry = MemoryRegistry::new();
        let store = open(&registry);
        store.set("p\\leaf", "v", Some("1")).unwrap();
        store.set("p\\branch\\deep", "v", Some("2")).unwrap();

        store.delete_subkey_in("p", "leaf").unwrap();
        assert_eq!(store.get("p\\leaf", "v").unwrap(), "");

        assert!(matches!(
            store.delete_subkey_in("p", "branch"),
            Err(ConfigError::SubkeyHasChildren(_))
        ));
        assert!(matches!(
            store.delete_subkey_in("missing\\parent", "x"),
            Err(ConfigError::KeyNotFound(path)) if path == "missing\\parent"
        ));

        store.delete_subkey_tree_in(["p"], "branch").unwrap();
        assert_eq!(store.get("p\\branch\\deep", "v").unwrap(), "");

        store.delete_subkey_tree("p").unwrap();
        store.set("q", "v", Some("3")).unwrap();
        store.delete_subkey("q").unwrap();
        assert_eq!(store.get("q", "v").unwrap(), "");
    }

    #[test]
    fn test_handles_released() {
        let registry = MemoryRegistry::new();
        {
            let store = open(&registry);
            store.set("a\\b\\c", "v", Some("1")).unwrap();
            store.get("a\\b\\c", "v").unwrap();
            // Only the base key stays open between calls
            assert_eq!(registry.open_handles(), 1);
        }
        assert_eq!(registry.open_handles(), 0);
    }

    #[test]
    fn test_reopen_sees_previous_values() {
        let registry = MemoryRegistry::new();
        open(&registry).set("cfg", "k", Some("persisted")).unwrap();
        assert_eq!(open(&registry).get("cfg", "k").unwrap(), "persisted");
    }
}
