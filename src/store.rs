//! In-memory key-value store implementation with thread-safe access
//!
//! A single reader/writer lock guards the map: `get`, `exists` and `len`
//! share it, `set` and `del` take it exclusively. Values are copied on the
//! way in and on the way out, so nothing the caller holds ever aliases
//! stored data.

use crate::error::{Result, StoreError};
use crate::value::Value;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Thread-safe in-memory key-value store
///
/// Share between threads or tasks with `Arc<Store>`.
#[derive(Debug, Default)]
pub struct Store {
    data: RwLock<HashMap<String, Value>>,
}

impl Store {
    /// Create a new, empty store
    pub fn new() -> Self {
        Self {
            data: RwLock::new(HashMap::new()),
        }
    }

    /// Get a copy of the value stored under `key`
    ///
    /// Returns `None` when the key is absent or empty. A present entry that
    /// was written as nil comes back as `Some(Value::Nil)`.
    pub fn get(&self, key: &str) -> Option<Value> {
        if key.is_empty() {
            return None;
        }
        let data = self.data.read();
        data.get(key).cloned()
    }

    /// Store a copy of `value` under `key`, replacing any previous value
    pub fn set(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        if key.is_empty() {
            return Err(StoreError::EmptyKey);
        }
        // Copy before locking so the critical section is just the insert.
        let value = value.into();
        let mut data = self.data.write();
        data.insert(key.to_owned(), value);
        Ok(())
    }

    /// Delete `key`, returning whether it was present
    pub fn del(&self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        let mut data = self.data.write();
        data.remove(key).is_some()
    }

    /// Check if a key exists
    pub fn exists(&self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        let data = self.data.read();
        data.contains_key(key)
    }

    /// Get the number of stored items
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::{self, RecvTimeoutError};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    const BLOCKED_FOR: Duration = Duration::from_millis(300);
    const COMPLETES_WITHIN: Duration = Duration::from_secs(5);

    #[test]
    fn test_store_basic_operations() {
        let store = Store::new();

        store.set("key1", "value1").unwrap();
        assert_eq!(store.get("key1"), Some(Value::from("value1")));

        assert!(store.exists("key1"));
        assert!(!store.exists("nonexistent"));

        assert!(store.del("key1"));
        assert!(!store.del("key1")); // Already deleted

        assert_eq!(store.get("key1"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_empty_key_never_touches_map() {
        let store = Store::new();
        store.set("k", "v").unwrap();

        assert_eq!(store.set("", "x"), Err(StoreError::EmptyKey));
        assert_eq!(store.get(""), None);
        assert!(!store.exists(""));
        assert!(!store.del(""));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_overwrite_replaces_value() {
        let store = Store::new();
        store.set("k", "first-and-longer").unwrap();
        store.set("k", "v2").unwrap();

        assert_eq!(store.get("k"), Some(Value::from("v2")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_nil_and_empty_values_are_distinct() {
        let store = Store::new();
        store.set("nil", None::<&[u8]>).unwrap();
        store.set("empty", &b""[..]).unwrap();

        assert_eq!(store.get("nil"), Some(Value::Nil));
        assert_eq!(store.get("empty"), Some(Value::Bytes(Vec::new())));
        assert_eq!(store.get("missing"), None);
        assert!(store.exists("nil"));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_len_counts_distinct_keys() {
        let store = Store::new();
        for i in 0..5 {
            store.set(&format!("key{}", i), "v").unwrap();
        }
        store.set("key0", "again").unwrap();
        assert_eq!(store.len(), 5);

        store.del("key3");
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_independent_stores() {
        let a = Store::new();
        let b = Store::new();
        a.set("k", "v").unwrap();

        assert!(a.exists("k"));
        assert!(!b.exists("k"));
    }

    #[test]
    fn test_readers_share_lock_writer_waits() {
        let store = Store::new();
        store.set("k", "v").unwrap();
        let store = &store;
        let guard = store.data.read();

        thread::scope(|s| {
            // A second reader gets in while the read guard is held.
            let (read_tx, read_rx) = mpsc::channel();
            s.spawn(move || {
                let seen = (store.get("k"), store.exists("k"), store.len());
                read_tx.send(seen).unwrap();
            });
            let (value, exists, len) = read_rx.recv_timeout(COMPLETES_WITHIN).unwrap();
            assert_eq!(value, Some(Value::from("v")));
            assert!(exists);
            assert_eq!(len, 1);

            // A writer does not.
            let (write_tx, write_rx) = mpsc::channel();
            s.spawn(move || {
                store.set("k", "w").unwrap();
                write_tx.send(()).unwrap();
            });
            assert_eq!(write_rx.recv_timeout(BLOCKED_FOR), Err(RecvTimeoutError::Timeout));
            assert_eq!(guard.get("k"), Some(&Value::from("v")));

            drop(guard);
            write_rx.recv_timeout(COMPLETES_WITHIN).unwrap();
        });

        assert_eq!(store.get("k"), Some(Value::from("w")));
    }

    #[test]
    fn test_writer_excludes_readers_and_writers() {
        let store = Store::new();
        store.set("k", "v").unwrap();
        let store = &store;
        let guard = store.data.write();

        thread::scope(|s| {
            let (read_tx, read_rx) = mpsc::channel();
            s.spawn(move || read_tx.send(store.get("k")).unwrap());
            let (del_tx, del_rx) = mpsc::channel();
            s.spawn(move || del_tx.send(store.del("k")).unwrap());

            assert_eq!(read_rx.recv_timeout(BLOCKED_FOR), Err(RecvTimeoutError::Timeout));
            assert_eq!(del_rx.recv_timeout(BLOCKED_FOR), Err(RecvTimeoutError::Timeout));

            drop(guard);
            assert!(del_rx.recv_timeout(COMPLETES_WITHIN).unwrap());
            // The read may land on either side of the delete.
            let read = read_rx.recv_timeout(COMPLETES_WITHIN).unwrap();
            assert!(read.is_none() || read == Some(Value::from("v")));
        });

        assert!(!store.exists("k"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_store_shared_across_tasks() {
        let store = Arc::new(Store::new());
        let mut handles = vec![];

        for i in 0..10 {
            let store_clone = Arc::clone(&store);
            let handle = tokio::spawn(async move {
                let key = format!("key{}", i);
                let value = format!("value{}", i);
                store_clone.set(&key, value.as_str()).unwrap();
                assert_eq!(store_clone.get(&key), Some(Value::from(value.as_str())));
            });
            handles.push(handle);
        }

        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len(), 10);
    }
}
