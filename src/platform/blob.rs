//! Temporary in-memory download buffers addressed by `blob:` URLs

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use log::debug;

#[derive(Default)]
struct Inner {
    next_id: AtomicU64,
    live: Mutex<HashMap<u64, Arc<[u8]>>>,
}

/// Registry of live blob buffers. Cloning shares the registry.
#[derive(Clone, Default)]
pub struct BlobRegistry {
    inner: Arc<Inner>,
}

impl BlobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` and return a handle that revokes them on drop.
    pub fn register(&self, bytes: Vec<u8>) -> BlobHandle {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let data: Arc<[u8]> = bytes.into();
        self.inner
            .live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id, Arc::clone(&data));
        BlobHandle {
            id,
            url: format!("blob:pokecard/{}", id),
            data,
            registry: Arc::clone(&self.inner),
        }
    }

    /// Number of buffers not yet revoked.
    pub fn live(&self) -> usize {
        self.inner.live.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// A registered buffer. Dropping it revokes the URL.
pub struct BlobHandle {
    id: u64,
    url: String,
    data: Arc<[u8]>,
    registry: Arc<Inner>,
}

impl BlobHandle {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Drop for BlobHandle {
    fn drop(&mut self) {
        self.registry
            .live
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.id);
        debug!("revoked {}", self.url);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_revoke_on_drop() {
        let reg = BlobRegistry::new();
        let a = reg.register(vec![1]);
        let b = reg.register(vec![2, 3]);
        assert_ne!(a.url(), b.url());
        assert!(a.url().starts_with("blob:pokecard/"));
        assert_eq!(reg.live(), 2);
        assert_eq!(b.bytes(), &[2u8, 3][..]);

        drop(a);
        assert_eq!(reg.live(), 1);
        drop(b);
        assert_eq!(reg.live(), 0);
    }

    #[test]
    fn clones_share_one_registry() {
        let reg = BlobRegistry::new();
        let other = reg.clone();
        let h = other.register(vec![9]);
        assert_eq!(reg.live(), 1);
        drop(h);
        assert_eq!(reg.live(), 0);
    }
}
