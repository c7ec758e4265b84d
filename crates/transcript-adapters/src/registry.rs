use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::adapter::Adapter;
use crate::claude::ClaudeAdapter;
use crate::error::{Error, Result};

type Table = RwLock<HashMap<&'static str, Arc<dyn Adapter>>>;

fn table() -> &'static Table {
    static TABLE: OnceLock<Table> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut map: HashMap<&'static str, Arc<dyn Adapter>> = HashMap::new();
        let claude = Arc::new(ClaudeAdapter::new());
        map.insert(claude.name(), claude);
        RwLock::new(map)
    })
}

/// Look up an adapter by `source` name (e.g. "claude").
pub fn get(source: &str) -> Result<Arc<dyn Adapter>> {
    table()
        .read()
        .expect("adapter registry lock poisoned")
        .get(source)
        .cloned()
        .ok_or_else(|| Error::UnknownSource(source.to_string()))
}

/// Register a custom adapter, overwriting any existing entry under the same name.
pub fn register(adapter: Arc<dyn Adapter>) {
    table()
        .write()
        .expect("adapter registry lock poisoned")
        .insert(adapter.name(), adapter);
}

/// Names of every adapter currently registered, built-ins included.
pub fn registered_names() -> Vec<&'static str> {
    table().read().expect("adapter registry lock poisoned").keys().copied().collect()
}
