use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::debug;

use tessera_schema::Registry;
use tessera_store::FsObjectStore;
use tessera_types::Reference;

/// Name index file, next to the object directory.
const NAMES_FILE: &str = "names.json";

/// An on-disk store together with its persisted name index.
pub struct Workspace {
    root: PathBuf,
    store: Arc<FsObjectStore>,
    registry: Arc<Registry>,
}

impl Workspace {
    /// Create the store layout at `root` if needed and open it.
    pub fn init(root: &Path) -> anyhow::Result<Self> {
        FsObjectStore::open(root)
            .with_context(|| format!("creating store at {}", root.display()))?;
        let names = root.join(NAMES_FILE);
        if !names.exists() {
            std::fs::write(&names, "{}\n")
                .with_context(|| format!("writing {}", names.display()))?;
        }
        Self::open(root)
    }

    /// Open an existing store and load its name index.
    pub fn open(root: &Path) -> anyhow::Result<Self> {
        if !root.join("objects").is_dir() {
            bail!(
                "no store at {} (run `tessera init` first)",
                root.display()
            );
        }
        let store = Arc::new(FsObjectStore::open(root)?);
        let registry = Arc::new(Registry::new(store.clone()));
        let workspace = Self {
            root: root.to_path_buf(),
            store,
            registry,
        };
        workspace.load_names()?;
        Ok(workspace)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn store(&self) -> &Arc<FsObjectStore> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    fn names_path(&self) -> PathBuf {
        self.root.join(NAMES_FILE)
    }

    fn load_names(&self) -> anyhow::Result<()> {
        let path = self.names_path();
        if !path.exists() {
            return Ok(());
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let names: BTreeMap<String, Reference> = serde_json::from_str(&text)
            .with_context(|| format!("parsing {}", path.display()))?;
        for (name, reference) in names {
            self.registry
                .bind(&name, reference)
                .with_context(|| format!("binding {name} from {}", path.display()))?;
        }
        debug!(path = %path.display(), "name index loaded");
        Ok(())
    }

    /// Write the registry's name index back to disk.
    pub fn save_names(&self) -> anyhow::Result<()> {
        let names: BTreeMap<String, Reference> = self.registry.names().into_iter().collect();
        let path = self.names_path();
        let mut text = serde_json::to_string_pretty(&names)?;
        text.push('\n');
        std::fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
        debug!(path = %path.display(), names = names.len(), "name index saved");
        Ok(())
    }
}
