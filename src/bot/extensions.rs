//! Extension loading - discovering cog manifests and registering the cogs they name.
//!
//! Cogs are compiled into the bot and collected in a [`CogCatalog`]. The cog
//! directory decides which of them run: every `<name>.toml` file in it enables
//! the cog called `<name>`. Manifests are loaded sorted by file name, one at a
//! time, so a cog may rely on the ones before it being fully registered.

use crate::{
    bot::{BotHost, Command},
    errors::{Error, Result},
};
use async_trait::async_trait;
use serde::Deserialize;
use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

/// Namespace prefixed to every extension id.
pub const EXTENSION_NAMESPACE: &str = "cogs";
/// File suffix of a cog manifest.
pub const MANIFEST_SUFFIX: &str = ".toml";

/// A self-contained plugin providing a group of related commands.
#[async_trait]
pub trait Cog: Send + Sync {
    /// Name matched against manifest file stems.
    fn name(&self) -> &'static str;

    /// One-line summary shown in `/help`.
    fn description(&self) -> &'static str {
        ""
    }

    /// Commands this cog contributes to the framework.
    fn commands(&self) -> Vec<Command>;

    /// Runs once while the extension is being registered.
    async fn setup(&self, _host: &BotHost) -> Result<()> {
        Ok(())
    }
}

/// The set of cogs compiled into the binary, keyed by name.
#[derive(Default)]
pub struct CogCatalog {
    cogs: BTreeMap<&'static str, Box<dyn Cog>>,
}

impl CogCatalog {
    /// An empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a cog, replacing any earlier one with the same name.
    #[must_use]
    pub fn with(mut self, cog: impl Cog + 'static) -> Self {
        self.cogs.insert(cog.name(), Box::new(cog));
        self
    }

    /// Looks up a cog by name.
    pub fn get(&self, name: &str) -> Option<&dyn Cog> {
        self.cogs.get(name).map(|cog| &**cog)
    }

    /// Names of all available cogs, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.cogs.keys().copied()
    }
}

impl fmt::Debug for CogCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.cogs.keys()).finish()
    }
}

/// Identifier of a loaded extension, displayed as `cogs.<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtensionId {
    /// Always [`EXTENSION_NAMESPACE`]
    pub namespace: String,
    /// Manifest file stem, which is also the cog name
    pub name: String,
}

impl ExtensionId {
    /// Id of the cog called `name` in the default namespace.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            namespace: EXTENSION_NAMESPACE.to_string(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// Optional contents of a cog manifest.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct CogManifest {
    /// Shown in the startup log
    #[serde(default)]
    pub description: Option<String>,
}

/// A manifest found in the cog directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredExtension {
    pub id: ExtensionId,
    /// Location of the manifest file
    pub path: PathBuf,
    pub manifest: CogManifest,
}

/// Scans the cog directory and registers each extension with the host.
#[derive(Debug, Clone)]
pub struct ExtensionLoader {
    dir: PathBuf,
}

impl ExtensionLoader {
    /// A loader for the manifests in `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Lists the manifests in the cog directory, sorted by file name.
    ///
    /// Subdirectories and files without the manifest suffix are ignored.
    pub fn discover(&self) -> Result<Vec<DiscoveredExtension>> {
        let mut found = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let Some(stem) = file_name
                .to_str()
                .and_then(|name| name.strip_suffix(MANIFEST_SUFFIX))
            else {
                continue;
            };
            if stem.is_empty() {
                continue;
            }

            let path = entry.path();
            found.push(DiscoveredExtension {
                id: ExtensionId::new(stem),
                manifest: read_manifest(&path)?,
                path,
            });
        }

        found.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
        Ok(found)
    }

    /// Registers every discovered extension, in order, stopping at the first failure.
    #[instrument(skip(self, host, catalog), fields(dir = %self.dir.display()))]
    pub async fn load_all(&self, host: &mut BotHost, catalog: &CogCatalog) -> Result<Vec<ExtensionId>> {
        let mut loaded = Vec::new();
        for extension in self.discover()? {
            match &extension.manifest.description {
                Some(description) => info!("Loading extension: {} ({})", extension.id, description),
                None => info!("Loading extension: {}", extension.id),
            }
            host.load_extension(&extension.id, catalog).await?;
            loaded.push(extension.id);
        }
        info!("Finished loading {} extensions", loaded.len());
        Ok(loaded)
    }
}

fn read_manifest(path: &Path) -> Result<CogManifest> {
    let contents = fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|e| Error::InvalidManifest {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
