//! Resolves web-style asset paths (`/assets/leather-texture.jpg`) against a
//! directory on disk.

use std::path::{Component, Path, PathBuf};

use anyhow::{Result, bail};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetRoot {
    root: PathBuf,
}

impl AssetRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// A leading `/` means "relative to the root", never the filesystem root.
    /// Paths that climb out of the root are rejected.
    pub fn resolve(&self, asset_path: &str) -> Result<PathBuf> {
        let relative = Path::new(asset_path.trim_start_matches('/'));
        let mut out = self.root.clone();
        for component in relative.components() {
            match component {
                Component::Normal(part) => out.push(part),
                Component::CurDir => {}
                _ => bail!("Asset path escapes the asset root: {asset_path:?}"),
            }
        }
        if out == self.root {
            bail!("Empty asset path");
        }
        Ok(out)
    }
}

impl Default for AssetRoot {
    fn default() -> Self {
        Self::new(".")
    }
}
