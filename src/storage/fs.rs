use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::config::{Config, FORMAT_VERSION};
use crate::error::{Error, IoResultExt, Result};
use crate::storage::Storage;

const CONFIG_FILE: &str = "config.toml";

/// filesystem-backed store rooted at a directory
///
/// logical paths map directly onto the directory tree below the root.
/// writes are atomic per path: temp file under tmp/ -> fsync -> rename.
pub struct FsStore {
    root: PathBuf,
    config: Config,
}

impl FsStore {
    /// initialize a new store at the given path
    pub fn init(path: &Path) -> Result<Self> {
        let config_path = path.join(CONFIG_FILE);
        if config_path.exists() {
            return Err(Error::StoreExists(path.to_path_buf()));
        }

        // create directory structure
        fs::create_dir_all(path.join("objects")).with_path(path)?;
        fs::create_dir_all(path.join("refs/tags")).with_path(path)?;
        fs::create_dir_all(path.join("keys")).with_path(path)?;
        fs::create_dir_all(path.join("tmp")).with_path(path)?;

        let config = Config::default();
        config.save(&config_path)?;

        Ok(Self {
            root: path.to_path_buf(),
            config,
        })
    }

    /// open an existing store
    pub fn open(path: &Path) -> Result<Self> {
        let config_path = path.join(CONFIG_FILE);
        if !config_path.exists() {
            return Err(Error::NoStore(path.to_path_buf()));
        }

        let config = Config::load(&config_path)?;
        if config.format != FORMAT_VERSION {
            return Err(Error::IncompatibleFormat {
                expected: FORMAT_VERSION,
                found: config.format,
            });
        }

        Ok(Self {
            root: path.to_path_buf(),
            config,
        })
    }

    /// store root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// store configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn full_path(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }

    fn tmp_path(&self) -> PathBuf {
        self.root.join("tmp")
    }
}

impl Storage for FsStore {
    fn read(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let full = self.full_path(path);
        match fs::read(&full) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Io {
                path: full,
                source: e,
            }),
        }
    }

    fn write(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let full = self.full_path(path);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent).with_path(parent)?;
        }

        // atomic write: temp -> fsync -> rename
        let tmp = self.tmp_path().join(uuid::Uuid::new_v4().to_string());
        {
            let mut tmp_file = File::create(&tmp).with_path(&tmp)?;
            tmp_file.write_all(bytes).with_path(&tmp)?;
            tmp_file.sync_all().with_path(&tmp)?;
        }
        fs::rename(&tmp, &full).with_path(&full)?;

        // fsync parent directory
        if let Some(parent) = full.parent() {
            let dir = File::open(parent).with_path(parent)?;
            dir.sync_all().with_path(parent)?;
        }

        Ok(())
    }

    fn delete(&self, path: &str) -> Result<()> {
        let full = self.full_path(path);
        fs::remove_file(&full).with_path(&full)
    }

    fn nodes(&self, prefix: &str) -> Result<Vec<String>> {
        self.children(prefix, true)
    }

    fn leaves(&self, prefix: &str) -> Result<Vec<String>> {
        self.children(prefix, false)
    }

    fn exists(&self, path: &str) -> Result<bool> {
        Ok(self.full_path(path).is_file())
    }
}

impl FsStore {
    fn children(&self, prefix: &str, dirs: bool) -> Result<Vec<String>> {
        let full = self.full_path(prefix);
        let entries = match fs::read_dir(&full) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(Error::Io {
                    path: full,
                    source: e,
                })
            }
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.with_path(&full)?;
            let file_type = entry.file_type().with_path(entry.path())?;
            if file_type.is_dir() == dirs {
                names.push(entry.file_name().to_string_lossy().to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}
