//! hierarchical author/tag/version pointers with semver range resolution
//!
//! a pointer lives at `refs/tags/<author>/<tag...>/v<version>` and holds one
//! line: the 40-hex content hash it names. tags may be hierarchical
//! ("runtime/linux"), versions are normalized to full major.minor.patch form
//! before use as a key.

use semver::{Version, VersionReq};

use crate::error::{Error, Result};
use crate::hash::ObjectId;
use crate::storage::Storage;

const TAGS_ROOT: &str = "refs/tags";

/// author -> tag -> version -> hash mapping over a backing store
pub struct VersionRegistry<'a, S: Storage> {
    storage: &'a S,
}

impl<'a, S: Storage> VersionRegistry<'a, S> {
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// write a version pointer (create or update, last write wins)
    pub fn write(&self, author: &str, tag: &str, version: &str, hash: &ObjectId) -> Result<()> {
        let path = version_path(author, tag, version)?;
        let mut line = hash.to_hex();
        line.push('\n');
        self.storage.write(&path, line.as_bytes())
    }

    /// read a version pointer; partial versions resolve like their
    /// normalized form ("1.2" reads the pointer written as "1.2.0")
    pub fn read(&self, author: &str, tag: &str, version: &str) -> Result<Option<ObjectId>> {
        let path = version_path(author, tag, version)?;
        let Some(bytes) = self.storage.read(&path)? else {
            return Ok(None);
        };

        // first 40 characters; tolerate the trailing newline
        let text = String::from_utf8_lossy(&bytes);
        let hex: String = text.chars().take(40).collect();
        Ok(Some(ObjectId::from_hex(&hex)?))
    }

    /// resolve a semver range to the best (highest) stored version
    ///
    /// returns the resolved version string alongside its hash, or `None`
    /// when no stored version satisfies the range. a pointer that vanishes
    /// between enumeration and the re-read is a consistency bug and fails
    /// with [`Error::VersionVanished`].
    pub fn resolve(
        &self,
        author: &str,
        tag: &str,
        range: &str,
    ) -> Result<Option<(String, ObjectId)>> {
        let req = VersionReq::parse(range).map_err(|source| Error::InvalidRange {
            range: range.to_string(),
            source,
        })?;

        let mut best: Option<Version> = None;
        for stored in self.versions(author, tag)? {
            // leaves that do not parse as versions are skipped, not errors
            let Ok(version) = Version::parse(&stored) else {
                continue;
            };
            if req.matches(&version) && best.as_ref().map_or(true, |b| version > *b) {
                best = Some(version);
            }
        }

        let Some(best) = best else {
            return Ok(None);
        };
        let resolved = best.to_string();
        match self.read(author, tag, &resolved)? {
            Some(hash) => Ok(Some((resolved, hash))),
            None => Err(Error::VersionVanished {
                author: author.to_string(),
                tag: tag.to_string(),
                version: resolved,
            }),
        }
    }

    /// every author with at least one tag
    pub fn authors(&self) -> Result<Vec<String>> {
        self.storage.nodes(TAGS_ROOT)
    }

    /// depth-first walk of one author's tag namespace
    ///
    /// yields every node path, including intermediate ones with no versions
    /// directly beneath them ("a" as well as "a/b").
    pub fn tags(&self, author: &str) -> Result<TagWalk<'a, S>> {
        validate_author(author)?;
        let root = format!("{}/{}", TAGS_ROOT, author);
        let mut stack = self.storage.nodes(&root)?;
        stack.reverse();
        Ok(TagWalk {
            storage: self.storage,
            root,
            stack,
        })
    }

    /// versions stored under one (author, tag) path
    pub fn versions(&self, author: &str, tag: &str) -> Result<Vec<String>> {
        validate_author(author)?;
        validate_tag(tag)?;
        let leaves = self
            .storage
            .leaves(&format!("{}/{}/{}", TAGS_ROOT, author, tag))?;
        Ok(leaves
            .into_iter()
            .filter_map(|leaf| leaf.strip_prefix('v').map(str::to_string))
            .collect())
    }
}

/// depth-first iterator over tag node paths
///
/// traversal state is an explicit stack of pending node paths rather than
/// recursion, so it can be suspended and inspected mid-walk.
pub struct TagWalk<'a, S: Storage> {
    storage: &'a S,
    root: String,
    stack: Vec<String>,
}

impl<S: Storage> Iterator for TagWalk<'_, S> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = self.stack.pop()?;
        match self.storage.nodes(&format!("{}/{}", self.root, path)) {
            Ok(children) => {
                for child in children.into_iter().rev() {
                    self.stack.push(format!("{}/{}", path, child));
                }
            }
            Err(e) => return Some(Err(e)),
        }
        Some(Ok(path))
    }
}

/// normalize a version string: partial forms are filled out to full
/// major.minor.patch ("1" -> "1.0.0", "1.2" -> "1.2.0")
pub fn normalize_version(version: &str) -> Result<String> {
    let padded = pad_version(version.trim());
    let parsed = Version::parse(&padded).map_err(|source| Error::InvalidVersion {
        version: version.to_string(),
        source,
    })?;
    Ok(parsed.to_string())
}

fn pad_version(version: &str) -> String {
    // split the numeric core from any pre-release/build suffix
    let (core, suffix) = match version.find(['-', '+']) {
        Some(i) => version.split_at(i),
        None => (version, ""),
    };
    match core.matches('.').count() {
        0 => format!("{}.0.0{}", core, suffix),
        1 => format!("{}.0{}", core, suffix),
        _ => version.to_string(),
    }
}

fn version_path(author: &str, tag: &str, version: &str) -> Result<String> {
    validate_author(author)?;
    validate_tag(tag)?;
    let normalized = normalize_version(version)?;
    Ok(format!("{}/{}/{}/v{}", TAGS_ROOT, author, tag, normalized))
}

/// authors are single path segments
fn validate_author(author: &str) -> Result<()> {
    if author.is_empty()
        || author.contains('/')
        || author.contains('\0')
        || author == "."
        || author == ".."
    {
        return Err(Error::InvalidName(format!("author: {:?}", author)));
    }
    Ok(())
}

/// tags may be hierarchical but every segment must be a plain name
fn validate_tag(tag: &str) -> Result<()> {
    if tag.is_empty() || tag.starts_with('/') || tag.ends_with('/') {
        return Err(Error::InvalidName(format!("tag: {:?}", tag)));
    }
    if tag.contains("//") || tag.contains('\0') {
        return Err(Error::InvalidName(format!("tag: {:?}", tag)));
    }
    for segment in tag.split('/') {
        if segment == "." || segment == ".." {
            return Err(Error::InvalidName(format!("tag: {:?}", tag)));
        }
    }
    Ok(())
}
