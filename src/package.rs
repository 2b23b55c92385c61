use std::cmp::Ordering;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;
use zip::ZipArchive;

use crate::env::Data;
use crate::error::ExtractError;
use crate::resolver::EnvResolver;

pub const GLOBAL_GAME_MANAGERS: &str = "assets/bin/Data/globalgamemanagers.assets";
pub const LEVEL0: &str = "assets/bin/Data/level0";
pub const LEVEL22_SPLIT_PREFIX: &str = "assets/bin/Data/level22.split";
pub const IL2CPP_BINARY: &str = "lib/arm64-v8a/libil2cpp.so";
pub const GLOBAL_METADATA: &str = "assets/bin/Data/Managed/Metadata/global-metadata.dat";

/// The raw payloads pulled out of the game package.
pub struct PackagePayloads {
    pub global_game_managers: Vec<u8>,
    pub level0: Vec<u8>,
    pub level22: Vec<u8>,
    pub il2cpp: Vec<u8>,
    pub metadata: Vec<u8>,
}

impl PackagePayloads {
    pub fn read(path: impl AsRef<Path>) -> Result<PackagePayloads> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("could not open package '{}'", path.display()))?;
        PackagePayloads::from_archive(BufReader::new(file))
            .with_context(|| format!("failed to read package '{}'", path.display()))
    }

    pub fn from_archive(reader: impl Read + Seek) -> Result<PackagePayloads> {
        let mut archive = ZipArchive::new(reader)?;

        let mut global_game_managers = None;
        let mut level0 = None;
        let mut il2cpp = None;
        let mut metadata = None;
        let mut level22_parts = Vec::new();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_owned();

            let slot = match name.as_str() {
                GLOBAL_GAME_MANAGERS => &mut global_game_managers,
                LEVEL0 => &mut level0,
                IL2CPP_BINARY => &mut il2cpp,
                GLOBAL_METADATA => &mut metadata,
                _ => match name.strip_prefix(LEVEL22_SPLIT_PREFIX) {
                    Some(suffix) => {
                        let index = SplitIndex::parse(suffix).ok_or_else(|| {
                            ExtractError::InvalidSplitPart {
                                entry: name.clone(),
                            }
                        })?;
                        let data = read_entry(&mut entry, &name)?;
                        level22_parts.push((index, data));
                        continue;
                    }
                    None => continue,
                },
            };
            *slot = Some(read_entry(&mut entry, &name)?);
        }

        let require = |data: Option<Vec<u8>>, path: &'static str| {
            data.ok_or(ExtractError::MissingArchiveEntry { path })
        };
        let global_game_managers = require(global_game_managers, GLOBAL_GAME_MANAGERS)?;
        let level0 = require(level0, LEVEL0)?;
        let il2cpp = require(il2cpp, IL2CPP_BINARY)?;
        let metadata = require(metadata, GLOBAL_METADATA)?;
        if level22_parts.is_empty() {
            return Err(ExtractError::MissingSplitParts {
                prefix: LEVEL22_SPLIT_PREFIX,
            }
            .into());
        }

        tracing::info!("reassembling level22 from {} parts", level22_parts.len());
        let level22 = concat_split_parts(level22_parts);

        Ok(PackagePayloads {
            global_game_managers,
            level0,
            level22,
            il2cpp,
            metadata,
        })
    }
}

fn read_entry(entry: &mut impl Read, name: &str) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    entry
        .read_to_end(&mut data)
        .with_context(|| format!("failed to extract '{name}'"))?;
    tracing::debug!("extracted '{}' ({} bytes)", name, data.len());
    Ok(data)
}

/// Sorts by numeric index and concatenates.
fn concat_split_parts(mut parts: Vec<(SplitIndex, Vec<u8>)>) -> Vec<u8> {
    parts.sort_by(|(a, _), (b, _)| a.cmp(b));

    let len = parts.iter().map(|(_, data)| data.len()).sum();
    let mut out = Vec::with_capacity(len);
    for (_, data) in parts {
        out.extend_from_slice(&data);
    }
    out
}

/// Numeric suffix of a split part. Compared by value, with no upper bound on the
/// number of digits.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SplitIndex(String);

impl SplitIndex {
    fn parse(suffix: &str) -> Option<SplitIndex> {
        if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let trimmed = suffix.trim_start_matches('0');
        Some(SplitIndex(trimmed.to_owned()))
    }
}

impl Ord for SplitIndex {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}
impl PartialOrd for SplitIndex {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The asset containers of a package, addressable by their display name.
pub struct PackageFiles {
    files: FxHashMap<PathBuf, Arc<[u8]>>,
}

impl PackageFiles {
    pub const GLOBAL_GAME_MANAGERS: &'static str = "globalgamemanagers.assets";
    pub const LEVEL0: &'static str = "level0";
    pub const LEVEL22: &'static str = "level22";

    pub fn new<'a>(files: impl IntoIterator<Item = (&'a str, Vec<u8>)>) -> Self {
        PackageFiles {
            files: files
                .into_iter()
                .map(|(name, data)| (PathBuf::from(name), Arc::from(data)))
                .collect(),
        }
    }
}

impl EnvResolver for PackageFiles {
    fn read_path(&self, path: &Path) -> Result<Data, std::io::Error> {
        match self.files.get(path) {
            Some(data) => Ok(Arc::clone(data)),
            None => {
                let available = self
                    .all_files()?
                    .iter()
                    .map(|path| path.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                Err(std::io::Error::new(
                    ErrorKind::NotFound,
                    format!(
                        "File '{}' is not part of the package. Available: {available}",
                        path.display()
                    ),
                ))
            }
        }
    }

    fn all_files(&self) -> Result<Vec<PathBuf>, std::io::Error> {
        let mut all = self.files.keys().cloned().collect::<Vec<_>>();
        all.sort();
        Ok(all)
    }
}
