use std::path::{Path, PathBuf};

use crate::env::Data;

/// A trait abstracting where the asset containers are read from.
pub trait EnvResolver {
    fn read_path(&self, path: &Path) -> Result<Data, std::io::Error>;
    fn all_files(&self) -> Result<Vec<PathBuf>, std::io::Error>;
}

impl<T: EnvResolver> EnvResolver for &T {
    fn read_path(&self, path: &Path) -> Result<Data, std::io::Error> {
        (**self).read_path(path)
    }

    fn all_files(&self) -> Result<Vec<PathBuf>, std::io::Error> {
        (**self).all_files()
    }
}
