use std::io::{Cursor, Read, Seek};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use anyhow::{Context, Result};
use elsa::sync::FrozenMap;
use rabex::UnityVersion;
use rabex::files::SerializedFile;
use rabex::files::serializedfile::ObjectRef;
use rabex::objects::{ClassId, PPtr, TypedPPtr};
use rabex::tpk::TpkTypeTreeBlob;
use rabex::typetree::TypeTreeProvider;
use rabex::typetree::typetree_cache::sync::TypeTreeCache;
use typetree_generator_api::{GeneratorBackend, TypeTreeGenerator};

use crate::handle::SerializedFileHandle;
use crate::package::PackageFiles;
use crate::resolver::EnvResolver;
use crate::scratch::Il2CppScratch;
use crate::typetree_generator_cache::TypeTreeGeneratorCache;
use crate::unity::types::{MonoBehaviour, MonoScript};

/// Bytes of an asset container, shared with the resolver that produced them.
pub type Data = Arc<[u8]>;

pub struct Environment<R = PackageFiles, P = TypeTreeCache<TpkTypeTreeBlob>> {
    pub files: R,
    pub tpk: P,
    pub typetree_generator: TypeTreeGeneratorCache,
    serialized_files: FrozenMap<PathBuf, Box<(SerializedFile, Data)>>,
    unity_version: OnceLock<UnityVersion>,
}

impl<R, P> Environment<R, P> {
    pub fn new(resolver: R, tpk: P) -> Self {
        Environment {
            files: resolver,
            tpk,
            serialized_files: Default::default(),
            typetree_generator: TypeTreeGeneratorCache::empty(),
            unity_version: OnceLock::new(),
        }
    }
}

impl<R: EnvResolver, P: TypeTreeProvider> Environment<R, P> {
    /// Initializes [`Environment::typetree_generator`] from the IL2CPP binary and its metadata.
    /// Requires `libTypeTreeGenerator.so`/`TypeTreeGenerator.dll` next to the executing binary.
    pub fn load_il2cpp_typetree_generator(
        &mut self,
        backend: GeneratorBackend,
        scratch: &Il2CppScratch,
    ) -> Result<()> {
        let unity_version = self.unity_version()?;
        let generator = TypeTreeGenerator::new_lib_next_to_exe(unity_version, backend)?;

        let (il2cpp, metadata) = scratch.map();
        generator
            .load_il2cpp(il2cpp, metadata)
            .context("could not load il2cpp metadata")?;

        let base_node = self
            .tpk
            .get_typetree_node(ClassId::MonoBehaviour, unity_version)
            .context("missing MonoBehaviour class in class database")?;
        self.typetree_generator = TypeTreeGeneratorCache::new(generator, base_node.into_owned());

        Ok(())
    }

    pub fn unity_version(&self) -> Result<&UnityVersion> {
        match self.unity_version.get() {
            Some(unity_version) => Ok(unity_version),
            None => {
                let ggm = self.load_cached(PackageFiles::GLOBAL_GAME_MANAGERS)?;
                let unity_version = ggm
                    .file
                    .m_UnityVersion
                    .clone()
                    .context("missing unity version in globalgamemanagers")?;
                Ok(self.unity_version.get_or_init(|| unity_version))
            }
        }
    }

    pub fn load_cached(
        &self,
        relative_path: impl AsRef<Path>,
    ) -> Result<SerializedFileHandle<'_, R, P>> {
        self.load_external_file(relative_path.as_ref())
    }

    pub(crate) fn load_external_file(
        &self,
        path_name: &Path,
    ) -> Result<SerializedFileHandle<'_, R, P>> {
        Ok(match self.serialized_files.get(path_name) {
            Some((file, data)) => SerializedFileHandle::new(self, file, data.as_ref()),
            None => {
                let data = self
                    .files
                    .read_path(path_name)
                    .with_context(|| format!("Cannot read file {}", path_name.display()))?;
                let serialized = SerializedFile::from_reader(&mut Cursor::new(data.as_ref()))
                    .with_context(|| format!("Failed to parse {}", path_name.display()))?;
                tracing::debug!(
                    "loaded {} ({} objects)",
                    path_name.display(),
                    serialized.objects().len()
                );
                let file = self
                    .serialized_files
                    .insert(path_name.to_owned(), Box::new((serialized, data)));
                SerializedFileHandle::new(self, &file.0, file.1.as_ref())
            }
        })
    }

    pub fn deref_read_untyped<'de, T>(
        &self,
        pptr: PPtr,
        file: &SerializedFile,
        reader: &mut (impl Read + Seek),
    ) -> Result<T>
    where
        T: serde::Deserialize<'de>,
    {
        Ok(match pptr.m_FileID.get_externals_index() {
            None => pptr.deref_local(file, &self.tpk)?.read(reader)?,
            Some(external_index) => {
                let external_info = &file.m_Externals[external_index];
                let external = self
                    .load_external_file(Path::new(&external_info.pathName))
                    .with_context(|| {
                        format!("Failed to load external file {}", external_info.pathName)
                    })?;
                let object = pptr
                    .make_local()
                    .deref_local(external.file, &self.tpk)
                    .with_context(|| {
                        format!("In external {} {}", pptr.m_FileID, external_info.pathName)
                    })?;
                object.read(&mut Cursor::new(external.data))?
            }
        })
    }

    pub fn deref_read<'de, T>(
        &self,
        pptr: TypedPPtr<T>,
        file: &SerializedFile,
        reader: &mut (impl Read + Seek),
    ) -> Result<T>
    where
        T: serde::Deserialize<'de>,
    {
        self.deref_read_untyped(pptr.untyped(), file, reader)
    }

    pub fn load_typetree_as<'a, T>(
        &'a self,
        mb_obj: &ObjectRef<'a, MonoBehaviour>,
        script: &MonoScript,
    ) -> Result<ObjectRef<'a, T>> {
        let tt = self
            .typetree_generator
            .generate(&script.assembly_name(), &script.full_name())?;
        let data = mb_obj.with_typetree::<T>(tt);
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoFiles;
    impl EnvResolver for NoFiles {
        fn read_path(&self, path: &Path) -> Result<Data, std::io::Error> {
            Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                path.display().to_string(),
            ))
        }

        fn all_files(&self) -> Result<Vec<PathBuf>, std::io::Error> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn missing_files_report_their_path() {
        let env = Environment::new(NoFiles, TypeTreeCache::new(TpkTypeTreeBlob::embedded()));
        let err = env.load_cached("level0").err().unwrap();
        assert!(format!("{err:#}").contains("Cannot read file level0"));
        assert!(env.unity_version().is_err());
    }

    #[test]
    fn garbage_containers_fail_to_parse() {
        let files = PackageFiles::new([(PackageFiles::LEVEL0, vec![0xAB; 64])]);
        let env = Environment::new(files, TypeTreeCache::new(TpkTypeTreeBlob::embedded()));
        let err = env.load_cached(PackageFiles::LEVEL0).err().unwrap();
        assert!(format!("{err:#}").contains("Failed to parse level0"));
        assert!(env.load_cached(PackageFiles::LEVEL0).is_err());
    }
}
