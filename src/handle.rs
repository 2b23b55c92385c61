use std::fmt::Display;
use std::io::Cursor;

use anyhow::{Context as _, Result};
use rabex::files::SerializedFile;
use rabex::files::serializedfile::ObjectRef;
use rabex::objects::pptr::PathId;
use rabex::objects::{ClassId, ClassIdType, PPtr};
use rabex::tpk::TpkTypeTreeBlob;
use rabex::typetree::TypeTreeProvider;
use rabex::typetree::typetree_cache::sync::TypeTreeCache;
use serde::Deserialize;

use crate::Environment;
use crate::package::PackageFiles;
use crate::resolver::EnvResolver;
use crate::unity::types::{MonoBehaviour, MonoScript};

pub struct SerializedFileHandle<'a, R = PackageFiles, P = TypeTreeCache<TpkTypeTreeBlob>> {
    pub file: &'a SerializedFile,
    pub data: &'a [u8],
    pub env: &'a Environment<R, P>,
}
pub struct ObjectRefHandle<'a, T, R = PackageFiles, P = TypeTreeCache<TpkTypeTreeBlob>> {
    pub object: ObjectRef<'a, T>,
    pub file: SerializedFileHandle<'a, R, P>,
}

impl<'a, R, P> SerializedFileHandle<'a, R, P> {
    pub fn reborrow(&self) -> SerializedFileHandle<'a, R, P> {
        SerializedFileHandle {
            file: self.file,
            data: self.data,
            env: self.env,
        }
    }

    pub fn new(env: &'a Environment<R, P>, file: &'a SerializedFile, data: &'a [u8]) -> Self {
        SerializedFileHandle { file, data, env }
    }

    pub fn reader(&self) -> Cursor<&'a [u8]> {
        Cursor::new(self.data)
    }
}

impl<'a, R: EnvResolver, P: TypeTreeProvider> SerializedFileHandle<'a, R, P> {
    pub fn objects_of<T>(&self) -> impl Iterator<Item = ObjectRefHandle<'a, T, R, P>>
    where
        T: ClassIdType,
    {
        let iter = self.file.objects_of::<T>(&self.env.tpk);
        iter.map(|o| ObjectRefHandle::new(o, self.reborrow()))
    }

    /// The scripts referenced by MonoBehaviours in this file.
    fn script_types(&self) -> Result<Vec<(PPtr, MonoScript)>> {
        self.file
            .m_ScriptTypes
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|&script_type| -> Result<_> {
                let script = PPtr::from(script_type);
                let script_data = self.env.deref_read(
                    script.typed::<MonoScript>(),
                    self.file,
                    &mut self.reader(),
                )?;
                Ok((script, script_data))
            })
            .collect()
    }

    /// Names of all scripts referenced by MonoBehaviours in this file.
    pub fn script_names(&self) -> Result<Vec<String>> {
        Ok(self
            .script_types()?
            .into_iter()
            .map(|(_, script)| script.m_Name)
            .collect())
    }

    /// MonoBehaviours backed by any script matching `filter`, in file order.
    /// Empty if no script of this file matches.
    pub fn scripts<T>(
        &self,
        filter: impl ScriptFilter,
    ) -> Result<impl Iterator<Item = ObjectRefHandle<'a, T, R, P>>> {
        let scripts = matching_scripts(&filter, self.script_types()?);

        let file = self.file;
        Ok(self
            .objects_of::<MonoBehaviour>()
            .filter(move |mb| {
                file.script_type(mb.object.info)
                    .is_some_and(|script| scripts.contains(&script))
            })
            .map(|mb| mb.cast_owned::<T>()))
    }
}

/// Keys of every script accepted by `filter`. Several scripts can share a name
/// across namespaces.
fn matching_scripts<K>(
    filter: &impl ScriptFilter,
    scripts: impl IntoIterator<Item = (K, MonoScript)>,
) -> Vec<K> {
    scripts
        .into_iter()
        .filter(|(_, script)| filter.matches(script))
        .map(|(key, _)| key)
        .collect()
}

impl<'a, T, R: EnvResolver, P: TypeTreeProvider> ObjectRefHandle<'a, T, R, P> {
    pub fn new(object: ObjectRef<'a, T>, file: SerializedFileHandle<'a, R, P>) -> Self {
        ObjectRefHandle { object, file }
    }

    /// Reads the object. MonoBehaviours are decoded with their generated type tree,
    /// including all script fields, when a generator is loaded.
    pub fn read(&self) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        if self.object.info.m_ClassID == ClassId::MonoBehaviour
            && self.file.env.typetree_generator.can_generate()
            && let Ok(tt) = &self.object.tt
            && tt.m_Type == "MonoBehaviour"
        {
            let with_tt = self.load_typetree()?;
            return Ok(with_tt.object.read(&mut self.file.reader())?);
        }

        let data = self.object.read(&mut self.file.reader())?;
        Ok(data)
    }
}

impl<'a, T, R, P> ObjectRefHandle<'a, T, R, P> {
    pub fn path_id(&self) -> PathId {
        self.object.info.m_PathID
    }
}

impl<'a, T, R: EnvResolver, P: TypeTreeProvider> ObjectRefHandle<'a, T, R, P> {
    pub fn cast_owned<U>(self) -> ObjectRefHandle<'a, U, R, P> {
        ObjectRefHandle {
            object: self.object.cast_owned(),
            file: self.file.reborrow(),
        }
    }

    fn load_typetree(&'a self) -> Result<ObjectRefHandle<'a, T, R, P>>
    where
        for<'de> T: Deserialize<'de>,
    {
        let script = self
            .mono_script()?
            .with_context(|| format!("MonoBehaviour {} has no MonoScript", self.path_id()))?;
        self.load_typetree_as(&script)
    }

    fn load_typetree_as<U>(&'a self, script: &MonoScript) -> Result<ObjectRefHandle<'a, U, R, P>>
    where
        U: for<'de> Deserialize<'de>,
    {
        let data = self
            .file
            .env
            .load_typetree_as(&self.object.cast(), script)?;

        Ok(ObjectRefHandle {
            object: data,
            file: self.file.reborrow(),
        })
    }

    pub fn mono_script(&self) -> Result<Option<MonoScript>> {
        let Some(script_type) = self.file.file.script_type(self.object.info) else {
            return Ok(None);
        };

        self.file
            .env
            .deref_read(script_type.typed(), self.file.file, &mut self.file.reader())
    }
}

pub trait ScriptFilter: Display {
    fn matches(&self, script: &MonoScript) -> bool;
}
impl<T: ScriptFilter> ScriptFilter for &T {
    fn matches(&self, script: &MonoScript) -> bool {
        (**self).matches(script)
    }
}
impl ScriptFilter for &'_ str {
    fn matches(&self, script: &MonoScript) -> bool {
        script.m_Name == *self
    }
}
