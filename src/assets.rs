use anyhow::{Context, Result};
use rabex::tpk::TpkTypeTreeBlob;
use rabex::typetree::typetree_cache::sync::TypeTreeCache;
use serde_json::Value;
use typetree_generator_api::GeneratorBackend;

use crate::env::Environment;
use crate::extract::{Container, ScriptObjectSource};
use crate::package::{PackageFiles, PackagePayloads};
use crate::scratch::Il2CppScratch;

/// The package's asset containers with a type tree generator loaded from its
/// IL2CPP binary.
pub struct GameAssets {
    pub env: Environment,
    // dropped after `env`, whose generator was loaded from these maps
    _scratch: Il2CppScratch,
}

impl GameAssets {
    pub fn load(payloads: PackagePayloads, backend: GeneratorBackend) -> Result<GameAssets> {
        let PackagePayloads {
            global_game_managers,
            level0,
            level22,
            il2cpp,
            metadata,
        } = payloads;

        let scratch = Il2CppScratch::create(&il2cpp, &metadata)?;
        drop((il2cpp, metadata));

        let files = PackageFiles::new([
            (PackageFiles::GLOBAL_GAME_MANAGERS, global_game_managers),
            (PackageFiles::LEVEL0, level0),
            (PackageFiles::LEVEL22, level22),
        ]);
        let tpk = TypeTreeCache::new(TpkTypeTreeBlob::embedded());
        let mut env = Environment::new(files, tpk);

        let unity_version = env.unity_version()?;
        tracing::info!("unity version {:?}", unity_version);

        env.load_il2cpp_typetree_generator(backend, &scratch)
            .context("failed to load typetree generator")?;

        Ok(GameAssets {
            env,
            _scratch: scratch,
        })
    }
}

impl ScriptObjectSource for GameAssets {
    fn script_object(&self, container: Container, script: &str) -> Result<Option<Value>> {
        let file = self.env.load_cached(container.name())?;

        let Some(object) = file.scripts::<Value>(script)?.next() else {
            tracing::debug!(
                "no {script} in {container}, scripts present: {:?}",
                file.script_names()?
            );
            return Ok(None);
        };

        let value = object
            .read()
            .with_context(|| format!("failed to read {script} ({})", object.path_id()))?;
        Ok(Some(value))
    }
}
