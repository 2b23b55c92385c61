use anyhow::{Context, Result};
use elsa::sync::FrozenMap;
use rabex::typetree::TypeTreeNode;
use typetree_generator_api::TypeTreeGenerator;

/// Memoizes MonoBehaviour type trees produced by the [`TypeTreeGenerator`].
///
/// Generated script fields are appended to the `MonoBehaviour` base node of the
/// class database, so the result can decode a whole object.
pub struct TypeTreeGeneratorCache {
    generator: Option<(TypeTreeGenerator, TypeTreeNode)>,
    cache: FrozenMap<(String, String), Box<TypeTreeNode>>,
}

impl TypeTreeGeneratorCache {
    pub fn empty() -> Self {
        TypeTreeGeneratorCache {
            generator: None,
            cache: FrozenMap::new(),
        }
    }

    pub fn new(generator: TypeTreeGenerator, base_node: TypeTreeNode) -> Self {
        TypeTreeGeneratorCache {
            generator: Some((generator, base_node)),
            cache: FrozenMap::new(),
        }
    }

    pub fn can_generate(&self) -> bool {
        self.generator.is_some()
    }

    pub fn generate(&self, assembly: &str, full_name: &str) -> Result<&TypeTreeNode> {
        let key = (assembly.to_owned(), full_name.to_owned());
        if let Some(node) = self.cache.get(&key) {
            return Ok(node);
        }

        let (generator, base_node) = self
            .generator
            .as_ref()
            .context("no typetree generator loaded")?;
        let fields = generator
            .generate_typetree(assembly, full_name)
            .with_context(|| format!("could not generate typetree for {assembly} {full_name}"))?;

        let mut node = base_node.clone();
        node.children.extend(fields);
        tracing::debug!("generated typetree for {full_name}");

        Ok(self.cache.insert(key, Box::new(node)))
    }
}
