//! WGSL sources and the compiled shader module cache.

use std::{collections::HashMap, sync::Arc};

use log::{debug, info};

pub const LIT_SHADER_SOURCE: &str = include_str!("shaders/lit.wgsl");
pub const STAR_SHADER_SOURCE: &str = include_str!("shaders/stars.wgsl");
pub const BLOB_SHADER_SOURCE: &str = include_str!("shaders/blob.wgsl");
pub const OVERLAY_SHADER_SOURCE: &str = include_str!("shaders/overlay.wgsl");

/// Every built-in shader by library name.
pub const BUILTIN_SHADERS: [(&str, &str); 4] = [
    ("lit", LIT_SHADER_SOURCE),
    ("stars", STAR_SHADER_SOURCE),
    ("blob", BLOB_SHADER_SOURCE),
    ("overlay", OVERLAY_SHADER_SOURCE),
];

/// Compiled shader modules by name.
pub struct ShaderLibrary {
    modules: HashMap<String, Arc<wgpu::ShaderModule>>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// A library with every built-in shader compiled.
    pub fn builtin(device: &wgpu::Device) -> Self {
        let mut library = Self::new();
        for (name, source) in BUILTIN_SHADERS {
            library.load_from_source(device, name, source);
        }
        library
    }

    /// Compile `source` and store it under `name`, replacing any previous module.
    pub fn load_from_source(&mut self, device: &wgpu::Device, name: &str, source: &str) -> Arc<wgpu::ShaderModule> {
        debug!("Loading shader '{}' from source", name);
        let module = Arc::new(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        }));

        if self.modules.insert(name.to_string(), module.clone()).is_some() {
            info!("Replaced shader '{}'", name);
        } else {
            info!("Loaded shader '{}'", name);
        }
        module
    }

    pub fn get(&self, name: &str) -> Option<Arc<wgpu::ShaderModule>> {
        self.modules.get(name).cloned()
    }

    /// Like [`get`](Self::get) for a module that must be loaded.
    pub fn require(&self, name: &str) -> anyhow::Result<Arc<wgpu::ShaderModule>> {
        self.get(name)
            .ok_or_else(|| anyhow::anyhow!("shader '{name}' not found in library"))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::texture::create_test_device_queue;

    #[test]
    fn every_builtin_has_both_entry_points() {
        for (name, source) in BUILTIN_SHADERS {
            assert!(source.contains("fn vs_main"), "{name}");
            assert!(source.contains("fn fs_main"), "{name}");
        }
    }

    #[test]
    fn library_starts_empty() {
        let library = ShaderLibrary::new();
        assert!(library.is_empty());
        assert!(library.get("lit").is_none());
        assert!(library.require("lit").is_err());
    }

    #[test]
    fn builtin_library_holds_every_shader() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let library = ShaderLibrary::builtin(&device);
        assert_eq!(library.len(), BUILTIN_SHADERS.len());
        let a = library.get("blob").unwrap();
        let b = library.get("blob").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn reload_replaces_cached_module() {
        let Some((device, _queue)) = create_test_device_queue() else {
            return;
        };
        let mut library = ShaderLibrary::new();
        let original = library.load_from_source(&device, "stars", STAR_SHADER_SOURCE);
        let reloaded = library.load_from_source(&device, "stars", STAR_SHADER_SOURCE);
        assert_eq!(library.len(), 1);
        assert!(!Arc::ptr_eq(&original, &reloaded));
    }
}
