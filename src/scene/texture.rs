use std::collections::BTreeMap;
use std::fmt;

use crate::gpu::texture::GpuTexture;
use crate::uniforms::TextureDim;

/// Opaque identifier of a registered texture. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub(crate) u32);

impl fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tex#{}", self.0)
    }
}

/// A registered texture.
pub struct TextureEntry {
    /// Name used in logs.
    pub label: String,
    /// Dimensionality.
    pub dim: TextureDim,
    /// Extent in texels (depth 1 for 2-D).
    pub size: [u32; 3],
    /// Device texture; `None` for textures described but not yet created.
    pub gpu: Option<GpuTexture>,
}

/// Textures the scene's programs may sample.
#[derive(Default)]
pub struct TextureRegistry {
    entries: BTreeMap<TextureHandle, TextureEntry>,
    next_handle: u32,
}

impl TextureRegistry {
    /// Register an existing device texture.
    pub fn insert(&mut self, label: impl Into<String>, texture: GpuTexture) -> TextureHandle {
        let entry = TextureEntry {
            label: label.into(),
            dim: texture.dim(),
            size: texture.size(),
            gpu: Some(texture),
        };
        self.push(entry)
    }

    /// Describe a texture without a device (its GPU side stays `None`).
    pub fn describe(&mut self, label: impl Into<String>, dim: TextureDim, size: [u32; 3]) -> TextureHandle {
        self.push(TextureEntry {
            label: label.into(),
            dim,
            size,
            gpu: None,
        })
    }

    fn push(&mut self, entry: TextureEntry) -> TextureHandle {
        self.next_handle += 1;
        let handle = TextureHandle(self.next_handle);
        log::debug!("{handle} {} texture '{}' registered", entry.dim, entry.label);
        let _ = self.entries.insert(handle, entry);
        handle
    }

    /// Entry registered under `handle`.
    pub fn get(&self, handle: TextureHandle) -> Option<&TextureEntry> {
        self.entries.get(&handle)
    }

    /// Device texture registered under `handle`.
    pub fn gpu(&self, handle: TextureHandle) -> Option<&GpuTexture> {
        self.get(handle)?.gpu.as_ref()
    }

    /// Unregister a texture, returning its entry.
    pub fn remove(&mut self, handle: TextureHandle) -> Option<TextureEntry> {
        self.entries.remove(&handle)
    }

    /// Number of registered textures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no texture is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for TextureRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(h, e)| (h, (&e.label, e.dim, e.size))))
            .finish()
    }
}
