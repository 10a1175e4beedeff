//! Per-program slot bindings reflected from composed shader modules.
//!
//! A program's uniforms live in one struct bound at `@group(0) @binding(0)`.
//! Members whose names match a [`UniformSlot`] become slot bindings at the
//! offset naga laid them out at. The sampled texture for [`UniformSlot::Tex`]
//! sits at `@group(1) @binding(0)` with its sampler at `@binding(1)`.

use std::fmt;

use super::slot::{UniformKind, UniformSlot};

/// Bind group holding the uniform struct.
pub const UNIFORM_GROUP: u32 = 0;
/// Bind group holding the sampled texture and its sampler.
pub const TEXTURE_GROUP: u32 = 1;

/// Dimensionality of a sampled texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureDim {
    /// 2-D texture.
    D2,
    /// 3-D (volume) texture.
    D3,
}

impl fmt::Display for TextureDim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::D2 => f.write_str("2d"),
            Self::D3 => f.write_str("3d"),
        }
    }
}

/// Where a value slot lives inside the uniform block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberBinding {
    /// Byte offset inside the block.
    pub offset: u32,
    /// Declared kind, `None` when the member's type has no host mapping.
    pub kind: Option<UniformKind>,
}

/// The sampled texture a program declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureBinding {
    /// Binding index inside [`TEXTURE_GROUP`].
    pub binding: u32,
    /// Texture dimensionality.
    pub dim: TextureDim,
    /// Binding index of the sampler, if declared.
    pub sampler: Option<u32>,
}

/// Binding of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotBinding {
    /// Lives in the uniform block.
    Member(MemberBinding),
    /// Bound as a texture.
    Texture(TextureBinding),
}

/// Failures while linking shader stages into one program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// A stage lacks its required entry point.
    MissingEntryPoint {
        /// Stage name (`vertex`, `fragment`).
        stage: &'static str,
        /// Expected entry point.
        entry: &'static str,
        /// Source the stage came from.
        file: String,
    },
    /// No stage declared a uniform struct at group 0, binding 0.
    MissingUniformBlock,
    /// The uniform binding is not a struct.
    UniformBlockNotStruct,
    /// Two stages declare the same slot differently.
    SlotMismatch {
        /// The contested slot.
        slot: UniformSlot,
    },
    /// Two stages disagree on the size of the uniform struct.
    BlockSizeMismatch {
        /// Size in the first stage.
        first: u32,
        /// Size in the later stage.
        second: u32,
    },
    /// The texture at group 1 is not a single-sampled float 2-D or 3-D
    /// texture.
    UnsupportedTexture {
        /// Binding index of the texture.
        binding: u32,
        /// What about the texture is unsupported.
        reason: &'static str,
    },
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEntryPoint { stage, entry, file } => {
                write!(f, "{stage} stage in '{file}' has no `{entry}` entry point")
            }
            Self::MissingUniformBlock => {
                write!(f, "no uniform struct at @group(0) @binding(0)")
            }
            Self::UniformBlockNotStruct => {
                write!(f, "uniform binding at @group(0) @binding(0) is not a struct")
            }
            Self::SlotMismatch { slot } => {
                write!(f, "stages disagree on the layout of uniform '{slot}'")
            }
            Self::BlockSizeMismatch { first, second } => write!(
                f,
                "stages disagree on the uniform block size ({first} vs {second} bytes)"
            ),
            Self::UnsupportedTexture { binding, reason } => write!(
                f,
                "texture at @group(1) @binding({binding}) is unsupported: {reason}"
            ),
        }
    }
}

impl std::error::Error for LinkError {}

/// Slot bindings of one linked program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BindingTable {
    slots: [Option<SlotBinding>; UniformSlot::COUNT],
    block_size: Option<u32>,
    extra_members: Vec<String>,
}

impl BindingTable {
    /// Reflect the slot bindings one module declares.
    ///
    /// A module without a uniform struct yields an empty table; whether that
    /// is acceptable is decided when stages are merged.
    pub fn reflect(module: &naga::Module) -> Result<Self, LinkError> {
        let mut table = Self::default();

        for (_, global) in module.global_variables.iter() {
            let Some(binding) = &global.binding else {
                continue;
            };
            let inner = &module.types[global.ty].inner;

            if global.space == naga::AddressSpace::Uniform
                && binding.group == UNIFORM_GROUP
                && binding.binding == 0
            {
                let naga::TypeInner::Struct { members, span } = inner else {
                    return Err(LinkError::UniformBlockNotStruct);
                };
                table.block_size = Some(*span);
                for member in members {
                    let Some(name) = member.name.as_deref() else {
                        continue;
                    };
                    match UniformSlot::from_name(name) {
                        Some(slot) if slot != UniformSlot::Tex => {
                            table.slots[slot.index()] =
                                Some(SlotBinding::Member(MemberBinding {
                                    offset: member.offset,
                                    kind: host_kind(&module.types[member.ty].inner),
                                }));
                        }
                        _ => table.extra_members.push(name.to_owned()),
                    }
                }
            } else if binding.group == TEXTURE_GROUP {
                match inner {
                    naga::TypeInner::Image { dim, class, .. } => {
                        let dim = sampled_dim(*dim, *class).map_err(|reason| {
                            LinkError::UnsupportedTexture {
                                binding: binding.binding,
                                reason,
                            }
                        })?;
                        let sampler = table.texture().and_then(|t| t.sampler);
                        table.slots[UniformSlot::Tex.index()] =
                            Some(SlotBinding::Texture(TextureBinding {
                                binding: binding.binding,
                                dim,
                                sampler,
                            }));
                    }
                    naga::TypeInner::Sampler { .. } => {
                        if let Some(SlotBinding::Texture(tex)) =
                            &mut table.slots[UniformSlot::Tex.index()]
                        {
                            tex.sampler = Some(binding.binding);
                        } else {
                            // Sampler declared before its texture; remember
                            // it on a placeholder that the texture fills in.
                            table.slots[UniformSlot::Tex.index()] =
                                Some(SlotBinding::Texture(TextureBinding {
                                    binding: u32::MAX,
                                    dim: TextureDim::D2,
                                    sampler: Some(binding.binding),
                                }));
                        }
                    }
                    _ => {}
                }
            }
        }

        // A sampler with no texture is not a texture binding.
        if matches!(
            table.texture(),
            Some(TextureBinding { binding: u32::MAX, .. })
        ) {
            table.slots[UniformSlot::Tex.index()] = None;
        }

        Ok(table)
    }

    /// Fold another stage's table into this one.
    pub fn merge(&mut self, other: &Self) -> Result<(), LinkError> {
        match (self.block_size, other.block_size) {
            (Some(first), Some(second)) if first != second => {
                return Err(LinkError::BlockSizeMismatch { first, second });
            }
            (None, Some(size)) => self.block_size = Some(size),
            _ => {}
        }

        for slot in UniformSlot::ALL {
            let i = slot.index();
            match (&self.slots[i], &other.slots[i]) {
                (Some(mine), Some(theirs)) if mine != theirs => {
                    return Err(LinkError::SlotMismatch { slot });
                }
                (None, Some(theirs)) => self.slots[i] = Some(*theirs),
                _ => {}
            }
        }

        for name in &other.extra_members {
            if !self.extra_members.contains(name) {
                self.extra_members.push(name.clone());
            }
        }
        Ok(())
    }

    /// Binding for `slot`, if the program declares it.
    pub fn get(&self, slot: UniformSlot) -> Option<&SlotBinding> {
        self.slots[slot.index()].as_ref()
    }

    /// Whether the program declares `slot`.
    pub fn contains(&self, slot: UniformSlot) -> bool {
        self.slots[slot.index()].is_some()
    }

    /// Member binding for a value slot.
    pub fn member(&self, slot: UniformSlot) -> Option<MemberBinding> {
        match self.get(slot)? {
            SlotBinding::Member(m) => Some(*m),
            SlotBinding::Texture(_) => None,
        }
    }

    /// The declared sampled texture.
    pub fn texture(&self) -> Option<TextureBinding> {
        match self.get(UniformSlot::Tex)? {
            SlotBinding::Texture(t) => Some(*t),
            SlotBinding::Member(_) => None,
        }
    }

    /// Size of the uniform struct in bytes, if a stage declared one.
    pub fn block_size(&self) -> Option<u32> {
        self.block_size
    }

    /// Declared slots in index order.
    pub fn slots(&self) -> impl Iterator<Item = (UniformSlot, &SlotBinding)> {
        UniformSlot::ALL
            .into_iter()
            .filter_map(|slot| self.get(slot).map(|b| (slot, b)))
    }

    /// Uniform members that are not conventional slots.
    pub fn extra_members(&self) -> &[String] {
        &self.extra_members
    }
}

fn sampled_dim(
    dim: naga::ImageDimension,
    class: naga::ImageClass,
) -> Result<TextureDim, &'static str> {
    use naga::{ImageClass, ImageDimension, ScalarKind};

    match class {
        ImageClass::Sampled {
            kind: ScalarKind::Float,
            multi: false,
        } => match dim {
            ImageDimension::D2 => Ok(TextureDim::D2),
            ImageDimension::D3 => Ok(TextureDim::D3),
            ImageDimension::D1 => Err("1-D textures are not bindable"),
            ImageDimension::Cube => Err("cube textures are not bindable"),
        },
        ImageClass::Sampled { multi: true, .. } | ImageClass::Depth { multi: true } => {
            Err("multisampled textures are not bindable")
        }
        ImageClass::Depth { .. } => Err("depth textures are not bindable"),
        ImageClass::Sampled { .. } => Err("sample type must be f32"),
        _ => Err("only sampled textures are bindable"),
    }
}

fn host_kind(inner: &naga::TypeInner) -> Option<UniformKind> {
    use naga::{Scalar, TypeInner, VectorSize};

    match *inner {
        TypeInner::Matrix {
            columns: VectorSize::Quad,
            rows: VectorSize::Quad,
            scalar,
        } if scalar == Scalar::F32 => Some(UniformKind::Mat4),
        TypeInner::Vector { size, scalar } if scalar == Scalar::F32 => match size {
            VectorSize::Quad => Some(UniformKind::Vec4),
            VectorSize::Tri => Some(UniformKind::Vec3),
            VectorSize::Bi => Some(UniformKind::Vec2),
        },
        TypeInner::Scalar(scalar) if scalar == Scalar::F32 => Some(UniformKind::F32),
        TypeInner::Scalar(scalar) if scalar == Scalar::U32 => Some(UniformKind::U32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> naga::Module {
        naga::front::wgsl::parse_str(src).unwrap()
    }

    const RAYCAST_LIKE: &str = r"
struct Uniforms {
    inv_view: mat4x4<f32>,
    cam_pos: vec3<f32>,
    cam_dims: vec4<f32>,
    eye_light: u32,
    custom_gain: f32,
}
@group(0) @binding(0) var<uniform> u: Uniforms;
@group(1) @binding(0) var tex: texture_3d<f32>;
@group(1) @binding(1) var tex_sampler: sampler;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return textureSampleLevel(tex, tex_sampler, u.cam_pos, 0.0) * u.custom_gain;
}
";

    #[test]
    fn reflects_members_and_texture() {
        let table = BindingTable::reflect(&parse(RAYCAST_LIKE)).unwrap();

        let inv_view = table.member(UniformSlot::InvView).unwrap();
        assert_eq!(inv_view.offset, 0);
        assert_eq!(inv_view.kind, Some(UniformKind::Mat4));

        let cam_pos = table.member(UniformSlot::CamPos).unwrap();
        assert_eq!(cam_pos.offset, 64);
        assert_eq!(cam_pos.kind, Some(UniformKind::Vec3));

        // vec4 after a vec3 realigns to 16
        assert_eq!(table.member(UniformSlot::CamDims).unwrap().offset, 80);
        assert_eq!(
            table.member(UniformSlot::EyeLight).unwrap().kind,
            Some(UniformKind::U32)
        );

        let tex = table.texture().unwrap();
        assert_eq!(tex.dim, TextureDim::D3);
        assert_eq!(tex.binding, 0);
        assert_eq!(tex.sampler, Some(1));

        assert!(!table.contains(UniformSlot::View));
        assert_eq!(table.extra_members(), ["custom_gain".to_owned()]);
        assert_eq!(table.block_size(), Some(112));
    }

    #[test]
    fn unbindable_textures_are_link_errors() {
        for (decl, reason) in [
            ("texture_cube<f32>", "cube"),
            ("texture_1d<f32>", "1-D"),
            ("texture_depth_2d", "depth"),
            ("texture_multisampled_2d<f32>", "multisampled"),
            ("texture_2d<u32>", "f32"),
        ] {
            let src = format!("@group(1) @binding(3) var tex: {decl};");
            match BindingTable::reflect(&parse(&src)) {
                Err(LinkError::UnsupportedTexture { binding: 3, reason: why }) => {
                    assert!(why.contains(reason), "{decl}: {why}");
                }
                other => panic!("{decl} reflected as {other:?}"),
            }
        }
    }

    #[test]
    fn module_without_uniforms_is_empty() {
        let table = BindingTable::reflect(&parse(
            "@vertex fn vs_main() -> @builtin(position) vec4<f32> { return vec4<f32>(0.0); }",
        ))
        .unwrap();
        assert_eq!(table.slots().count(), 0);
        assert_eq!(table.block_size(), None);
    }

    #[test]
    fn merge_rejects_conflicting_layouts() {
        let a = BindingTable::reflect(&parse(
            "struct U { view: mat4x4<f32>, cam_pos: vec3<f32> }
             @group(0) @binding(0) var<uniform> u: U;",
        ))
        .unwrap();
        let b = BindingTable::reflect(&parse(
            "struct U { cam_pos: vec3<f32>, view: mat4x4<f32> }
             @group(0) @binding(0) var<uniform> u: U;",
        ))
        .unwrap();

        let mut merged = a.clone();
        assert_eq!(
            merged.merge(&b),
            Err(LinkError::SlotMismatch {
                slot: UniformSlot::View
            })
        );

        let mut same = a.clone();
        same.merge(&a).unwrap();
        assert_eq!(same, a);
    }

    #[test]
    fn merge_unions_texture_from_other_stage() {
        let vert = BindingTable::reflect(&parse(
            "struct U { model: mat4x4<f32> }
             @group(0) @binding(0) var<uniform> u: U;",
        ))
        .unwrap();
        let frag = BindingTable::reflect(&parse(
            "struct U { model: mat4x4<f32> }
             @group(0) @binding(0) var<uniform> u: U;
             @group(1) @binding(0) var tex: texture_2d<f32>;",
        ))
        .unwrap();

        let mut table = vert;
        table.merge(&frag).unwrap();
        assert!(table.contains(UniformSlot::Model));
        assert_eq!(table.texture().map(|t| t.dim), Some(TextureDim::D2));
        assert_eq!(table.texture().and_then(|t| t.sampler), None);
    }
}
