use std::fmt;

/// Value kind a uniform member holds on the host side.
///
/// `Texture` is the only kind that does not live in the uniform block; it
/// names the sampled texture bound next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    /// `mat4x4<f32>`
    Mat4,
    /// `vec4<f32>`
    Vec4,
    /// `vec3<f32>`
    Vec3,
    /// `vec2<f32>`
    Vec2,
    /// `f32`
    F32,
    /// `u32`
    U32,
    /// Sampled 2-D or 3-D texture.
    Texture,
}

impl UniformKind {
    /// Bytes the value occupies inside the block (alignment excluded).
    pub const fn size(self) -> usize {
        match self {
            Self::Mat4 => 64,
            Self::Vec4 => 16,
            Self::Vec3 => 12,
            Self::Vec2 => 8,
            Self::F32 | Self::U32 => 4,
            Self::Texture => 0,
        }
    }
}

impl fmt::Display for UniformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mat4 => "mat4x4<f32>",
            Self::Vec4 => "vec4<f32>",
            Self::Vec3 => "vec3<f32>",
            Self::Vec2 => "vec2<f32>",
            Self::F32 => "f32",
            Self::U32 => "u32",
            Self::Texture => "texture",
        };
        f.write_str(name)
    }
}

/// Conventional uniform slots shared by every voxel shader program.
///
/// Discriminants are stable and identical across programs, so generic setup
/// code can address a slot without knowing which program it talks to. Each
/// program resolves the slots it actually declares through its
/// [`BindingTable`](super::BindingTable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum UniformSlot {
    /// World to view matrix.
    View = 0,
    /// View to clip matrix.
    Proj = 1,
    /// Object to world matrix.
    Model = 2,
    /// View to world matrix.
    InvView = 3,
    /// Light position in world space.
    LightPos = 4,
    /// Camera eye position in world space.
    CamPos = 5,
    /// Viewport width, viewport height, near plane, far plane.
    CamDims = 6,
    /// Ambient material color.
    ClrAmb = 7,
    /// Diffuse material color.
    ClrDiff = 8,
    /// Specular material color, `w` is the shininess exponent.
    ClrSpec = 9,
    /// Sampled texture (2-D or 3-D).
    Tex = 10,
    /// Resolution of the bound 3-D texture in voxels.
    TexRes = 11,
    /// World to voxel-space matrix.
    W = 12,
    /// Shadow channel mask.
    ShadowMask = 13,
    /// Shadow map size in texels.
    ShadowSize = 14,
    /// Non-zero when the light follows the eye.
    EyeLight = 15,
    /// Voxel-space to world matrix.
    OverTex = 16,
    /// Volume extent used together with `OverTex`.
    OverSize = 17,
    /// Lower corner of the volume bounds.
    VolMin = 18,
    /// Upper corner of the volume bounds.
    VolMax = 19,
    /// Ray sampling steps: primary, shadow, fine.
    Samples = 20,
    /// Lower end of the value window.
    TexMin = 21,
    /// Upper end of the value window.
    TexMax = 22,
}

impl UniformSlot {
    /// Number of slots.
    pub const COUNT: usize = 23;

    /// Every slot in index order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::View,
        Self::Proj,
        Self::Model,
        Self::InvView,
        Self::LightPos,
        Self::CamPos,
        Self::CamDims,
        Self::ClrAmb,
        Self::ClrDiff,
        Self::ClrSpec,
        Self::Tex,
        Self::TexRes,
        Self::W,
        Self::ShadowMask,
        Self::ShadowSize,
        Self::EyeLight,
        Self::OverTex,
        Self::OverSize,
        Self::VolMin,
        Self::VolMax,
        Self::Samples,
        Self::TexMin,
        Self::TexMax,
    ];

    /// Stable slot index.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Slot for a stable index.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Member name the slot uses inside a program's uniform struct.
    pub const fn name(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Proj => "proj",
            Self::Model => "model",
            Self::InvView => "inv_view",
            Self::LightPos => "light_pos",
            Self::CamPos => "cam_pos",
            Self::CamDims => "cam_dims",
            Self::ClrAmb => "clr_amb",
            Self::ClrDiff => "clr_diff",
            Self::ClrSpec => "clr_spec",
            Self::Tex => "tex",
            Self::TexRes => "tex_res",
            Self::W => "w",
            Self::ShadowMask => "shadow_mask",
            Self::ShadowSize => "shadow_size",
            Self::EyeLight => "eye_light",
            Self::OverTex => "over_tex",
            Self::OverSize => "over_size",
            Self::VolMin => "vol_min",
            Self::VolMax => "vol_max",
            Self::Samples => "samples",
            Self::TexMin => "tex_min",
            Self::TexMax => "tex_max",
        }
    }

    /// Slot declared under the given member name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|slot| slot.name() == name)
    }

    /// Kind the slot conventionally holds.
    pub const fn kind(self) -> UniformKind {
        match self {
            Self::View
            | Self::Proj
            | Self::Model
            | Self::InvView
            | Self::W
            | Self::OverTex => UniformKind::Mat4,
            Self::CamDims | Self::ClrAmb | Self::ClrDiff | Self::ClrSpec => {
                UniformKind::Vec4
            }
            Self::LightPos
            | Self::CamPos
            | Self::TexRes
            | Self::OverSize
            | Self::VolMin
            | Self::VolMax
            | Self::Samples
            | Self::TexMin
            | Self::TexMax => UniformKind::Vec3,
            Self::ShadowSize => UniformKind::Vec2,
            Self::ShadowMask | Self::EyeLight => UniformKind::U32,
            Self::Tex => UniformKind::Texture,
        }
    }
}

impl fmt::Display for UniformSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_stable() {
        assert_eq!(UniformSlot::View.index(), 0);
        assert_eq!(UniformSlot::Tex.index(), 10);
        assert_eq!(UniformSlot::EyeLight.index(), 15);
        assert_eq!(UniformSlot::TexMax.index(), 22);
        for (i, slot) in UniformSlot::ALL.iter().enumerate() {
            assert_eq!(slot.index(), i);
            assert_eq!(UniformSlot::from_index(i), Some(*slot));
        }
        assert_eq!(UniformSlot::from_index(UniformSlot::COUNT), None);
    }

    #[test]
    fn names_resolve_back_to_slots() {
        for slot in UniformSlot::ALL {
            assert_eq!(UniformSlot::from_name(slot.name()), Some(slot));
        }
        assert_eq!(UniformSlot::from_name("not_a_slot"), None);
    }

    #[test]
    fn only_tex_is_a_texture() {
        let textures: Vec<_> = UniformSlot::ALL
            .into_iter()
            .filter(|s| s.kind() == UniformKind::Texture)
            .collect();
        assert_eq!(textures, vec![UniformSlot::Tex]);
    }
}
