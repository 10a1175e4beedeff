use std::fmt;

use super::slot::{UniformKind, UniformSlot};
use super::table::BindingTable;
use super::value::UniformValue;

/// Why a uniform write did not land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformError {
    /// The program does not declare the slot.
    Missing(UniformSlot),
    /// The program declares the slot with a different kind.
    TypeMismatch {
        /// The slot written.
        slot: UniformSlot,
        /// Kind the program declared (`None` if it has no host mapping).
        declared: Option<UniformKind>,
        /// Kind of the value supplied.
        supplied: UniformKind,
    },
    /// The slot is a texture, not a block member.
    NotAValue(UniformSlot),
}

impl fmt::Display for UniformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(slot) => write!(f, "uniform '{slot}' is not declared"),
            Self::TypeMismatch {
                slot,
                declared: Some(declared),
                supplied,
            } => write!(
                f,
                "uniform '{slot}' is declared as {declared}, got {supplied}"
            ),
            Self::TypeMismatch {
                slot,
                declared: None,
                supplied,
            } => write!(
                f,
                "uniform '{slot}' has a type with no host mapping, got {supplied}"
            ),
            Self::NotAValue(slot) => {
                write!(f, "uniform '{slot}' is a texture binding")
            }
        }
    }
}

impl std::error::Error for UniformError {}

/// CPU shadow of a program's uniform struct.
///
/// Writes are routed through the program's [`BindingTable`]; the bytes are
/// uploaded verbatim, so whatever [`UniformBlock::get`] returns is exactly
/// what the shader sees.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    table: BindingTable,
    bytes: Vec<u8>,
}

impl UniformBlock {
    /// Zeroed block sized for `table`.
    pub fn new(table: BindingTable) -> Self {
        let size = table.block_size().unwrap_or(0) as usize;
        Self {
            table,
            bytes: vec![0; size],
        }
    }

    /// Write `value` into `slot`.
    pub fn set(
        &mut self,
        slot: UniformSlot,
        value: impl Into<UniformValue>,
    ) -> Result<(), UniformError> {
        let value = value.into();
        if slot.kind() == UniformKind::Texture {
            return Err(UniformError::NotAValue(slot));
        }
        let member = self
            .table
            .member(slot)
            .ok_or(UniformError::Missing(slot))?;
        if member.kind != Some(value.kind()) {
            return Err(UniformError::TypeMismatch {
                slot,
                declared: member.kind,
                supplied: value.kind(),
            });
        }

        let start = member.offset as usize;
        let len = value.kind().size();
        let Some(dst) = self.bytes.get_mut(start..start + len) else {
            return Err(UniformError::Missing(slot));
        };
        let mut staged = [0u8; 64];
        value.write_to(&mut staged);
        dst.copy_from_slice(&staged[..len]);
        Ok(())
    }

    /// Value currently held in `slot`.
    pub fn get(&self, slot: UniformSlot) -> Option<UniformValue> {
        let member = self.table.member(slot)?;
        let kind = member.kind?;
        UniformValue::read_from(kind, self.bytes.get(member.offset as usize..)?)
    }

    /// The program's binding table.
    pub fn table(&self) -> &BindingTable {
        &self.table
    }

    /// Raw block bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3, Vec4};

    use super::*;

    fn block(src: &str) -> UniformBlock {
        let module = naga::front::wgsl::parse_str(src).unwrap();
        UniformBlock::new(BindingTable::reflect(&module).unwrap())
    }

    const SRC: &str = "
struct U { model: mat4x4<f32>, tex_res: vec3<f32>, clr_diff: vec4<f32>, eye_light: f32 }
@group(0) @binding(0) var<uniform> u: U;
";

    #[test]
    fn values_read_back_bit_exact() {
        let mut b = block(SRC);
        let res = Vec3::new(128.0, 64.5, f32::MIN_POSITIVE);
        b.set(UniformSlot::TexRes, res).unwrap();
        let Some(UniformValue::Vec3(back)) = b.get(UniformSlot::TexRes) else {
            panic!("tex_res not readable");
        };
        assert_eq!(back.to_array().map(f32::to_bits), res.to_array().map(f32::to_bits));
    }

    #[test]
    fn missing_slot_is_reported_not_written() {
        let mut b = block(SRC);
        let before = b.bytes().to_vec();
        assert_eq!(
            b.set(UniformSlot::View, Mat4::IDENTITY),
            Err(UniformError::Missing(UniformSlot::View))
        );
        assert_eq!(b.bytes(), &before[..]);
    }

    #[test]
    fn declared_kind_wins_over_convention() {
        // eye_light is conventionally u32 but this program declares f32.
        let mut b = block(SRC);
        assert!(matches!(
            b.set(UniformSlot::EyeLight, 1u32),
            Err(UniformError::TypeMismatch { .. })
        ));
        assert!(b.set(UniformSlot::EyeLight, 1.0f32).is_ok());
    }

    #[test]
    fn texture_slot_is_not_a_value() {
        let mut b = block(SRC);
        assert_eq!(
            b.set(UniformSlot::Tex, 0u32),
            Err(UniformError::NotAValue(UniformSlot::Tex))
        );
    }

    #[test]
    fn rewrite_replaces_only_its_member() {
        let mut b = block(SRC);
        b.set(UniformSlot::ClrDiff, Vec4::ONE).unwrap();
        b.set(UniformSlot::EyeLight, 2.0f32).unwrap();
        b.set(UniformSlot::ClrDiff, Vec4::ZERO).unwrap();
        assert_eq!(b.get(UniformSlot::ClrDiff), Some(UniformValue::Vec4(Vec4::ZERO)));
        assert_eq!(b.get(UniformSlot::EyeLight), Some(UniformValue::F32(2.0)));
    }
}
