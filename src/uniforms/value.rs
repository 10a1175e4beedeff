use glam::{Mat4, Vec2, Vec3, Vec4};

use super::slot::UniformKind;

/// A host-side value destined for one uniform member.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Column-major 4x4 matrix.
    Mat4(Mat4),
    /// Four-component vector.
    Vec4(Vec4),
    /// Three-component vector.
    Vec3(Vec3),
    /// Two-component vector.
    Vec2(Vec2),
    /// Scalar float.
    F32(f32),
    /// Scalar unsigned integer (also used for flags).
    U32(u32),
}

impl UniformValue {
    /// Kind of this value.
    pub const fn kind(&self) -> UniformKind {
        match self {
            Self::Mat4(_) => UniformKind::Mat4,
            Self::Vec4(_) => UniformKind::Vec4,
            Self::Vec3(_) => UniformKind::Vec3,
            Self::Vec2(_) => UniformKind::Vec2,
            Self::F32(_) => UniformKind::F32,
            Self::U32(_) => UniformKind::U32,
        }
    }

    /// Write the value's bytes to the front of `dst`.
    ///
    /// `dst` must be at least `self.kind().size()` bytes long.
    pub fn write_to(&self, dst: &mut [u8]) {
        let size = self.kind().size();
        match self {
            Self::Mat4(m) => {
                dst[..size].copy_from_slice(bytemuck::cast_slice(&m.to_cols_array()));
            }
            Self::Vec4(v) => {
                dst[..size].copy_from_slice(bytemuck::cast_slice(&v.to_array()));
            }
            Self::Vec3(v) => {
                dst[..size].copy_from_slice(bytemuck::cast_slice(&v.to_array()));
            }
            Self::Vec2(v) => {
                dst[..size].copy_from_slice(bytemuck::cast_slice(&v.to_array()));
            }
            Self::F32(x) => dst[..size].copy_from_slice(&x.to_ne_bytes()),
            Self::U32(x) => dst[..size].copy_from_slice(&x.to_ne_bytes()),
        }
    }

    /// Decode a value of `kind` from the front of `src`.
    ///
    /// Returns `None` for [`UniformKind::Texture`] or when `src` is too short.
    pub fn read_from(kind: UniformKind, src: &[u8]) -> Option<Self> {
        let bytes = src.get(..kind.size())?;
        let floats = |n: usize| -> Vec<f32> {
            bytes
                .chunks_exact(4)
                .take(n)
                .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                .collect()
        };
        let value = match kind {
            UniformKind::Mat4 => {
                let f = floats(16);
                Self::Mat4(Mat4::from_cols_slice(&f))
            }
            UniformKind::Vec4 => Self::Vec4(Vec4::from_slice(&floats(4))),
            UniformKind::Vec3 => Self::Vec3(Vec3::from_slice(&floats(3))),
            UniformKind::Vec2 => Self::Vec2(Vec2::from_slice(&floats(2))),
            UniformKind::F32 => {
                Self::F32(f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            UniformKind::U32 => {
                Self::U32(u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            }
            UniformKind::Texture => return None,
        };
        Some(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(m: Mat4) -> Self {
        Self::Mat4(m)
    }
}

impl From<Vec4> for UniformValue {
    fn from(v: Vec4) -> Self {
        Self::Vec4(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        Self::Vec2(v)
    }
}

impl From<f32> for UniformValue {
    fn from(x: f32) -> Self {
        Self::F32(x)
    }
}

impl From<u32> for UniformValue {
    fn from(x: u32) -> Self {
        Self::U32(x)
    }
}

impl From<bool> for UniformValue {
    fn from(b: bool) -> Self {
        Self::U32(u32::from(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matrix_is_written_column_major() {
        let m = Mat4::from_cols_array(&[
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0,
            15.0, 16.0,
        ]);
        let mut buf = [0u8; 64];
        UniformValue::Mat4(m).write_to(&mut buf);
        let first = f32::from_ne_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let fifth = f32::from_ne_bytes([buf[16], buf[17], buf[18], buf[19]]);
        assert_eq!(first, 1.0);
        assert_eq!(fifth, 5.0);
        assert_eq!(
            UniformValue::read_from(UniformKind::Mat4, &buf),
            Some(UniformValue::Mat4(m))
        );
    }

    #[test]
    fn short_buffers_do_not_decode() {
        assert_eq!(UniformValue::read_from(UniformKind::Vec4, &[0u8; 8]), None);
        assert_eq!(UniformValue::read_from(UniformKind::Texture, &[0u8; 64]), None);
    }

    #[test]
    fn bool_becomes_flag() {
        assert_eq!(UniformValue::from(true), UniformValue::U32(1));
        assert_eq!(UniformValue::from(false).kind(), UniformKind::U32);
    }
}
