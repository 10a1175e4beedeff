//! Typed uniform slots and per-program uniform state.
//!
//! [`UniformSlot`] names the conventional parameters every voxel program may
//! declare. At link time each program reflects a [`BindingTable`] from its
//! shader modules; a [`UniformBlock`] then holds the CPU copy of the
//! program's uniform struct and accepts writes by slot.

mod block;
mod slot;
mod table;
mod value;

pub use block::{UniformBlock, UniformError};
pub use slot::{UniformKind, UniformSlot};
pub use table::{
    BindingTable, LinkError, MemberBinding, SlotBinding, TextureBinding, TextureDim,
    TEXTURE_GROUP, UNIFORM_GROUP,
};
pub use value::UniformValue;
