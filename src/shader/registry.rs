use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use super::program::{LinkedProgram, Program, ProgramHandle, ProgramKind};
use crate::gpu::program::GpuProgram;
use crate::uniforms::UniformBlock;

/// Programs registered in a scene, keyed by handle and by purpose.
#[derive(Debug)]
pub struct ProgramRegistry {
    programs: BTreeMap<ProgramHandle, Program>,
    by_kind: FxHashMap<ProgramKind, ProgramHandle>,
    next_handle: u32,
}

impl Default for ProgramRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgramRegistry {
    /// Empty registry. The first handle handed out is `#1`.
    pub fn new() -> Self {
        Self {
            programs: BTreeMap::new(),
            by_kind: FxHashMap::default(),
            next_handle: 1,
        }
    }

    /// Register a linked program under a fresh handle.
    ///
    /// A program of the same kind that was registered earlier is dropped
    /// together with its GPU resources.
    pub fn register(&mut self, linked: LinkedProgram, gpu: Option<GpuProgram>) -> ProgramHandle {
        let handle = ProgramHandle(self.next_handle);
        self.next_handle += 1;

        let kind = linked.kind;
        if let Some(old) = self.by_kind.insert(kind, handle) {
            let _ = self.programs.remove(&old);
            log::info!("{kind} program {old} replaced by {handle}");
        } else {
            log::info!("{kind} program registered as {handle}");
        }

        let program = Program {
            handle,
            kind,
            uniforms: UniformBlock::new(linked.table),
            texture: None,
            gpu,
        };
        let _ = self.programs.insert(handle, program);
        handle
    }

    /// Program registered under `handle`.
    pub fn get(&self, handle: ProgramHandle) -> Option<&Program> {
        self.programs.get(&handle)
    }

    /// Mutable program registered under `handle`.
    pub fn get_mut(&mut self, handle: ProgramHandle) -> Option<&mut Program> {
        self.programs.get_mut(&handle)
    }

    /// Current handle of the program made for `kind`.
    pub fn handle_for(&self, kind: ProgramKind) -> Option<ProgramHandle> {
        self.by_kind.get(&kind).copied()
    }

    /// Registered programs in handle order.
    pub fn iter(&self) -> impl Iterator<Item = &Program> {
        self.programs.values()
    }

    /// Number of registered programs.
    pub fn len(&self) -> usize {
        self.programs.len()
    }

    /// Whether no program is registered.
    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// Rewind every program's per-frame uniform ring.
    pub fn begin_frame(&mut self) {
        for gpu in self.programs.values_mut().filter_map(|p| p.gpu.as_mut()) {
            gpu.begin_frame();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::{BindingTable, UniformSlot};

    fn linked(kind: ProgramKind) -> LinkedProgram {
        let src = "struct U { model: mat4x4<f32> }
                   @group(0) @binding(0) var<uniform> u: U;";
        let module = naga::front::wgsl::parse_str(src).unwrap();
        LinkedProgram {
            kind,
            table: BindingTable::reflect(&module).unwrap(),
            vertex: module.clone(),
            fragment: module,
        }
    }

    #[test]
    fn handles_are_fresh_and_never_reused() {
        let mut reg = ProgramRegistry::new();
        let a = reg.register(linked(ProgramKind::Simple), None);
        let b = reg.register(linked(ProgramKind::Slice), None);
        let c = reg.register(linked(ProgramKind::Simple), None);
        assert!(a < b && b < c);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn same_kind_replaces_previous_program() {
        let mut reg = ProgramRegistry::new();
        let old = reg.register(linked(ProgramKind::Outline), None);
        let new = reg.register(linked(ProgramKind::Outline), None);
        assert!(reg.get(old).is_none());
        assert_eq!(reg.handle_for(ProgramKind::Outline), Some(new));
        assert!(reg
            .get(new)
            .is_some_and(|p| p.table().contains(UniformSlot::Model)));
    }
}
