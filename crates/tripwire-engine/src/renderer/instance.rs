use bytemuck::{Pod, Zeroable};

/// Per-instance render data written to SharedArrayBuffer for the TypeScript renderer.
/// Must match the TypeScript protocol: 8 floats = 32 bytes stride.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    /// X position in world space.
    pub x: f32,
    /// Y position in world space.
    pub y: f32,
    /// Rotation in radians.
    pub rotation: f32,
    /// Half extent along local X (radius for balls).
    pub half_width: f32,
    /// Half extent along local Y (radius for balls).
    pub half_height: f32,
    /// One of the `SHAPE_*` constants.
    pub shape: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
    /// Padding, keeps the stride at 8 floats.
    pub reserved: f32,
}

impl RenderInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub const SHAPE_BALL: f32 = 0.0;
    pub const SHAPE_BOX: f32 = 1.0;
    pub const SHAPE_CAPSULE: f32 = 2.0;
}

/// Render buffer containing one instance per visible body.
pub struct RenderBuffer {
    pub instances: Vec<RenderInstance>,
}

impl RenderBuffer {
    pub fn new() -> Self {
        Self::with_capacity(256)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            instances: Vec::with_capacity(capacity),
        }
    }

    pub fn clear(&mut self) {
        self.instances.clear();
    }

    pub fn push(&mut self, instance: RenderInstance) {
        self.instances.push(instance);
    }

    pub fn instance_count(&self) -> u32 {
        self.instances.len() as u32
    }

    /// Raw pointer to instance data for SharedArrayBuffer reads.
    pub fn instances_ptr(&self) -> *const f32 {
        self.instances.as_ptr() as *const f32
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new()
    }
}
