use bytemuck::{Pod, Zeroable};
use glam::{Affine2, Vec2};

/// Per-instance data uploaded to GPU each frame.
/// Stride = 32 bytes.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SpriteInstance {
    /// First column of the sprite-to-window linear map.
    pub x_axis: [f32; 2],
    /// Second column of the sprite-to-window linear map.
    pub y_axis: [f32; 2],
    /// Window-pixel position of the sprite's top-left texel.
    pub translation: [f32; 2],
    /// Sprite size in texels; scales the unit quad.
    pub size: [f32; 2],
}

impl SpriteInstance {
    pub fn new(transform: Affine2, size: Vec2) -> Self {
        Self {
            x_axis: transform.matrix2.x_axis.into(),
            y_axis: transform.matrix2.y_axis.into(),
            translation: transform.translation.into(),
            size: size.into(),
        }
    }
}
