use bytemuck::{Pod, Zeroable};
use nalgebra::{Point3, Vector2, Vector3};
use std::mem::{offset_of, size_of};

/// One mesh vertex as read by the vertex stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// Position in object space (location 0).
    pub position: Point3<f32>,
    /// Object-space normal (location 1).
    pub normal: Vector3<f32>,
    /// Object-space tangent (location 2). Carried through, unused by lighting.
    pub tangent: Vector3<f32>,
    /// Texture coordinates (location 3).
    pub texcoord: Vector2<f32>,
}

impl Vertex {
    pub fn new(position: Point3<f32>, normal: Vector3<f32>, texcoord: Vector2<f32>) -> Self {
        Self {
            position,
            normal,
            tangent: Vector3::zeros(),
            texcoord,
        }
    }

    pub fn with_tangent(mut self, tangent: Vector3<f32>) -> Self {
        self.tangent = tangent;
        self
    }
}

/// Interleaved vertex record as uploaded to a vertex buffer.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GpuVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tangent: [f32; 3],
    pub uv: [f32; 2],
}

impl From<&Vertex> for GpuVertex {
    fn from(v: &Vertex) -> Self {
        Self {
            position: v.position.coords.into(),
            normal: v.normal.into(),
            tangent: v.tangent.into(),
            uv: v.texcoord.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
}

impl VertexFormat {
    pub fn size_bytes(self) -> usize {
        match self {
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub format: VertexFormat,
    pub offset: usize,
}

pub const POSITION_LOCATION: u32 = 0;
pub const NORMAL_LOCATION: u32 = 1;
pub const TANGENT_LOCATION: u32 = 2;
pub const UV_LOCATION: u32 = 3;

/// Byte stride of one [`GpuVertex`].
pub const VERTEX_STRIDE: usize = size_of::<GpuVertex>();

/// Fixed vertex input locations shared by every pipeline variant.
pub const VERTEX_ATTRIBUTES: [VertexAttribute; 4] = [
    VertexAttribute {
        location: POSITION_LOCATION,
        format: VertexFormat::Float32x3,
        offset: offset_of!(GpuVertex, position),
    },
    VertexAttribute {
        location: NORMAL_LOCATION,
        format: VertexFormat::Float32x3,
        offset: offset_of!(GpuVertex, normal),
    },
    VertexAttribute {
        location: TANGENT_LOCATION,
        format: VertexFormat::Float32x3,
        offset: offset_of!(GpuVertex, tangent),
    },
    VertexAttribute {
        location: UV_LOCATION,
        format: VertexFormat::Float32x2,
        offset: offset_of!(GpuVertex, uv),
    },
];
