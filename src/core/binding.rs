//! Resource binding layout.
//!
//! Maps each logical resource to a fixed `(set, binding)` pair. Set numbers
//! follow update frequency so the host can rebind per-object data without
//! touching per-frame sets:
//!
//! | Set | Binding   | Resource                                  | Frequency        |
//! |-----|-----------|-------------------------------------------|------------------|
//! | 0   | 0 (,1,2)  | Transform (combined, or T / S / R)        | per-object       |
//! | 1   | 0         | View matrix                               | per-frame        |
//! | 2   | 0         | Projection matrix                         | per-frame        |
//! | 3   | 0         | Light (direction [, light-space matrix])  | per-light        |
//! | 4   | 0         | Diffuse texture sampler                   | per-material     |
//! | 5   | 0         | Shadow-depth texture sampler              | per-light        |
//!
//! Texturing and shadowing each claim their own set without renumbering the
//! lower ones; a shadowed, untextured layout leaves set 4 empty.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

pub const TRANSFORM_SET: u32 = 0;
pub const VIEW_SET: u32 = 1;
pub const PROJECTION_SET: u32 = 2;
pub const LIGHT_SET: u32 = 3;
pub const DIFFUSE_TEXTURE_SET: u32 = 4;
pub const SHADOW_MAP_SET: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingSlot {
    pub set: u32,
    pub binding: u32,
}

impl BindingSlot {
    pub const fn new(set: u32, binding: u32) -> Self {
        Self { set, binding }
    }
}

impl fmt::Display for BindingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(set {}, binding {})", self.set, self.binding)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    ModelMatrix,
    TranslationMatrix,
    ScaleMatrix,
    RotationMatrix,
    ViewMatrix,
    ProjectionMatrix,
    Light,
    DiffuseTexture,
    ShadowMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingType {
    UniformBuffer,
    TextureSampler,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateFrequency {
    PerObject,
    PerFrame,
    PerLight,
    PerMaterial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutEntry {
    pub slot: BindingSlot,
    pub resource: ResourceKind,
    pub binding_type: BindingType,
    pub stage: ShaderStage,
    pub frequency: UpdateFrequency,
}

/// Capabilities selected for one pipeline variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PipelineFeatures {
    pub textured: bool,
    pub shadowed: bool,
    pub decomposed_transform: bool,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("nothing bound at {slot} for {resource:?}")]
    Missing {
        slot: BindingSlot,
        resource: ResourceKind,
    },
    #[error("{slot} expects {expected:?} but {found:?} was bound")]
    TypeMismatch {
        slot: BindingSlot,
        expected: BindingType,
        found: BindingType,
    },
    #[error("{slot} is not part of this pipeline layout")]
    Undeclared { slot: BindingSlot },
}

/// What the host has actually bound, recorded before the first draw.
#[derive(Debug, Clone, Default)]
pub struct BoundResources {
    bound: BTreeMap<BindingSlot, BindingType>,
}

impl BoundResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, slot: BindingSlot, binding_type: BindingType) -> &mut Self {
        self.bound.insert(slot, binding_type);
        self
    }

    pub fn bind_uniform(&mut self, set: u32, binding: u32) -> &mut Self {
        self.bind(BindingSlot::new(set, binding), BindingType::UniformBuffer)
    }

    pub fn bind_sampler(&mut self, set: u32, binding: u32) -> &mut Self {
        self.bind(BindingSlot::new(set, binding), BindingType::TextureSampler)
    }

    pub fn get(&self, slot: BindingSlot) -> Option<BindingType> {
        self.bound.get(&slot).copied()
    }
}

/// Immutable layout of one pipeline variant.
///
/// Only the contents behind a slot change between draws; changing the layout
/// means building a new pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineLayout {
    features: PipelineFeatures,
    entries: Vec<LayoutEntry>,
}

impl PipelineLayout {
    pub fn new(features: PipelineFeatures) -> Self {
        let mut entries = Vec::with_capacity(8);
        let uniform = |set, binding, resource, stage, frequency| LayoutEntry {
            slot: BindingSlot::new(set, binding),
            resource,
            binding_type: BindingType::UniformBuffer,
            stage,
            frequency,
        };

        if features.decomposed_transform {
            for (binding, resource) in [
                ResourceKind::TranslationMatrix,
                ResourceKind::ScaleMatrix,
                ResourceKind::RotationMatrix,
            ]
            .into_iter()
            .enumerate()
            {
                entries.push(uniform(
                    TRANSFORM_SET,
                    binding as u32,
                    resource,
                    ShaderStage::Vertex,
                    UpdateFrequency::PerObject,
                ));
            }
        } else {
            entries.push(uniform(
                TRANSFORM_SET,
                0,
                ResourceKind::ModelMatrix,
                ShaderStage::Vertex,
                UpdateFrequency::PerObject,
            ));
        }

        entries.push(uniform(
            VIEW_SET,
            0,
            ResourceKind::ViewMatrix,
            ShaderStage::Vertex,
            UpdateFrequency::PerFrame,
        ));
        entries.push(uniform(
            PROJECTION_SET,
            0,
            ResourceKind::ProjectionMatrix,
            ShaderStage::Vertex,
            UpdateFrequency::PerFrame,
        ));
        entries.push(uniform(
            LIGHT_SET,
            0,
            ResourceKind::Light,
            ShaderStage::Fragment,
            UpdateFrequency::PerLight,
        ));

        if features.textured {
            entries.push(LayoutEntry {
                slot: BindingSlot::new(DIFFUSE_TEXTURE_SET, 0),
                resource: ResourceKind::DiffuseTexture,
                binding_type: BindingType::TextureSampler,
                stage: ShaderStage::Fragment,
                frequency: UpdateFrequency::PerMaterial,
            });
        }
        if features.shadowed {
            entries.push(LayoutEntry {
                slot: BindingSlot::new(SHADOW_MAP_SET, 0),
                resource: ResourceKind::ShadowMap,
                binding_type: BindingType::TextureSampler,
                stage: ShaderStage::Fragment,
                frequency: UpdateFrequency::PerLight,
            });
        }

        Self { features, entries }
    }

    pub fn features(&self) -> PipelineFeatures {
        self.features
    }

    pub fn entries(&self) -> &[LayoutEntry] {
        &self.entries
    }

    pub fn entry(&self, resource: ResourceKind) -> Option<&LayoutEntry> {
        self.entries.iter().find(|e| e.resource == resource)
    }

    pub fn slot_of(&self, resource: ResourceKind) -> Option<BindingSlot> {
        self.entry(resource).map(|e| e.slot)
    }

    pub fn entries_in_set(&self, set: u32) -> Vec<&LayoutEntry> {
        self.entries.iter().filter(|e| e.slot.set == set).collect()
    }

    /// Number of set layouts the pipeline needs, including empty gaps.
    pub fn set_count(&self) -> u32 {
        self.entries
            .iter()
            .map(|e| e.slot.set + 1)
            .max()
            .unwrap_or(0)
    }

    /// One-time setup check that every declared slot is bound with the right
    /// type and nothing outside the layout is bound.
    pub fn validate(&self, bound: &BoundResources) -> Result<(), LayoutError> {
        for entry in &self.entries {
            match bound.get(entry.slot) {
                None => {
                    return Err(LayoutError::Missing {
                        slot: entry.slot,
                        resource: entry.resource,
                    });
                }
                Some(found) if found != entry.binding_type => {
                    return Err(LayoutError::TypeMismatch {
                        slot: entry.slot,
                        expected: entry.binding_type,
                        found,
                    });
                }
                Some(_) => {}
            }
        }

        if let Some(&slot) = bound
            .bound
            .keys()
            .find(|slot| !self.entries.iter().any(|e| e.slot == **slot))
        {
            return Err(LayoutError::Undeclared { slot });
        }

        Ok(())
    }
}

impl fmt::Display for PipelineLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "set binding resource           type            stage    frequency")?;
        for e in &self.entries {
            writeln!(
                f,
                "{:<3} {:<7} {:<18} {:<15} {:<8} {:?}",
                e.slot.set,
                e.slot.binding,
                format!("{:?}", e.resource),
                format!("{:?}", e.binding_type),
                format!("{:?}", e.stage),
                e.frequency
            )?;
        }
        Ok(())
    }
}
