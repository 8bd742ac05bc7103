//! bodies.rs
//!
//! Body descriptors are the only input to a scene build. They are never
//! mutated in place: the editing side always hands over a whole new list.

use std::sync::Arc;

use bevy::prelude::*;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::config::BODY_PALETTE;

/// One orbiting body as supplied by the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDescriptor {
    /// display only
    #[serde(default)]
    pub name: String,
    /// sphere radius
    #[serde(default, deserialize_with = "number_or_zero")]
    pub size: f32,
    /// hex string, e.g. "#3357ff" or "#f80"; color names are not accepted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// angular rate, any sign
    #[serde(default, deserialize_with = "number_or_zero")]
    pub speed: f32,
    /// orbit radius
    #[serde(default, deserialize_with = "number_or_zero")]
    pub distance: f32,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LenientNumber {
    Number(f32),
    Other(IgnoredAny),
}

// saved lists may carry `null` (a serialized NaN) or other junk where a number belongs
fn number_or_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f32, D::Error> {
    Ok(match LenientNumber::deserialize(deserializer)? {
        LenientNumber::Number(value) => value,
        LenientNumber::Other(_) => 0.0,
    })
}

#[derive(Error, Debug, PartialEq)]
pub enum DescriptorError {
    #[error("body #{index} ({name}): size must be a positive number, got {value}")]
    Size { index: usize, name: String, value: f32 },
    #[error("body #{index} ({name}): speed must be finite, got {value}")]
    Speed { index: usize, name: String, value: f32 },
    #[error("body #{index} ({name}): distance must be a non-negative number, got {value}")]
    Distance { index: usize, name: String, value: f32 },
    #[error("body #{index} ({name}): invalid color {value:?}")]
    Color { index: usize, name: String, value: String },
}

impl BodyDescriptor {
    pub fn new(name: &str, size: f32, color: Option<&str>, speed: f32, distance: f32) -> Self {
        Self {
            name: name.to_string(),
            size,
            color: color.map(str::to_string),
            speed,
            distance,
        }
    }

    /// Strict check used by the editing side before a list is handed over
    pub fn validate(&self, index: usize) -> Result<(), DescriptorError> {
        let name = || self.name.clone();

        if !(self.size.is_finite() && self.size > 0.0) {
            return Err(DescriptorError::Size { index, name: name(), value: self.size });
        }
        if !self.speed.is_finite() {
            return Err(DescriptorError::Speed { index, name: name(), value: self.speed });
        }
        if !(self.distance.is_finite() && self.distance >= 0.0) {
            return Err(DescriptorError::Distance { index, name: name(), value: self.distance });
        }
        if let Some(color) = &self.color {
            if Srgba::hex(color).is_err() {
                return Err(DescriptorError::Color { index, name: name(), value: color.clone() });
            }
        }
        Ok(())
    }
}

/// Validate a whole list, reporting the first offending body
pub fn validate_all(bodies: &[BodyDescriptor]) -> Result<(), DescriptorError> {
    bodies
        .iter()
        .enumerate()
        .try_for_each(|(index, body)| body.validate(index))
}

/// The active descriptor list. Replacing the `Arc` is what triggers a rebuild;
/// mutating through `ResMut` without swapping the pointer does not.
#[derive(Resource, Debug, Clone)]
pub struct BodyList(pub Arc<[BodyDescriptor]>);

impl BodyList {
    pub fn new(bodies: Vec<BodyDescriptor>) -> Self {
        Self(bodies.into())
    }
}

/// Build-time values, degraded instead of rejected so the frame loop never sees NaN
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedBody {
    pub size: f32,
    pub speed: f32,
    pub orbit_radius: f32,
    pub color: Color,
}

impl ResolvedBody {
    pub fn is_visible(&self) -> bool {
        self.size > 0.0
    }
}

pub fn resolve(index: usize, body: &BodyDescriptor) -> ResolvedBody {
    let size = finite_or_zero(body.size).max(0.0);
    let speed = finite_or_zero(body.speed);
    let orbit_radius = finite_or_zero(body.distance).max(0.0);

    if size != body.size || speed != body.speed || orbit_radius != body.distance {
        warn!(
            "Body #{} ({}) has degenerate values (size {}, speed {}, distance {}), using zero",
            index, body.name, body.size, body.speed, body.distance
        );
    }

    ResolvedBody {
        size,
        speed,
        orbit_radius,
        color: body_color(index, body.color.as_deref()),
    }
}

/// Descriptor color, or the palette entry for this index
pub fn body_color(index: usize, color: Option<&str>) -> Color {
    match color.map(Srgba::hex) {
        Some(Ok(srgba)) => srgba.into(),
        Some(Err(e)) => {
            warn!("Body #{} color {:?} rejected ({}), using palette", index, color, e);
            palette_color(index)
        }
        None => palette_color(index),
    }
}

pub fn palette_color(index: usize) -> Color {
    hex_color(BODY_PALETTE[index % BODY_PALETTE.len()])
}

pub fn hex_color(rgb: u32) -> Color {
    Color::srgb_u8((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

fn finite_or_zero(value: f32) -> f32 {
    if value.is_finite() { value } else { 0.0 }
}
