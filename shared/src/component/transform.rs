use std::{any::Any, time::Duration};

use glam::{Quat, Vec3};
use tether_serde::{BitReader, BitWrite, SerdeErr};

use super::{unstage, Blend, Property, ReadMode, Staged, SyncComponent};

const POSITION: usize = 0;
const ROTATION: usize = 1;

/// Position and rotation. Deltas are smoothed over the blend interval:
/// position linearly, rotation spherically.
#[derive(Clone, Debug)]
pub struct Transform {
    pub position: Property<Vec3>,
    pub rotation: Property<Quat>,
    position_blend: Option<Blend<Vec3>>,
    rotation_blend: Option<Blend<Quat>>,
}

impl Transform {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self {
            position: Property::new(position),
            rotation: Property::new(rotation),
            position_blend: None,
            rotation_blend: None,
        }
    }

    /// Where the position is heading, or the position itself when idle
    pub fn target_position(&self) -> Vec3 {
        match &self.position_blend {
            Some(blend) => *blend.target(),
            None => *self.position,
        }
    }

    pub fn target_rotation(&self) -> Quat {
        match &self.rotation_blend {
            Some(blend) => *blend.target(),
            None => *self.rotation,
        }
    }

    pub fn is_blending(&self) -> bool {
        self.position_blend.is_some() || self.rotation_blend.is_some()
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quat::IDENTITY)
    }
}

impl SyncComponent for Transform {
    fn name(&self) -> &'static str {
        "Transform"
    }

    fn field_count(&self) -> usize {
        2
    }

    fn dirty_vector(&self) -> Vec<bool> {
        vec![self.position.is_dirty(), self.rotation.is_dirty()]
    }

    fn write_changed(&mut self, writer: &mut dyn BitWrite, force_all: bool) {
        if force_all || self.position.is_dirty() {
            self.position.write(writer);
        }
        if force_all || self.rotation.is_dirty() {
            self.rotation.write(writer);
        }
    }

    fn write_snapshot(&self, writer: &mut dyn BitWrite) {
        self.position.write_snapshot(writer);
        self.rotation.write_snapshot(writer);
    }

    fn decode(&self, reader: &mut BitReader, mode: ReadMode) -> Result<Staged, SerdeErr> {
        let position = if mode.selects(POSITION) {
            Some(Property::<Vec3>::read_value(reader)?)
        } else {
            None
        };
        let rotation = if mode.selects(ROTATION) {
            Some(Property::<Quat>::read_value(reader)?)
        } else {
            None
        };
        Ok(Box::new((position, rotation)))
    }

    fn apply(&mut self, staged: Staged, mode: ReadMode) {
        let Some((position, rotation)) = unstage::<(Option<Vec3>, Option<Quat>)>(self.name(), staged)
        else {
            return;
        };
        let interval = mode.blend_interval();

        if let Some(position) = position {
            if interval.is_zero() {
                self.position_blend = None;
                self.position.mirror(position);
            } else {
                self.position_blend = Some(Blend::new(*self.position, position, interval));
            }
        }
        if let Some(rotation) = rotation {
            if interval.is_zero() {
                self.rotation_blend = None;
                self.rotation.mirror(rotation);
            } else {
                self.rotation_blend = Some(Blend::new(*self.rotation, rotation, interval));
            }
        }
    }

    fn advance(&mut self, delta: Duration) {
        if let Some(blend) = &mut self.position_blend {
            self.position.mirror(blend.advance(delta));
            if blend.is_finished() {
                self.position_blend = None;
            }
        }
        if let Some(blend) = &mut self.rotation_blend {
            self.rotation.mirror(blend.advance(delta));
            if blend.is_finished() {
                self.rotation_blend = None;
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
