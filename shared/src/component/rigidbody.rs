use std::any::Any;

use glam::Vec3;
use tether_serde::{BitReader, BitWrite, SerdeErr};

use super::{unstage, Property, ReadMode, Staged, SyncComponent};

/// Linear and angular velocity. Received values apply immediately.
#[derive(Clone, Debug)]
pub struct Rigidbody {
    pub velocity: Property<Vec3>,
    pub angular_velocity: Property<Vec3>,
}

impl Rigidbody {
    pub fn new(velocity: Vec3, angular_velocity: Vec3) -> Self {
        Self {
            velocity: Property::new(velocity),
            angular_velocity: Property::new(angular_velocity),
        }
    }
}

impl Default for Rigidbody {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO)
    }
}

impl SyncComponent for Rigidbody {
    fn name(&self) -> &'static str {
        "Rigidbody"
    }

    fn field_count(&self) -> usize {
        2
    }

    fn dirty_vector(&self) -> Vec<bool> {
        vec![self.velocity.is_dirty(), self.angular_velocity.is_dirty()]
    }

    fn write_changed(&mut self, writer: &mut dyn BitWrite, force_all: bool) {
        if force_all || self.velocity.is_dirty() {
            self.velocity.write(writer);
        }
        if force_all || self.angular_velocity.is_dirty() {
            self.angular_velocity.write(writer);
        }
    }

    fn write_snapshot(&self, writer: &mut dyn BitWrite) {
        self.velocity.write_snapshot(writer);
        self.angular_velocity.write_snapshot(writer);
    }

    fn decode(&self, reader: &mut BitReader, mode: ReadMode) -> Result<Staged, SerdeErr> {
        let velocity = if mode.selects(0) {
            Some(Property::<Vec3>::read_value(reader)?)
        } else {
            None
        };
        let angular_velocity = if mode.selects(1) {
            Some(Property::<Vec3>::read_value(reader)?)
        } else {
            None
        };
        Ok(Box::new((velocity, angular_velocity)))
    }

    fn apply(&mut self, staged: Staged, _mode: ReadMode) {
        let Some((velocity, angular_velocity)) =
            unstage::<(Option<Vec3>, Option<Vec3>)>(self.name(), staged)
        else {
            return;
        };
        if let Some(velocity) = velocity {
            self.velocity.mirror(velocity);
        }
        if let Some(angular_velocity) = angular_velocity {
            self.angular_velocity.mirror(angular_velocity);
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
