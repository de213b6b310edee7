use std::{any::Any, time::Duration};

use log::warn;

use tether_serde::{BitReader, BitWrite, SerdeErr};

mod animator;
mod blend;
mod error;
mod property;
mod read_mode;
mod rigidbody;
mod transform;

pub use animator::{Animator, AnimatorParameter, AnimatorValue, AnimatorValueKind};
pub use blend::{Blend, Interpolate};
pub use error::AnimatorError;
pub use property::Property;
pub use read_mode::ReadMode;
pub use rigidbody::Rigidbody;
pub use transform::Transform;

/// A capability of a replicated entity that owns a fixed, ordered set of
/// fields and knows which of them changed since they were last sent.
///
/// `field_count` must never change over the component's lifetime: the
/// entity sizes its dirty mask from it once, at attach time.
pub trait SyncComponent: Any + Send {
    /// Name used in logs
    fn name(&self) -> &'static str;

    fn field_count(&self) -> usize;

    /// One entry per field, `true` when the field differs from the value
    /// last sent (or was never sent)
    fn dirty_vector(&self) -> Vec<bool>;

    /// Writes every dirty field, or every field when `force_all`, in field
    /// order, and records the written values as sent
    fn write_changed(&mut self, writer: &mut dyn BitWrite, force_all: bool);

    /// Writes every field in field order without recording anything as sent
    fn write_snapshot(&self, writer: &mut dyn BitWrite);

    /// Reads the fields selected by `mode`, in field order, without
    /// touching the component. The result is handed back to `apply`.
    fn decode(&self, reader: &mut BitReader, mode: ReadMode) -> Result<Staged, SerdeErr>;

    /// Applies fields produced by this component's own `decode` with the
    /// same `mode`
    fn apply(&mut self, staged: Staged, mode: ReadMode);

    /// Decodes then applies. An error leaves the component untouched.
    fn read_changed(&mut self, reader: &mut BitReader, mode: ReadMode) -> Result<(), SerdeErr> {
        let staged = self.decode(reader, mode)?;
        self.apply(staged, mode);
        Ok(())
    }

    /// Moves any in-flight interpolation forward by `delta`
    fn advance(&mut self, _delta: Duration) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Field values decoded by `SyncComponent::decode` and not yet applied
pub type Staged = Box<dyn Any + Send>;

/// Unboxes values staged by `component`'s `decode`. Values staged by a
/// different component type are logged and discarded.
pub fn unstage<T: Any>(component: &'static str, staged: Staged) -> Option<T> {
    match staged.downcast::<T>() {
        Ok(fields) => Some(*fields),
        Err(_) => {
            warn!("{} was handed fields decoded by another component", component);
            None
        }
    }
}
