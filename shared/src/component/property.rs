use std::ops::{Deref, DerefMut};

use tether_serde::{BitReader, BitWrite, Serde, SerdeErr};

/// A replicated field: the current value plus the value last written to the
/// network. The field is dirty whenever the two differ.
#[derive(Clone, Debug)]
pub struct Property<T: Serde> {
    value: T,
    last_sent: Option<T>,
}

impl<T: Serde> Property<T> {
    /// A new Property is dirty until it is first written
    pub fn new(value: T) -> Self {
        Self {
            value,
            last_sent: None,
        }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    pub fn is_dirty(&self) -> bool {
        self.last_sent.as_ref() != Some(&self.value)
    }

    /// Writes the value and records it as sent
    pub fn write(&mut self, writer: &mut dyn BitWrite) {
        self.value.ser(writer);
        self.last_sent = Some(self.value.clone());
    }

    /// Writes the value without touching the sent record
    pub fn write_snapshot(&self, writer: &mut dyn BitWrite) {
        self.value.ser(writer);
    }

    pub fn read_value(reader: &mut BitReader) -> Result<T, SerdeErr> {
        T::de(reader)
    }

    /// Sets a value received from the host. Mirrored values are never dirty.
    pub fn mirror(&mut self, value: T) {
        self.last_sent = Some(value.clone());
        self.value = value;
    }
}

impl<T: Serde> Deref for Property<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: Serde> DerefMut for Property<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}
