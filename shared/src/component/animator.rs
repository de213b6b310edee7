use std::any::Any;

use tether_serde::{BitReader, BitWrite, Serde, SerdeErr, UnsignedInteger};

use super::{unstage, AnimatorError, Property, ReadMode, Staged, SyncComponent};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimatorValueKind {
    Float,
    Int,
    Bool,
}

/// Value of one animation parameter, written as a 2-bit tag followed by
/// the payload
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnimatorValue {
    Float(f32),
    Int(i32),
    Bool(bool),
}

impl AnimatorValue {
    pub fn kind(&self) -> AnimatorValueKind {
        match self {
            AnimatorValue::Float(_) => AnimatorValueKind::Float,
            AnimatorValue::Int(_) => AnimatorValueKind::Int,
            AnimatorValue::Bool(_) => AnimatorValueKind::Bool,
        }
    }

    fn tag(&self) -> u8 {
        match self {
            AnimatorValue::Float(_) => 0,
            AnimatorValue::Int(_) => 1,
            AnimatorValue::Bool(_) => 2,
        }
    }
}

impl Serde for AnimatorValue {
    fn ser(&self, writer: &mut dyn BitWrite) {
        UnsignedInteger::<2>::new(self.tag()).ser(writer);
        match self {
            AnimatorValue::Float(value) => value.ser(writer),
            AnimatorValue::Int(value) => value.ser(writer),
            AnimatorValue::Bool(value) => value.ser(writer),
        }
    }

    fn de(reader: &mut BitReader) -> Result<Self, SerdeErr> {
        let tag = UnsignedInteger::<2>::de(reader)?.get();
        match tag {
            0 => Ok(AnimatorValue::Float(f32::de(reader)?)),
            1 => Ok(AnimatorValue::Int(i32::de(reader)?)),
            2 => Ok(AnimatorValue::Bool(bool::de(reader)?)),
            _ => Err(SerdeErr::InvalidValue {
                type_name: "AnimatorValue",
                value: tag,
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AnimatorParameter {
    name: String,
    value: Property<AnimatorValue>,
}

impl AnimatorParameter {
    pub fn new(name: impl Into<String>, value: AnimatorValue) -> Self {
        Self {
            name: name.into(),
            value: Property::new(value),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> AnimatorValue {
        *self.value.get()
    }

    pub fn kind(&self) -> AnimatorValueKind {
        self.value.get().kind()
    }
}

/// Animation parameters, one field per parameter. Parameters are declared
/// up front and keep their kind for the component's lifetime.
#[derive(Clone, Debug, Default)]
pub struct Animator {
    parameters: Vec<AnimatorParameter>,
}

impl Animator {
    pub fn new(parameters: Vec<AnimatorParameter>) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &[AnimatorParameter] {
        &self.parameters
    }

    pub fn get(&self, name: &str) -> Option<AnimatorValue> {
        self.parameters
            .iter()
            .find(|parameter| parameter.name == name)
            .map(AnimatorParameter::value)
    }

    pub fn set(&mut self, name: &str, value: AnimatorValue) -> Result<(), AnimatorError> {
        let Some(parameter) = self
            .parameters
            .iter_mut()
            .find(|parameter| parameter.name == name)
        else {
            return Err(AnimatorError::UnknownParameter {
                name: name.to_string(),
            });
        };

        if parameter.kind() != value.kind() {
            return Err(AnimatorError::KindMismatch {
                name: name.to_string(),
                expected: parameter.kind(),
                found: value.kind(),
            });
        }

        parameter.value.set(value);
        Ok(())
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> Result<(), AnimatorError> {
        self.set(name, AnimatorValue::Float(value))
    }

    pub fn set_int(&mut self, name: &str, value: i32) -> Result<(), AnimatorError> {
        self.set(name, AnimatorValue::Int(value))
    }

    pub fn set_bool(&mut self, name: &str, value: bool) -> Result<(), AnimatorError> {
        self.set(name, AnimatorValue::Bool(value))
    }
}

impl SyncComponent for Animator {
    fn name(&self) -> &'static str {
        "Animator"
    }

    fn field_count(&self) -> usize {
        self.parameters.len()
    }

    fn dirty_vector(&self) -> Vec<bool> {
        self.parameters
            .iter()
            .map(|parameter| parameter.value.is_dirty())
            .collect()
    }

    fn write_changed(&mut self, writer: &mut dyn BitWrite, force_all: bool) {
        for parameter in &mut self.parameters {
            if force_all || parameter.value.is_dirty() {
                parameter.value.write(writer);
            }
        }
    }

    fn write_snapshot(&self, writer: &mut dyn BitWrite) {
        for parameter in &self.parameters {
            parameter.value.write_snapshot(writer);
        }
    }

    fn decode(&self, reader: &mut BitReader, mode: ReadMode) -> Result<Staged, SerdeErr> {
        let mut received: Vec<(usize, AnimatorValue)> = Vec::new();
        for (index, parameter) in self.parameters.iter().enumerate() {
            if !mode.selects(index) {
                continue;
            }
            let value = Property::<AnimatorValue>::read_value(reader)?;
            // A peer built from the same template never changes a kind
            if value.kind() != parameter.kind() {
                return Err(SerdeErr::InvalidValue {
                    type_name: "AnimatorValue",
                    value: i64::from(value.tag()),
                });
            }
            received.push((index, value));
        }
        Ok(Box::new(received))
    }

    fn apply(&mut self, staged: Staged, _mode: ReadMode) {
        let Some(received) = unstage::<Vec<(usize, AnimatorValue)>>(self.name(), staged) else {
            return;
        };
        for (index, value) in received {
            if let Some(parameter) = self.parameters.get_mut(index) {
                parameter.value.mirror(value);
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
