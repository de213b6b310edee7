use thiserror::Error;

/// Errors raised while reading values out of a bit stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SerdeErr {
    /// The stream ended before the value was complete
    #[error("Unexpected end of stream: wanted {wanted_bits} more bits but only {remaining_bits} remain")]
    UnexpectedEnd { wanted_bits: u32, remaining_bits: u32 },

    /// The bits decoded into a value that is not valid for the type
    #[error("Invalid value {value} for {type_name}")]
    InvalidValue { type_name: &'static str, value: i64 },

    /// The integer does not fit in the configured bit width
    #[error("Integer {value} does not fit in {bits} bits")]
    IntegerOutOfRange { value: i64, bits: u8 },
}
