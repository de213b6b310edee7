mod header;
mod message_kind;

pub use header::{SpawnHeader, UpdateHeader};
pub use message_kind::MessageKind;
