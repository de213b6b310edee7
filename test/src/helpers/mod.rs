
pub use local_transport::{LocalTransport, Outbox, SentMessage};
pub use session_pair::{deliver, TestClient, TestHost};
pub use test_components::{Score, Vitals};
pub use test_templates::{origin_table, CrateTemplate, PlayerTemplate, UnitTemplate, CRATE, PLAYER, UNIT};
