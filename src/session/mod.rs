//! Two-party play: one host resolves, one guest mirrors.

pub mod coordinator;
pub mod driver;
pub mod protocol;
pub mod transport;

pub use coordinator::{SessionCoordinator, SessionNotice, SessionPhase, SessionRole, SessionStep};
pub use driver::SessionDriver;
pub use protocol::{generate_room_id, WireMessage};
pub use transport::{memory_pair, MemoryTransport, Transport};
