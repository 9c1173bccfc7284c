//! The in-memory client registry and per-client transition engine
//! (§3, §4.2, §4.3). Ephemeral and unbounded by design (§1 Non-goals,
//! §5 Bounded growth).

pub mod record;
pub mod registry;
pub mod state;
pub mod transition;

pub use record::ClientRecord;
pub use registry::{ClientRegistry, SweepResult};
pub use state::{classify, Classification, ClientState};
pub use transition::Transition;
