//! Camera event subsystem.
//!
//! ```text
//!  (ActionEnvelope, EventBody)
//!            │
//!            ▼
//!   ┌──────────────────┐    TrackedEvent    ┌───────────┐   ProjectedEvent
//!   │ EventStateMachine│ ─────────────────▶ │ Projector │ ───────────────▶
//!   │  RetentionStore  │                    └───────────┘
//!   └──────────────────┘
//! ```

pub mod machine;
pub mod model;
pub mod projector;
pub mod snapshot;
pub mod store;

pub use machine::{DropReason, EventStateMachine, Ingest};
pub use model::{Action, ActionEnvelope, EventBody, EventType, Field, TrackedEvent};
pub use projector::{ProjectedEvent, Projector, project};
pub use snapshot::CameraEventState;
