//! `gn-movement` — per-agent navigation state and the tick arbiter.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                        |
//! |--------------|-----------------------------------------------------------------|
//! | [`settings`] | `AgentSettings` — step durations, diagonal policy, limits       |
//! | [`state`]    | `MovementState`, `PathStatus`, `PathRequestState`               |
//! | [`agent`]    | `NavAgent` — one agent's full navigation record                 |
//! | [`space`]    | `NavSpace` — per-floor terrain + occupancy seam                 |
//! | [`arbiter`]  | `MovementArbiter` — the tick state machine                      |
//! | [`report`]   | `TickReport`, `MovementEvent`                                   |
//! | [`snapshot`] | `MovementSnapshot` — broadcastable per-agent movement summary   |
//! | [`error`]    | `MovementError`, `MovementResult<T>`                            |
//!
//! # State machine
//!
//! ```text
//!   Idle ──request──▶ Pending ──search──▶ Ready ──claim──▶ Following ─┐
//!                        │                  ▲                 │       │
//!                        └──▶ Failed ◀──────┼── retries ──────┘       │
//!                                           └──── next waypoint ◀─────┘
//!   Following ──last step──▶ Completed (one tick) ──▶ Idle
//! ```
//!
//! While `Ready`/`Following`, an agent whose next cell is held by someone
//! else carries a `WaitingForBlocker` overlay (`NavAgent::waiting_for`).
//! The arbiter never repaths on its own; after `max_block_retries` failed
//! claims the request fails with `BlockedByEntity`.
//!
//! # Tick phases
//!
//! 1. Agents that reported `Completed` on an earlier tick return to `Idle`.
//! 2. Up to `max_requests_per_tick` pending requests are searched.
//! 3. Every step with `end_tick <= now` is finalised: the origin cell is
//!    released and the cursor advances.
//! 4. In ascending id order, each idle-footed `Ready`/`Following` agent
//!    checks its next cell, claims it, and starts the timed step.

pub mod agent;
pub mod arbiter;
pub mod error;
pub mod report;
pub mod settings;
pub mod snapshot;
pub mod space;
pub mod state;

#[cfg(test)]
mod tests;

pub use agent::NavAgent;
pub use arbiter::MovementArbiter;
pub use error::{MovementError, MovementResult};
pub use report::{MovementEvent, TickReport};
pub use settings::AgentSettings;
pub use snapshot::MovementSnapshot;
pub use space::NavSpace;
pub use state::{MovementState, PathRequestState, PathStatus};
