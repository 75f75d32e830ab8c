//! Action routing subsystem.
//!
//! # Data Flow
//! ```text
//! SOAPAction header (raw)
//!     → action.rs (strip namespace prefix and quotes, trim)
//!     → aliases.rs (external action name → operation name)
//!     → Return: operation name (never an error)
//!
//! Alias compilation (at startup):
//!     SoapService::actions()
//!     → AliasTable
//!     → Freeze inside the ServiceDescriptor
//! ```
//!
//! # Design Decisions
//! - Aliases compiled at registration, immutable at runtime
//! - Resolution never fails; unknown names surface as a missing operation
//! - Deterministic: same header always resolves to the same name

pub mod action;
pub mod aliases;

pub use action::{ActionResolver, DEFAULT_ACTION_NAMESPACE};
pub use aliases::AliasTable;
