//! Domain models for agentshift
//!
//! Contains the item, warning and emission types shared by plugins and the
//! conversion pipeline, without any I/O concerns.

mod emission;
mod id;
mod item;
mod warning;

pub use emission::{DiscoverResult, EmitOptions, EmitResult, WrittenFile};
pub use id::{IdError, ItemId};
pub use item::{normalize_path, CustomizationItem, ItemKind, ItemMeta, ItemPayload, SkillFile};
pub use warning::{Warning, WarningCode};
