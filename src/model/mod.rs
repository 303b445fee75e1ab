//! # Model
//!
//! Clean DTOs shared by topology, networks and evaluation.
//!
//! Design rule: this module is pure data. No world access, no caches.

pub mod position;
pub mod value_type;
pub mod value;
pub mod part;

pub use position::{Position, Side, PartPos};
pub use value_type::ValueType;
pub use value::{Value, BlockState, values_equal};
pub use part::{Part, PartId, PartType, PartState, Aspect};
