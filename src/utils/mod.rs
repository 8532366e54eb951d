//! Shared utilities: unit handling and topology validation.

pub mod units;
pub mod validation;

pub use units::{convert, parse_quantity, BufferUnit, CapacityUnit, DelayUnit, Unit, UnitError};
pub use validation::{validate_link_units, validate_topology};
