//! Measurement unit parsing and conversion.
//!
//! This module provides the delay, capacity and buffer units a topology
//! stores its link attributes in, and helpers for parsing quantity strings
//! (e.g., "2ms", "10Mbps") into a value and a unit.

use std::fmt;
use std::str::FromStr;

/// Errors raised while parsing or converting units
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UnitError {
    #[error("Unknown {kind} unit: '{unit}'")]
    UnknownUnit { kind: &'static str, unit: String },
    #[error("Cannot convert from '{from}' to '{to}'")]
    Incompatible { from: String, to: String },
    #[error("Invalid quantity: '{0}'")]
    InvalidQuantity(String),
}

/// Common behaviour of every unit family
pub trait Unit: Copy + PartialEq + FromStr<Err = UnitError> + fmt::Display {
    /// Multiplier to the family's base unit, `None` if the unit has no base
    fn factor(self) -> Option<f64>;

    /// Canonical name written to topology files
    fn name(self) -> &'static str;
}

/// Time units for link delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelayUnit {
    Ns,
    Us,
    Ms,
    S,
    Min,
    H,
}

impl Unit for DelayUnit {
    fn factor(self) -> Option<f64> {
        Some(match self {
            Self::Ns => 1e-9,
            Self::Us => 1e-6,
            Self::Ms => 1e-3,
            Self::S => 1.0,
            Self::Min => 60.0,
            Self::H => 3600.0,
        })
    }

    fn name(self) -> &'static str {
        match self {
            Self::Ns => "ns",
            Self::Us => "us",
            Self::Ms => "ms",
            Self::S => "s",
            Self::Min => "min",
            Self::H => "h",
        }
    }
}

impl FromStr for DelayUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ns" => Ok(Self::Ns),
            "us" => Ok(Self::Us),
            "ms" => Ok(Self::Ms),
            "s" | "sec" => Ok(Self::S),
            "m" | "min" => Ok(Self::Min),
            "h" | "hr" => Ok(Self::H),
            other => Err(UnitError::UnknownUnit { kind: "delay", unit: other.to_string() }),
        }
    }
}

/// Bandwidth units for link capacities (decimal multiples)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityUnit {
    Bps,
    Kbps,
    Mbps,
    Gbps,
    Tbps,
}

impl Unit for CapacityUnit {
    fn factor(self) -> Option<f64> {
        Some(match self {
            Self::Bps => 1.0,
            Self::Kbps => 1e3,
            Self::Mbps => 1e6,
            Self::Gbps => 1e9,
            Self::Tbps => 1e12,
        })
    }

    fn name(self) -> &'static str {
        match self {
            Self::Bps => "bps",
            Self::Kbps => "Kbps",
            Self::Mbps => "Mbps",
            Self::Gbps => "Gbps",
            Self::Tbps => "Tbps",
        }
    }
}

impl FromStr for CapacityUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "bps" | "b/s" => Ok(Self::Bps),
            "kbps" | "Kbps" | "kb/s" | "Kb/s" => Ok(Self::Kbps),
            "Mbps" | "Mb/s" => Ok(Self::Mbps),
            "Gbps" | "Gb/s" => Ok(Self::Gbps),
            "Tbps" | "Tb/s" => Ok(Self::Tbps),
            other => Err(UnitError::UnknownUnit { kind: "capacity", unit: other.to_string() }),
        }
    }
}

/// Units for link buffer sizes
///
/// `Packets` has no byte equivalent, so it only converts to itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUnit {
    Packets,
    Bytes,
    KB,
    MB,
    GB,
}

impl Unit for BufferUnit {
    fn factor(self) -> Option<f64> {
        match self {
            Self::Packets => None,
            Self::Bytes => Some(1.0),
            Self::KB => Some(1e3),
            Self::MB => Some(1e6),
            Self::GB => Some(1e9),
        }
    }

    fn name(self) -> &'static str {
        match self {
            Self::Packets => "packets",
            Self::Bytes => "bytes",
            Self::KB => "KB",
            Self::MB => "MB",
            Self::GB => "GB",
        }
    }
}

impl FromStr for BufferUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "packets" => Ok(Self::Packets),
            "bytes" | "B" => Ok(Self::Bytes),
            "KB" => Ok(Self::KB),
            "MB" => Ok(Self::MB),
            "GB" => Ok(Self::GB),
            other => Err(UnitError::UnknownUnit { kind: "buffer", unit: other.to_string() }),
        }
    }
}

macro_rules! display_by_name {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        })*
    };
}

display_by_name!(DelayUnit, CapacityUnit, BufferUnit);

/// Round to 12 significant digits, dropping the noise of decimal factors
fn round_significant(value: f64) -> f64 {
    if value == 0.0 || !value.is_finite() {
        return value;
    }
    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10f64.powi(11 - magnitude);
    if !scale.is_finite() || scale == 0.0 {
        return value;
    }
    (value * scale).round() / scale
}

/// Convert `value` expressed in `from` into `to`
///
/// The result is rounded to 12 significant digits.
///
/// # Examples
/// ```
/// use topogen::utils::units::{convert, DelayUnit};
///
/// assert_eq!(convert(2.0, DelayUnit::S, DelayUnit::Ms), Ok(2000.0));
/// ```
pub fn convert<U: Unit>(value: f64, from: U, to: U) -> Result<f64, UnitError> {
    if from == to {
        return Ok(value);
    }
    match (from.factor(), to.factor()) {
        (Some(f), Some(t)) => Ok(round_significant(value * f / t)),
        _ => Err(UnitError::Incompatible { from: from.name().to_string(), to: to.name().to_string() }),
    }
}

/// Split a quantity string such as "10Mbps" or "2.5 ms" into value and unit
///
/// A bare number yields `None` for the unit.
///
/// # Examples
/// ```
/// use topogen::utils::units::{parse_quantity, CapacityUnit};
///
/// assert_eq!(parse_quantity::<CapacityUnit>("10Mbps"), Ok((10.0, Some(CapacityUnit::Mbps))));
/// assert_eq!(parse_quantity::<CapacityUnit>("100"), Ok((100.0, None)));
/// assert!(parse_quantity::<CapacityUnit>("fast").is_err());
/// ```
pub fn parse_quantity<U: Unit>(quantity: &str) -> Result<(f64, Option<U>), UnitError> {
    let quantity = quantity.trim();
    let split = quantity
        .char_indices()
        .find(|(_, c)| !(c.is_ascii_digit() || *c == '.' || *c == '-' || *c == '+'))
        .map(|(i, _)| i)
        .unwrap_or(quantity.len());

    let (number, unit) = quantity.split_at(split);
    let value = number
        .parse::<f64>()
        .map_err(|_| UnitError::InvalidQuantity(quantity.to_string()))?;

    let unit = unit.trim();
    if unit.is_empty() {
        Ok((value, None))
    } else {
        Ok((value, Some(unit.parse()?)))
    }
}
