//! JSON numbers that remember whether they arrived as integers or floats.
//!
//! Hashes are taken over JSON text, so `1672531200` and `1672531200.0` must
//! stay distinct values. Comparison and addition follow numeric semantics:
//! `1 == 1.0`, and any float operand makes the sum a float.

use crate::hashing::format_float;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy)]
pub enum Numeric {
    PosInt(u64),
    /// Always less than zero.
    NegInt(i64),
    Float(f64),
}

impl Numeric {
    pub const ZERO: Numeric = Numeric::PosInt(0);

    fn from_i128(value: i128) -> Option<Numeric> {
        if let Ok(v) = u64::try_from(value) {
            Some(Numeric::PosInt(v))
        } else {
            i64::try_from(value).ok().map(Numeric::NegInt)
        }
    }

    fn as_i128(self) -> Option<i128> {
        match self {
            Numeric::PosInt(v) => Some(v as i128),
            Numeric::NegInt(v) => Some(v as i128),
            Numeric::Float(_) => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            Numeric::PosInt(v) => v as f64,
            Numeric::NegInt(v) => v as f64,
            Numeric::Float(v) => v,
        }
    }

    pub fn as_u64(self) -> Option<u64> {
        match self {
            Numeric::PosInt(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Numeric::Float(_))
    }

    /// Integer sums stay integers and fail outside the `i64`/`u64` range;
    /// float sums fail when they stop being finite.
    pub fn checked_add(self, other: Numeric) -> Option<Numeric> {
        match (self.as_i128(), other.as_i128()) {
            (Some(a), Some(b)) => Numeric::from_i128(a + b),
            _ => {
                let sum = self.as_f64() + other.as_f64();
                sum.is_finite().then_some(Numeric::Float(sum))
            }
        }
    }

    /// Like [`Numeric::checked_add`], clamping integers at the range ends.
    pub fn saturating_add(self, other: Numeric) -> Numeric {
        match (self.as_i128(), other.as_i128()) {
            (Some(a), Some(b)) => Numeric::from_i128(a + b).unwrap_or(if a + b > 0 {
                Numeric::PosInt(u64::MAX)
            } else {
                Numeric::NegInt(i64::MIN)
            }),
            _ => Numeric::Float(self.as_f64() + other.as_f64()),
        }
    }
}

impl Default for Numeric {
    fn default() -> Self {
        Numeric::ZERO
    }
}

impl PartialEq for Numeric {
    fn eq(&self, other: &Self) -> bool {
        match (self.as_i128(), other.as_i128()) {
            (Some(a), Some(b)) => a == b,
            _ => self.as_f64() == other.as_f64(),
        }
    }
}

macro_rules! numeric_eq {
    ($($ty:ty),*) => {
        $(
            impl PartialEq<$ty> for Numeric {
                fn eq(&self, other: &$ty) -> bool {
                    *self == Numeric::from(*other)
                }
            }
        )*
    };
}

numeric_eq!(u64, u32, i64, i32, f64);

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Numeric::PosInt(v) => write!(f, "{}", v),
            Numeric::NegInt(v) => write!(f, "{}", v),
            Numeric::Float(v) => f.write_str(&format_float(*v)),
        }
    }
}

impl From<u64> for Numeric {
    fn from(v: u64) -> Self {
        Numeric::PosInt(v)
    }
}

impl From<u32> for Numeric {
    fn from(v: u32) -> Self {
        Numeric::PosInt(v as u64)
    }
}

impl From<i64> for Numeric {
    fn from(v: i64) -> Self {
        if v < 0 {
            Numeric::NegInt(v)
        } else {
            Numeric::PosInt(v as u64)
        }
    }
}

impl From<i32> for Numeric {
    fn from(v: i32) -> Self {
        Numeric::from(v as i64)
    }
}

impl From<f64> for Numeric {
    fn from(v: f64) -> Self {
        Numeric::Float(v)
    }
}

impl Serialize for Numeric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            Numeric::PosInt(v) => serializer.serialize_u64(v),
            Numeric::NegInt(v) => serializer.serialize_i64(v),
            Numeric::Float(v) => serializer.serialize_f64(v),
        }
    }
}

struct NumericVisitor;

impl<'de> Visitor<'de> for NumericVisitor {
    type Value = Numeric;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a number")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Numeric, E> {
        Ok(Numeric::from(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Numeric, E> {
        Ok(Numeric::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Numeric, E> {
        Ok(Numeric::Float(v))
    }
}

impl<'de> Deserialize<'de> for Numeric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(NumericVisitor)
    }
}
