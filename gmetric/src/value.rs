use std::fmt;

use crate::{error::Error, metric::ValueType};

/// A measurement to report for a metric.
///
/// Values are converted to the metric's declared [`ValueType`] when written. Integer values that do not fit the
/// declared type are rejected rather than truncated.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// An unsigned integer.
    Unsigned(u64),

    /// A signed integer.
    Signed(i64),

    /// A floating point number.
    Float(f64),

    /// Free-form text.
    Text(String),
}

macro_rules! impl_from {
    ($variant:ident, $target:ty, $($source:ty),+) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    Value::$variant(<$target>::from(value))
                }
            }
        )+
    };
}

impl_from!(Unsigned, u64, u8, u16, u32, u64);
impl_from!(Signed, i64, i8, i16, i32, i64);
impl_from!(Float, f64, f32, f64);

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Unsigned(value as u64)
    }
}

impl From<isize> for Value {
    fn from(value: isize) -> Self {
        Value::Signed(value as i64)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Unsigned(v) => f.write_str(itoa::Buffer::new().format(*v)),
            Value::Signed(v) => f.write_str(itoa::Buffer::new().format(*v)),
            Value::Float(v) => f.write_str(ryu::Buffer::new().format(*v)),
            Value::Text(v) => f.write_str(v),
        }
    }
}

/// A value converted to the representation it takes on the wire.
#[derive(Debug, PartialEq)]
pub(crate) enum WireValue<'a> {
    Unsigned(u32),
    Signed(i32),
    Text(TextValue<'a>),
}

/// Text carried by a string value packet, either borrowed from the caller or rendered from a number.
#[derive(Debug, PartialEq)]
pub(crate) enum TextValue<'a> {
    Borrowed(&'a str),
    Owned(String),
}

impl TextValue<'_> {
    pub fn as_str(&self) -> &str {
        match self {
            TextValue::Borrowed(s) => s,
            TextValue::Owned(s) => s.as_str(),
        }
    }
}

impl Value {
    /// Converts this value to its wire representation for the given value type.
    ///
    /// # Errors
    ///
    /// If the value does not fit in `value_type`, `Error::ValueOutOfRange` is returned. If the value
    /// cannot be represented by `value_type` at all, such as text for a numeric type, `Error::ValueTypeMismatch` is
    /// returned.
    pub(crate) fn to_wire(&self, value_type: ValueType) -> Result<WireValue<'_>, Error> {
        match value_type {
            ValueType::Uint8 => self.to_unsigned::<u8>(value_type).map(WireValue::Unsigned),
            ValueType::Uint16 => self.to_unsigned::<u16>(value_type).map(WireValue::Unsigned),
            ValueType::Uint32 => self.to_unsigned::<u32>(value_type).map(WireValue::Unsigned),
            ValueType::Int8 => self.to_signed::<i8>(value_type).map(WireValue::Signed),
            ValueType::Int16 => self.to_signed::<i16>(value_type).map(WireValue::Signed),
            ValueType::Int32 => self.to_signed::<i32>(value_type).map(WireValue::Signed),
            ValueType::Float32 => {
                let value = self.to_float(value_type)?;
                let narrowed = value as f32;

                // Too large overflows to infinity, too small underflows to zero.
                let overflows = value.is_finite() && !narrowed.is_finite();
                let underflows = value != 0.0 && narrowed == 0.0;
                if overflows || underflows {
                    return Err(self.out_of_range(value_type));
                }

                let rendered = ryu::Buffer::new().format(narrowed).to_string();
                Ok(WireValue::Text(TextValue::Owned(rendered)))
            }
            ValueType::Float64 => {
                let value = self.to_float(value_type)?;
                let rendered = ryu::Buffer::new().format(value).to_string();
                Ok(WireValue::Text(TextValue::Owned(rendered)))
            }
            ValueType::String => match self {
                Value::Text(s) => Ok(WireValue::Text(TextValue::Borrowed(s.as_str()))),
                other => Ok(WireValue::Text(TextValue::Owned(other.to_string()))),
            },
        }
    }

    fn to_unsigned<T>(&self, value_type: ValueType) -> Result<u32, Error>
    where
        T: TryFrom<u64> + TryFrom<i64> + Into<u32>,
    {
        let narrowed = match self {
            Value::Unsigned(v) => <T as TryFrom<u64>>::try_from(*v).ok(),
            Value::Signed(v) => <T as TryFrom<i64>>::try_from(*v).ok(),
            _ => return Err(self.mismatch(value_type)),
        };

        narrowed.map(Into::into).ok_or_else(|| self.out_of_range(value_type))
    }

    fn to_signed<T>(&self, value_type: ValueType) -> Result<i32, Error>
    where
        T: TryFrom<u64> + TryFrom<i64> + Into<i32>,
    {
        let narrowed = match self {
            Value::Unsigned(v) => <T as TryFrom<u64>>::try_from(*v).ok(),
            Value::Signed(v) => <T as TryFrom<i64>>::try_from(*v).ok(),
            _ => return Err(self.mismatch(value_type)),
        };

        narrowed.map(Into::into).ok_or_else(|| self.out_of_range(value_type))
    }

    fn to_float(&self, value_type: ValueType) -> Result<f64, Error> {
        match self {
            Value::Unsigned(v) => Ok(*v as f64),
            Value::Signed(v) => Ok(*v as f64),
            Value::Float(v) => Ok(*v),
            Value::Text(_) => Err(self.mismatch(value_type)),
        }
    }

    fn out_of_range(&self, value_type: ValueType) -> Error {
        Error::ValueOutOfRange { value: self.to_string(), value_type }
    }

    fn mismatch(&self, value_type: ValueType) -> Error {
        Error::ValueTypeMismatch { value: self.to_string(), value_type }
    }
}
