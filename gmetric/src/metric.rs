use std::{fmt, time::Duration};

use crate::error::Error;

/// XDR packet identifiers from the gmond 3.1 protocol.
pub(crate) mod packet_id {
    pub const METADATA_FULL: u32 = 128;
    pub const USHORT: u32 = 129;
    pub const SHORT: u32 = 130;
    pub const INT: u32 = 131;
    pub const UINT: u32 = 132;
    pub const STRING: u32 = 133;
}

/// The type of value a metric reports.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ValueType {
    /// Unsigned 8-bit integer.
    Uint8,

    /// Signed 8-bit integer.
    Int8,

    /// Unsigned 16-bit integer.
    Uint16,

    /// Signed 16-bit integer.
    Int16,

    /// Unsigned 32-bit integer.
    Uint32,

    /// Signed 32-bit integer.
    Int32,

    /// Single-precision floating point.
    Float32,

    /// Double-precision floating point.
    Float64,

    /// Free-form text.
    String,
}

impl ValueType {
    /// Returns the type tag gmond uses for this value type.
    pub const fn as_str(self) -> &'static str {
        match self {
            ValueType::Uint8 => "uint8",
            ValueType::Int8 => "int8",
            ValueType::Uint16 => "uint16",
            ValueType::Int16 => "int16",
            ValueType::Uint32 => "uint32",
            ValueType::Int32 => "int32",
            ValueType::Float32 => "float",
            ValueType::Float64 => "double",
            ValueType::String => "string",
        }
    }

    /// Returns the `printf`-style format string sent alongside values of this type.
    pub(crate) const fn format(self) -> &'static str {
        match self {
            ValueType::Uint8 => "%hhu",
            ValueType::Int8 => "%hhd",
            ValueType::Uint16 => "%hu",
            ValueType::Int16 => "%hd",
            ValueType::Uint32 => "%u",
            ValueType::Int32 => "%d",
            ValueType::Float32 | ValueType::Float64 => "%f",
            ValueType::String => "%s",
        }
    }

    /// Returns the identifier of the value packet that carries this type.
    ///
    /// Floating point values travel as text, since that is how gmond reports them back.
    pub(crate) const fn packet_id(self) -> u32 {
        match self {
            ValueType::Uint8 | ValueType::Uint16 => packet_id::USHORT,
            ValueType::Int8 | ValueType::Int16 => packet_id::SHORT,
            ValueType::Uint32 => packet_id::UINT,
            ValueType::Int32 => packet_id::INT,
            ValueType::Float32 | ValueType::Float64 | ValueType::String => packet_id::STRING,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Expected trend of a metric's value over time.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum Slope {
    /// The value never changes.
    Zero,

    /// The value only increases.
    Positive,

    /// The value only decreases.
    Negative,

    /// The value can increase and decrease.
    #[default]
    Both,

    /// No expectation is declared.
    Unspecified,
}

impl Slope {
    /// Returns the tag gmond reports for this slope.
    pub const fn as_str(self) -> &'static str {
        match self {
            Slope::Zero => "zero",
            Slope::Positive => "positive",
            Slope::Negative => "negative",
            Slope::Both => "both",
            Slope::Unspecified => "unspecified",
        }
    }

    /// Returns the XDR enum ordinal of this slope.
    pub(crate) const fn wire_value(self) -> u32 {
        match self {
            Slope::Zero => 0,
            Slope::Positive => 1,
            Slope::Negative => 2,
            Slope::Both => 3,
            Slope::Unspecified => 4,
        }
    }
}

impl fmt::Display for Slope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Process-wide defaults applied to any metric field left unset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Defaults {
    /// Origin host reported to gmond.
    pub host: String,

    /// Spoofed origin, in `ip:hostname` form.
    pub spoof: String,

    /// Expected reporting period.
    pub tick_interval: Duration,

    /// How long gmond keeps the metric after its last update.
    pub lifetime: Duration,
}

/// A single reportable measurement.
///
/// Empty strings and zero durations mean "unset": `host`, `spoof`, `tick_interval` and `lifetime` then fall back to
/// the [`Defaults`] of the client the metric is written through.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Metric {
    /// Unique metric identifier. Required.
    pub name: String,

    /// Human-readable title.
    pub title: String,

    /// Human-readable description.
    pub description: String,

    /// Origin host reported to gmond.
    pub host: String,

    /// Spoofed origin, in `ip:hostname` form.
    pub spoof: String,

    /// Groups the metric belongs to.
    pub groups: Vec<String>,

    /// Type of the metric's values. Required.
    pub value_type: Option<ValueType>,

    /// Unit label.
    pub units: String,

    /// Expected trend of the value.
    pub slope: Slope,

    /// Expected reporting period.
    pub tick_interval: Duration,

    /// How long gmond keeps the metric after its last update.
    pub lifetime: Duration,
}

impl Metric {
    /// Creates a new `Metric` with the given name and value type, leaving every other field unset.
    pub fn new<N: Into<String>>(name: N, value_type: ValueType) -> Self {
        Metric { name: name.into(), value_type: Some(value_type), ..Default::default() }
    }

    /// Sets the title.
    #[must_use]
    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the origin host.
    #[must_use]
    pub fn with_host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = host.into();
        self
    }

    /// Sets the spoofed origin, in `ip:hostname` form.
    #[must_use]
    pub fn with_spoof<S: Into<String>>(mut self, spoof: S) -> Self {
        self.spoof = spoof.into();
        self
    }

    /// Adds the metric to a group.
    #[must_use]
    pub fn with_group<S: Into<String>>(mut self, group: S) -> Self {
        self.groups.push(group.into());
        self
    }

    /// Sets the unit label.
    #[must_use]
    pub fn with_units<S: Into<String>>(mut self, units: S) -> Self {
        self.units = units.into();
        self
    }

    /// Sets the slope.
    #[must_use]
    pub fn with_slope(mut self, slope: Slope) -> Self {
        self.slope = slope;
        self
    }

    /// Sets the expected reporting period.
    #[must_use]
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    /// Sets how long gmond keeps the metric after its last update.
    #[must_use]
    pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Checks that the metric can be encoded, returning its value type.
    pub(crate) fn validate(&self) -> Result<ValueType, Error> {
        if self.name.is_empty() {
            return Err(Error::NoName);
        }

        self.value_type.ok_or(Error::NoValueType)
    }

    /// Resolves the defaultable fields of the metric against the given defaults.
    pub(crate) fn resolve<'a>(&'a self, defaults: &'a Defaults) -> Resolved<'a> {
        Resolved {
            host: resolve(self.host.as_str(), defaults.host.as_str(), ""),
            spoof: resolve(self.spoof.as_str(), defaults.spoof.as_str(), ""),
            tick_interval: *resolve(&self.tick_interval, &defaults.tick_interval, &Duration::ZERO),
            lifetime: *resolve(&self.lifetime, &defaults.lifetime, &Duration::ZERO),
        }
    }
}

/// The defaultable fields of a metric after applying client defaults.
#[derive(Debug, PartialEq)]
pub(crate) struct Resolved<'a> {
    pub host: &'a str,
    pub spoof: &'a str,
    pub tick_interval: Duration,
    pub lifetime: Duration,
}

impl Resolved<'_> {
    /// Returns the origin identity written into packet headers: the spoof identity if set, otherwise the host.
    pub fn origin(&self) -> &str {
        if self.spoof.is_empty() {
            self.host
        } else {
            self.spoof
        }
    }

    pub fn is_spoofed(&self) -> bool {
        !self.spoof.is_empty()
    }
}

/// Picks `own` unless it equals the protocol zero-value, in which case `fallback` is used.
///
/// A `fallback` that is itself unset leaves the zero-value in place.
pub(crate) fn resolve<'a, T>(own: &'a T, fallback: &'a T, zero: &T) -> &'a T
where
    T: PartialEq + ?Sized,
{
    if own == zero {
        fallback
    } else {
        own
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{resolve, Defaults, Metric, ValueType};
    use crate::error::Error;

    fn defaults() -> Defaults {
        Defaults {
            host: "client-host".to_string(),
            spoof: "10.0.0.1:client-spoof".to_string(),
            tick_interval: Duration::from_secs(60),
            lifetime: Duration::from_secs(3600),
        }
    }

    #[test]
    fn resolve_prefers_own_value() {
        assert_eq!(resolve("a", "b", ""), "a");
        assert_eq!(resolve("", "b", ""), "b");
        assert_eq!(resolve("", "", ""), "");
        assert_eq!(*resolve(&Duration::ZERO, &Duration::from_secs(5), &Duration::ZERO), Duration::from_secs(5));
        assert_eq!(*resolve(&Duration::from_secs(1), &Duration::from_secs(5), &Duration::ZERO), Duration::from_secs(1));
    }

    #[test]
    fn unset_fields_fall_back_to_client() {
        let defaults = defaults();
        let metric = Metric::new("m", ValueType::Uint32);
        let resolved = metric.resolve(&defaults);

        assert_eq!(resolved.host, "client-host");
        assert_eq!(resolved.spoof, "10.0.0.1:client-spoof");
        assert_eq!(resolved.tick_interval, Duration::from_secs(60));
        assert_eq!(resolved.lifetime, Duration::from_secs(3600));
        assert_eq!(resolved.origin(), "10.0.0.1:client-spoof");
        assert!(resolved.is_spoofed());
    }

    #[test]
    fn set_fields_override_client() {
        let defaults = defaults();
        let metric = Metric::new("m", ValueType::Uint32)
            .with_host("metric-host")
            .with_spoof("10.0.0.2:metric-spoof")
            .with_tick_interval(Duration::from_secs(20))
            .with_lifetime(Duration::from_secs(86400));
        let resolved = metric.resolve(&defaults);

        assert_eq!(resolved.host, "metric-host");
        assert_eq!(resolved.spoof, "10.0.0.2:metric-spoof");
        assert_eq!(resolved.tick_interval, Duration::from_secs(20));
        assert_eq!(resolved.lifetime, Duration::from_secs(86400));
    }

    #[test]
    fn unset_everywhere_is_zero() {
        let defaults = Defaults::default();
        let metric = Metric::new("m", ValueType::Uint32).with_host("h");
        let resolved = metric.resolve(&defaults);

        assert_eq!(resolved.spoof, "");
        assert_eq!(resolved.origin(), "h");
        assert!(!resolved.is_spoofed());
        assert_eq!(resolved.tick_interval, Duration::ZERO);
        assert_eq!(resolved.lifetime, Duration::ZERO);
    }

    #[test]
    fn validate() {
        assert!(matches!(Metric::default().validate(), Err(Error::NoName)));
        assert!(matches!(
            Metric { value_type: Some(ValueType::String), ..Default::default() }.validate(),
            Err(Error::NoName)
        ));
        assert!(matches!(
            Metric { name: "no_value_type_metric".into(), ..Default::default() }.validate(),
            Err(Error::NoValueType)
        ));
        assert_eq!(Metric::new("m", ValueType::Int16).validate().ok(), Some(ValueType::Int16));
    }
}
