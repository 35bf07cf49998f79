use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    error::Error,
    metric::{packet_id, Defaults, Metric, Resolved},
    value::{Value, WireValue},
};

const EXTRA_GROUP: &str = "GROUP";
const EXTRA_SPOOF_HOST: &str = "SPOOF_HOST";
const EXTRA_DESC: &str = "DESC";
const EXTRA_TITLE: &str = "TITLE";

/// Writes gmond 3.1 packets using XDR encoding.
///
/// Every integer occupies a single 4-byte big-endian unit, and strings are written as a 4-byte length followed by the
/// string bytes, zero-padded to the next multiple of four.
pub(crate) struct PacketWriter {
    buf: BytesMut,
}

impl PacketWriter {
    pub fn new() -> Self {
        Self { buf: BytesMut::with_capacity(256) }
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32(value);
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buf.put_i32(value);
    }

    pub fn write_bool(&mut self, value: bool) {
        self.write_u32(u32::from(value));
    }

    pub fn write_string(&mut self, value: &str) -> Result<(), Error> {
        let bytes = value.as_bytes();

        self.write_u32(xdr_len(bytes.len())?);
        self.buf.put_slice(bytes);

        let padding = (4 - bytes.len() % 4) % 4;
        self.buf.put_bytes(0, padding);
        Ok(())
    }

    /// Writes the metric identifier that leads every packet: origin, metric name, and whether the origin is spoofed.
    fn write_metric_id(&mut self, metric: &Metric, resolved: &Resolved<'_>) -> Result<(), Error> {
        self.write_string(resolved.origin())?;
        self.write_string(&metric.name)?;
        self.write_bool(resolved.is_spoofed());
        Ok(())
    }

    pub fn finish(self) -> Bytes {
        self.buf.freeze()
    }
}

/// Builds the extra metadata elements for a metric, in wire order.
///
/// Groups are listed last-to-first, followed by the spoof host, description and title. Unset fields are omitted.
fn extra_elements<'a>(metric: &'a Metric, resolved: &Resolved<'a>) -> Vec<(&'static str, &'a str)> {
    let mut elements = Vec::with_capacity(metric.groups.len() + 3);
    elements.extend(metric.groups.iter().rev().map(|group| (EXTRA_GROUP, group.as_str())));

    if resolved.is_spoofed() {
        elements.push((EXTRA_SPOOF_HOST, resolved.spoof));
    }
    if !metric.description.is_empty() {
        elements.push((EXTRA_DESC, metric.description.as_str()));
    }
    if !metric.title.is_empty() {
        elements.push((EXTRA_TITLE, metric.title.as_str()));
    }

    elements
}

/// Converts a length to the 32-bit form XDR carries it in.
fn xdr_len(len: usize) -> Result<u32, Error> {
    u32::try_from(len).map_err(|_| Error::StringTooLong { len })
}

fn whole_seconds(duration: std::time::Duration) -> u32 {
    u32::try_from(duration.as_secs()).unwrap_or(u32::MAX)
}

/// Encodes the metadata packet announcing `metric`.
///
/// # Errors
///
/// If the metric has no name or no value type, or any of its strings is too long for a packet, an error is returned
/// and nothing is encoded.
pub(crate) fn encode_metadata(metric: &Metric, defaults: &Defaults) -> Result<Bytes, Error> {
    let value_type = metric.validate()?;
    let resolved = metric.resolve(defaults);

    let mut writer = PacketWriter::new();
    writer.write_u32(packet_id::METADATA_FULL);
    writer.write_metric_id(metric, &resolved)?;
    writer.write_string(value_type.as_str())?;
    writer.write_string(&metric.name)?;
    writer.write_string(&metric.units)?;
    writer.write_u32(metric.slope.wire_value());
    writer.write_u32(whole_seconds(resolved.tick_interval));
    writer.write_u32(whole_seconds(resolved.lifetime));

    let extras = extra_elements(metric, &resolved);
    writer.write_u32(xdr_len(extras.len())?);
    for (name, value) in extras {
        writer.write_string(name)?;
        writer.write_string(value)?;
    }

    Ok(writer.finish())
}

/// Encodes a value packet carrying `value` for `metric`.
///
/// # Errors
///
/// If the metric has no name or no value type, if the value cannot be represented by the metric's value type, or if a
/// string is too long for a packet, an error is returned and nothing is encoded.
pub(crate) fn encode_value(metric: &Metric, defaults: &Defaults, value: &Value) -> Result<Bytes, Error> {
    let value_type = metric.validate()?;
    let wire_value = value.to_wire(value_type)?;
    let resolved = metric.resolve(defaults);

    let mut writer = PacketWriter::new();
    writer.write_u32(value_type.packet_id());
    writer.write_metric_id(metric, &resolved)?;
    writer.write_string(value_type.format())?;
    match wire_value {
        WireValue::Unsigned(v) => writer.write_u32(v),
        WireValue::Signed(v) => writer.write_i32(v),
        WireValue::Text(text) => writer.write_string(text.as_str())?,
    }

    Ok(writer.finish())
}
