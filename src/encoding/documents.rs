//! Per-topic document renderers.
//!
//! Each renderer queries the provider once and writes the fixed document
//! for its topic. The fragment boundaries below are the HTTP chunk
//! boundaries.

use super::{JsonWriter, fixed2, float_triplet, int_triplet};
use crate::domain::TelemetryProvider;

/// Renders a topic document from a fresh provider query.
pub type Render = fn(&dyn TelemetryProvider, &mut JsonWriter<'_>);

/// Issues a command against the provider.
pub type Command = fn(&dyn TelemetryProvider);

/// `{"data": {accel_raw: [ i,i,i ],gyro_raw: [ i,i,i ],mag_raw: [ i,i,i ]}}`
pub fn raw(provider: &dyn TelemetryProvider, out: &mut JsonWriter<'_>) {
    let raw = provider.raw_and_data().raw;

    out.chunk("{\"data\": {");
    out.chunk(format!(
        "{}: [ {} ],",
        out.loose_key("accel_raw"),
        int_triplet(raw.accel)
    ));
    out.chunk(format!(
        "{}: [ {} ],",
        out.loose_key("gyro_raw"),
        int_triplet(raw.gyro)
    ));
    out.chunk(format!(
        "{}: [ {} ]",
        out.loose_key("mag_raw"),
        int_triplet(raw.mag)
    ));
    out.chunk("}}");
}

/// `{"data": {accel: [f, f, f],gyro: [f, f, f],mag: [f, f, f]}}`
pub fn real(provider: &dyn TelemetryProvider, out: &mut JsonWriter<'_>) {
    let data = provider.raw_and_data().data;

    out.chunk("{\"data\": {");
    out.chunk(format!(
        "{}: [{}],",
        out.loose_key("accel"),
        float_triplet(data.accel)
    ));
    out.chunk(format!(
        "{}: [{}],",
        out.loose_key("gyro"),
        float_triplet(data.gyro)
    ));
    out.chunk(format!(
        "{}: [{}]",
        out.loose_key("mag"),
        float_triplet(data.mag)
    ));
    out.chunk("}}");
}

/// Roll/pitch/yaw followed by every scaled axis, all keys quoted.
pub fn orientation(provider: &dyn TelemetryProvider, out: &mut JsonWriter<'_>) {
    let data = provider.raw_and_data().data;
    let [roll, pitch, yaw] = data.orientation;
    let [ax, ay, az] = data.accel;
    let [gx, gy, gz] = data.gyro;
    let [mx, my, mz] = data.mag;

    out.chunk("{\"data\": {");
    out.chunk(format!("\"roll\": {}, ", fixed2(roll)));
    out.chunk(format!("\"pitch\": {}, ", fixed2(pitch)));
    out.chunk(format!("\"yaw\": {},", fixed2(yaw)));
    for (key, value) in [
        ("ax", ax),
        ("ay", ay),
        ("az", az),
        ("gx", gx),
        ("gy", gy),
        ("gz", gz),
        ("mx", mx),
        ("my", my),
    ] {
        out.chunk(format!("\"{key}\": {},", fixed2(value)));
    }
    out.chunk(format!("\"mz\": {}", fixed2(mz)));
    out.chunk("}}");
}

/// `{"raw": {...},"cal": {...},"mag_bias": {...},"mode": i}`
pub fn mag_data(provider: &dyn TelemetryProvider, out: &mut JsonWriter<'_>) {
    let cal = provider.mag_calibration();

    out.chunk("{");
    for (name, axes) in [
        ("raw", cal.raw),
        ("cal", cal.calibrated),
        ("mag_bias", cal.bias),
    ] {
        let [x, y, z] = axes;
        out.chunk(format!("\"{name}\": {{"));
        out.chunk(format!("\"mx\": {x},"));
        out.chunk(format!("\"my\": {y},"));
        out.chunk(format!("\"mz\": {z}"));
        out.chunk("},");
    }
    out.chunk(format!("\"mode\": {}", cal.mode));
    out.chunk("}");
}

/// `{"data": {roll: f, pitch: f, yaw: f, gyro: [f, f, f]}}`
pub fn debug(provider: &dyn TelemetryProvider, out: &mut JsonWriter<'_>) {
    let data = provider.raw_and_data().data;
    let [roll, pitch, yaw] = data.orientation;

    out.chunk("{\"data\": {");
    out.chunk(format!("{}: {}, ", out.loose_key("roll"), fixed2(roll)));
    out.chunk(format!("{}: {}, ", out.loose_key("pitch"), fixed2(pitch)));
    out.chunk(format!("{}: {}, ", out.loose_key("yaw"), fixed2(yaw)));
    out.chunk(format!(
        "{}: [{}]",
        out.loose_key("gyro"),
        float_triplet(data.gyro)
    ));
    out.chunk("}}");
}

/// Runs the magnetometer calibration routine.
pub fn mag_calibrate(provider: &dyn TelemetryProvider) {
    provider.do_mag_calibration();
}
