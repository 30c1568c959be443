//! Telemetry normalization.
//!
//! Converts a raw tracking-backend unit record into a canonical
//! [`VehicleSnapshot`]. The backend speaks in short keys (`nm`, `lmsg`,
//! `pos.y`, ...); the long names are accepted as aliases so hand-written
//! fixtures and dumps from other tools load the same way.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Ordered candidate parameter names per logical metric. The first candidate
/// carrying a non-zero value wins.
pub mod params {
    pub const ENGINE_ON: &[&str] = &["engine_on", "ignition", "ign"];
    pub const FUEL_LEVEL: &[&str] = &["fuel_level", "fuel_lvl"];
    pub const POWER_VOLTAGE: &[&str] = &["pwr_ext", "power"];
    pub const GSM_SIGNAL: &[&str] = &["gsm_signal", "gsm_level"];
    pub const TEMPERATURE: &[&str] = &["pcb_temp", "temperature"];
    pub const ODOMETER: &[&str] = &["mileage", "odometer"];
    pub const ENGINE_HOURS: &[&str] = &["engine_hours", "eh"];
    pub const HARSH_ACCELERATION: &[&str] = &["harsh_acceleration"];
    pub const HARSH_BRAKING: &[&str] = &["harsh_braking"];
    pub const HARSH_CORNERING: &[&str] = &["harsh_cornering"];
    pub const IDLING_TIME: &[&str] = &["idling_time"];
    pub const DRIVER_ID: &[&str] = &["avl_driver"];
}

/// A unit record as returned by the tracking backend.
///
/// Decoding never fails on an object: ill-typed fields are coerced or left
/// unset so one bad field cannot cost a vehicle its report row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RawUnit {
    pub id: i64,
    #[serde(rename = "nm")]
    pub name: Option<String>,
    #[serde(rename = "hw")]
    pub device_type: Option<Value>,
    #[serde(rename = "uid")]
    pub unique_id: Option<String>,
    #[serde(rename = "ph")]
    pub phone: Option<String>,
    #[serde(rename = "sens")]
    pub sensors: Option<Value>,
    #[serde(rename = "lmsg")]
    pub last_message: Option<RawMessage>,

    /// Every other backend field, kept for traceability.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

const UNIT_KEYS: &[&str] = &[
    "id",
    "nm",
    "name",
    "hw",
    "device_type",
    "uid",
    "unique_id",
    "ph",
    "phone",
    "sens",
    "sensors",
    "lmsg",
    "last_message",
];

impl From<Value> for RawUnit {
    fn from(value: Value) -> Self {
        let Value::Object(obj) = value else {
            return RawUnit::default();
        };

        let unit = RawUnit {
            id: obj.get("id").and_then(integer).unwrap_or(0),
            name: field(&obj, &["nm", "name"]).and_then(text),
            device_type: field(&obj, &["hw", "device_type"]).cloned(),
            unique_id: field(&obj, &["uid", "unique_id"]).and_then(text),
            phone: field(&obj, &["ph", "phone"]).and_then(text),
            sensors: field(&obj, &["sens", "sensors"]).cloned(),
            last_message: field(&obj, &["lmsg", "last_message"])
                .filter(|v| v.is_object())
                .cloned()
                .map(RawMessage::from),
            extra: Map::new(),
        };

        RawUnit {
            extra: obj
                .into_iter()
                .filter(|(key, _)| !UNIT_KEYS.contains(&key.as_str()))
                .collect(),
            ..unit
        }
    }
}

/// The most recent position/parameter message of a unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RawMessage {
    #[serde(rename = "t")]
    pub time: Option<Value>,
    #[serde(rename = "pos")]
    pub position: Option<RawPosition>,
    #[serde(rename = "p")]
    pub params: Option<Map<String, Value>>,
}

impl From<Value> for RawMessage {
    fn from(value: Value) -> Self {
        let Value::Object(obj) = value else {
            return RawMessage::default();
        };

        RawMessage {
            time: field(&obj, &["t", "time"]).cloned(),
            position: field(&obj, &["pos", "position"])
                .filter(|v| v.is_object())
                .cloned()
                .map(RawPosition::from),
            params: match field(&obj, &["p", "params"]) {
                Some(Value::Object(p)) => Some(p.clone()),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct RawPosition {
    #[serde(rename = "y")]
    pub lat: Option<f64>,
    #[serde(rename = "x")]
    pub lon: Option<f64>,
    #[serde(rename = "s")]
    pub speed: Option<f64>,
    #[serde(rename = "c")]
    pub course: Option<f64>,
    #[serde(rename = "sc")]
    pub satellites: Option<f64>,
}

impl From<Value> for RawPosition {
    fn from(value: Value) -> Self {
        let Value::Object(obj) = value else {
            return RawPosition::default();
        };

        RawPosition {
            lat: field(&obj, &["y", "lat"]).and_then(numeric),
            lon: field(&obj, &["x", "lon"]).and_then(numeric),
            speed: field(&obj, &["s", "speed"]).and_then(numeric),
            course: field(&obj, &["c", "course"]).and_then(numeric),
            satellites: field(&obj, &["sc", "satellites"]).and_then(numeric),
        }
    }
}

/// First non-null value among `keys`.
fn field<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|v| !v.is_null())
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Last-known position of a vehicle. Zeroes when nothing was reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
    pub speed: f64,
    pub course: f64,
    pub satellite_count: u32,
}

/// Last-known parameter set. `None` means no candidate key was reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryParams {
    pub engine_on: bool,
    pub fuel_level: Option<f64>,
    pub power_voltage: Option<f64>,
    pub gsm_signal: Option<f64>,
    pub temperature: Option<f64>,
    pub odometer: Option<f64>,
    pub engine_hours: Option<f64>,
    pub harsh_acceleration: Option<f64>,
    pub harsh_braking: Option<f64>,
    pub harsh_cornering: Option<f64>,
    pub idling_time: Option<f64>,
    pub driver_id: String,
    pub parameter_count: usize,
}

impl Default for TelemetryParams {
    fn default() -> Self {
        Self {
            engine_on: false,
            fuel_level: None,
            power_voltage: None,
            gsm_signal: None,
            temperature: None,
            odometer: None,
            engine_hours: None,
            harsh_acceleration: None,
            harsh_braking: None,
            harsh_cornering: None,
            idling_time: None,
            driver_id: "0".to_string(),
            parameter_count: 0,
        }
    }
}

/// Canonical per-vehicle snapshot for one reporting cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleSnapshot {
    pub id: i64,
    pub name: String,
    pub device_type: String,
    pub unique_id: String,
    pub phone: String,
    pub last_message_time: Option<DateTime<Utc>>,
    pub position: Position,
    pub telemetry: TelemetryParams,
    #[serde(skip)]
    pub raw: RawUnit,
}

impl VehicleSnapshot {
    pub fn has_telemetry(&self) -> bool {
        self.last_message_time.is_some()
    }
}

/// Parses a backend item list. Every object becomes a unit, however
/// degraded; entries that are not objects at all are skipped.
pub fn parse_units(items: Vec<Value>) -> Vec<RawUnit> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| {
            if item.is_object() {
                Some(RawUnit::from(item))
            } else {
                warn!(index, item = %item, "Skipping non-object unit record");
                None
            }
        })
        .collect()
}

/// Normalizes one raw unit into a [`VehicleSnapshot`].
///
/// A missing last message, or one whose timestamp cannot be read, yields a
/// snapshot with no time, a zeroed position and default parameters.
pub fn normalize(raw: RawUnit) -> VehicleSnapshot {
    let name = raw.name.clone().unwrap_or_else(|| "Unknown".to_string());

    let message = raw.last_message.as_ref().and_then(|msg| {
        match msg.time.as_ref().and_then(parse_message_time) {
            Some(time) => Some((time, msg)),
            None => {
                warn!(
                    vehicle = %name,
                    time = ?msg.time,
                    "Unreadable last-message timestamp, treating as no telemetry"
                );
                None
            }
        }
    });

    let (last_message_time, position, telemetry) = match message {
        Some((time, msg)) => (
            Some(time),
            msg.position.as_ref().map(normalize_position).unwrap_or_default(),
            msg.params.as_ref().map(normalize_params).unwrap_or_default(),
        ),
        None => {
            debug!(vehicle = %name, "No last message for vehicle");
            (None, Position::default(), TelemetryParams::default())
        }
    };

    VehicleSnapshot {
        id: raw.id,
        name,
        device_type: raw
            .device_type
            .as_ref()
            .map(value_to_string)
            .unwrap_or_else(|| "Unknown".to_string()),
        unique_id: raw.unique_id.clone().unwrap_or_default(),
        phone: raw.phone.clone().unwrap_or_default(),
        last_message_time,
        position,
        telemetry,
        raw,
    }
}

/// Reads a message timestamp: unix seconds as a number or numeric string, or
/// an RFC 3339 string. Non-positive epochs count as unset.
pub fn parse_message_time(value: &Value) -> Option<DateTime<Utc>> {
    let epoch = match (value, integer(value)) {
        (_, Some(secs)) => secs,
        (Value::String(s), None) => {
            return DateTime::parse_from_rfc3339(s.trim())
                .ok()
                .map(|dt| dt.with_timezone(&Utc));
        }
        _ => return None,
    };

    if epoch <= 0 {
        return None;
    }
    DateTime::from_timestamp(epoch, 0)
}

fn normalize_position(pos: &RawPosition) -> Position {
    Position {
        latitude: pos.lat.unwrap_or(0.0),
        longitude: pos.lon.unwrap_or(0.0),
        speed: pos.speed.unwrap_or(0.0),
        course: pos.course.unwrap_or(0.0),
        satellite_count: pos.satellites.map(|s| s.max(0.0) as u32).unwrap_or(0),
    }
}

fn normalize_params(p: &Map<String, Value>) -> TelemetryParams {
    TelemetryParams {
        engine_on: lookup(p, params::ENGINE_ON).is_some_and(|v| v != 0.0),
        fuel_level: lookup(p, params::FUEL_LEVEL),
        power_voltage: lookup(p, params::POWER_VOLTAGE),
        gsm_signal: lookup(p, params::GSM_SIGNAL),
        temperature: lookup(p, params::TEMPERATURE),
        odometer: lookup(p, params::ODOMETER),
        engine_hours: lookup(p, params::ENGINE_HOURS),
        harsh_acceleration: lookup(p, params::HARSH_ACCELERATION),
        harsh_braking: lookup(p, params::HARSH_BRAKING),
        harsh_cornering: lookup(p, params::HARSH_CORNERING),
        idling_time: lookup(p, params::IDLING_TIME),
        driver_id: params::DRIVER_ID
            .iter()
            .find_map(|key| p.get(*key).map(value_to_string))
            .unwrap_or_else(|| "0".to_string()),
        parameter_count: p.len(),
    }
}

/// Resolves a logical metric from its candidate keys.
///
/// Returns the first non-zero candidate value. If candidates are present but
/// all zero, returns `Some(0.0)`; if none is present, `None`.
pub fn lookup(p: &Map<String, Value>, candidates: &[&str]) -> Option<f64> {
    let mut seen_zero = false;
    for key in candidates {
        match p.get(*key).and_then(numeric) {
            Some(v) if v != 0.0 => return Some(v),
            Some(_) => seen_zero = true,
            None => {}
        }
    }
    seen_zero.then_some(0.0)
}

fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn unit(value: Value) -> RawUnit {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_normalize_backend_short_keys() {
        let raw = unit(json!({
            "id": 42,
            "nm": "TRK-001",
            "hw": 7,
            "uid": "86000001",
            "ph": "+66123",
            "lmsg": {
                "t": 1_760_000_000,
                "pos": {"y": 13.75, "x": 100.5, "s": 64, "c": 90, "sc": 11},
                "p": {
                    "ign": 1,
                    "fuel_lvl": 40.5,
                    "pwr_ext": 12.6,
                    "mileage": 1200,
                    "avl_driver": "D-7"
                }
            }
        }));

        let snap = normalize(raw);

        assert_eq!(snap.id, 42);
        assert_eq!(snap.name, "TRK-001");
        assert_eq!(snap.device_type, "7");
        assert_eq!(snap.unique_id, "86000001");
        assert_eq!(snap.last_message_time, DateTime::from_timestamp(1_760_000_000, 0));
        assert_eq!(snap.position.latitude, 13.75);
        assert_eq!(snap.position.speed, 64.0);
        assert_eq!(snap.position.satellite_count, 11);
        assert!(snap.telemetry.engine_on);
        assert_eq!(snap.telemetry.fuel_level, Some(40.5));
        assert_eq!(snap.telemetry.power_voltage, Some(12.6));
        assert_eq!(snap.telemetry.odometer, Some(1200.0));
        assert_eq!(snap.telemetry.driver_id, "D-7");
        assert_eq!(snap.telemetry.parameter_count, 5);
        assert!(snap.has_telemetry());
    }

    #[test]
    fn test_normalize_long_names() {
        let raw = unit(json!({
            "id": 3,
            "name": "TRK-003",
            "device_type": "Teltonika FMB920",
            "last_message": {
                "time": "2026-10-17T08:00:00Z",
                "position": {"lat": 1.0, "lon": 2.0, "speed": 30.0},
                "params": {"fuel_level": 0, "fuel_lvl": 55}
            }
        }));

        let snap = normalize(raw);

        assert_eq!(snap.name, "TRK-003");
        assert_eq!(snap.device_type, "Teltonika FMB920");
        assert!(snap.last_message_time.is_some());
        assert_eq!(snap.position.longitude, 2.0);
        assert_eq!(snap.telemetry.fuel_level, Some(55.0));
    }

    #[test]
    fn test_missing_last_message_defaults() {
        let snap = normalize(unit(json!({"id": 1, "nm": "TRK-001"})));

        assert!(!snap.has_telemetry());
        assert_eq!(snap.position, Position::default());
        assert_eq!(snap.telemetry, TelemetryParams::default());
        assert_eq!(snap.device_type, "Unknown");
    }

    #[test]
    fn test_malformed_timestamp_drops_message() {
        let snap = normalize(unit(json!({
            "id": 1,
            "nm": "TRK-009",
            "lmsg": {"t": "yesterday-ish", "pos": {"y": 5.0}, "p": {"fuel_level": 80}}
        })));

        assert!(snap.last_message_time.is_none());
        assert_eq!(snap.position.latitude, 0.0);
        assert_eq!(snap.telemetry.fuel_level, None);
    }

    #[test]
    fn test_zero_epoch_is_unset() {
        assert!(parse_message_time(&json!(0)).is_none());
        assert!(parse_message_time(&json!(-5)).is_none());
        assert!(parse_message_time(&json!("1700000000")).is_some());
        assert!(parse_message_time(&json!(null)).is_none());
    }

    #[test]
    fn test_lookup_precedence() {
        let p: Map<String, Value> = serde_json::from_value(json!({
            "gsm_signal": 0, "gsm_level": 4, "pcb_temp": 0
        }))
        .unwrap();

        assert_eq!(lookup(&p, params::GSM_SIGNAL), Some(4.0));
        assert_eq!(lookup(&p, params::TEMPERATURE), Some(0.0));
        assert_eq!(lookup(&p, params::ODOMETER), None);
    }

    #[test]
    fn test_engine_on_accepts_bool_and_strings() {
        let p: Map<String, Value> =
            serde_json::from_value(json!({"engine_on": false, "ignition": "1"})).unwrap();
        assert!(normalize_params(&p).engine_on);

        let p: Map<String, Value> = serde_json::from_value(json!({"ign": 0})).unwrap();
        assert!(!normalize_params(&p).engine_on);
    }

    #[test]
    fn test_parse_units_skips_non_objects() {
        let units = parse_units(vec![
            json!({"id": 1, "nm": "A"}),
            json!("not a unit"),
            json!({"id": 2, "nm": "B"}),
        ]);

        assert_eq!(units.len(), 2);
        assert_eq!(units[1].name.as_deref(), Some("B"));
    }

    #[test]
    fn test_ill_typed_fields_degrade_instead_of_dropping() {
        let units = parse_units(vec![
            json!({
                "id": 1,
                "nm": "A",
                "lmsg": {"t": 1_760_000_000, "pos": {"y": 1.0, "s": "72"}}
            }),
            json!({"id": 2, "nm": "B", "uid": 352093081234567_i64}),
            json!({"id": 3, "nm": "C", "ph": 66810000001_i64}),
            json!({"id": 4, "nm": "D", "lmsg": {"t": 1_760_000_000, "p": []}}),
            json!({"id": null, "nm": "E"}),
            json!({"id": 6, "nm": "F", "name": "F-long"}),
        ]);
        assert_eq!(units.len(), 6);

        let snaps: Vec<_> = units.into_iter().map(normalize).collect();
        let names: Vec<_> = snaps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["A", "B", "C", "D", "E", "F"]);

        assert_eq!(snaps[0].position.speed, 72.0);
        assert_eq!(snaps[0].position.latitude, 1.0);
        assert_eq!(snaps[1].unique_id, "352093081234567");
        assert_eq!(snaps[2].phone, "66810000001");
        assert!(snaps[3].has_telemetry());
        assert_eq!(snaps[3].telemetry, TelemetryParams::default());
        assert_eq!(snaps[4].id, 0);
    }

    #[test]
    fn test_non_object_message_parts_are_ignored() {
        let snap = normalize(unit(json!({
            "id": "17",
            "nm": "TRK-017",
            "lmsg": {"t": "1760000000", "pos": "n/a", "p": {"fuel_lvl": "33.5"}}
        })));

        assert_eq!(snap.id, 17);
        assert!(snap.has_telemetry());
        assert_eq!(snap.position, Position::default());
        assert_eq!(snap.telemetry.fuel_level, Some(33.5));
    }

    #[test]
    fn test_raw_unit_serializes_short_keys() {
        let raw = unit(json!({"id": 9, "name": "TRK-009", "cls": 2}));
        let back = serde_json::to_value(&raw).unwrap();

        assert_eq!(back["nm"], json!("TRK-009"));
        assert_eq!(back["cls"], json!(2));
        assert_eq!(unit(back), raw);
    }

    #[test]
    fn test_unknown_fields_are_retained() {
        let snap = normalize(unit(json!({"id": 1, "nm": "A", "cls": 2, "mu": 3})));
        assert_eq!(snap.raw.extra.get("cls"), Some(&json!(2)));
    }
}
