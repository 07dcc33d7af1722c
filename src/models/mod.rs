mod device;
mod rack;

pub use device::{
    device_status, CreateDeviceRequest, Device, DeviceKind, PowerConnection, UpdateDeviceRequest,
};
pub use rack::{CreateRackRequest, Rack, UpdateRackRequest, DEFAULT_RACK_HEIGHT};

use serde::{Deserialize, Deserializer};

/// Lenient integer parsing for fields arriving from hand-edited report data.
/// Accepts integers, integral floats, and numeric strings; anything else
/// (including null) becomes None instead of failing the whole payload.
pub(crate) fn lenient_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_int))
}

fn coerce_int(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::coerce_int;
    use serde_json::json;

    #[test]
    fn test_coerce_int() {
        assert_eq!(coerce_int(&json!(42)), Some(42));
        assert_eq!(coerce_int(&json!(42.0)), Some(42));
        assert_eq!(coerce_int(&json!("17")), Some(17));
        assert_eq!(coerce_int(&json!(" 17 ")), Some(17));
        assert_eq!(coerce_int(&json!(2.5)), None);
        assert_eq!(coerce_int(&json!("top")), None);
        assert_eq!(coerce_int(&json!(true)), None);
        assert_eq!(coerce_int(&json!(null)), None);
    }
}
