use serde_json::{Map, Value};

pub fn required_str<'a>(args: &'a Map<String, Value>, name: &str) -> Result<&'a str, String> {
    args.get(name)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing or invalid argument: {name}"))
}

pub fn optional_str<'a>(args: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    args.get(name).and_then(|v| v.as_str())
}

pub fn strict_date(value: &str, field: &str) -> Result<(), String> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| format!("{field} must be in YYYY-MM-DD format"))
}

pub fn strict_time(value: &str, field: &str) -> Result<(), String> {
    chrono::NaiveTime::parse_from_str(value, "%H:%M")
        .map(|_| ())
        .map_err(|_| format!("{field} must be in HH:MM format"))
}
