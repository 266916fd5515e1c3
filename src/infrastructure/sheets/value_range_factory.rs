use google_sheets4::api::ValueRange;
use serde_json::Value;

pub trait ValueRangeFactory {
    fn from_single_cell<T: AsRef<str>>(s: T) -> Self;
}

impl ValueRangeFactory for ValueRange {
    fn from_single_cell<T: AsRef<str>>(s: T) -> Self {
        ValueRange {
            major_dimension: None,
            range: None,
            values: Some(vec![vec![Value::String(s.as_ref().to_owned())]]),
        }
    }
}
