use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use std::{collections::BTreeMap, fmt};

use crate::error::{Error, Result};

/// Format of the `date` field on response records.
pub const RECORD_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Daily attributes keyed by record date, ordered by date.
pub type Dataset = BTreeMap<NaiveDateTime, Value>;

/// Weather attributes that may be requested explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    MinTemperature,
    MaxTemperature,
    Precip,
    AccPrecip,
    AccPrecipPriorYear,
    AccPrecip3YearAverage,
    AccPrecipLongTermAverage,
    Solar,
    MinHumidity,
    MaxHumidity,
    MornWind,
    MaxWind,
    Gdd,
    AccGdd,
    AccGddPriorYear,
    AccGdd3YearAverage,
    AccGddLongTermAverage,
    Pet,
    AccPet,
    Ppet,
}

impl Attribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::MinTemperature => "minTemperature",
            Attribute::MaxTemperature => "maxTemperature",
            Attribute::Precip => "precip",
            Attribute::AccPrecip => "accPrecip",
            Attribute::AccPrecipPriorYear => "accPrecipPriorYear",
            Attribute::AccPrecip3YearAverage => "accPrecip3YearAverage",
            Attribute::AccPrecipLongTermAverage => "accPrecipLongTermAverage",
            Attribute::Solar => "solar",
            Attribute::MinHumidity => "minHumidity",
            Attribute::MaxHumidity => "maxHumidity",
            Attribute::MornWind => "mornWind",
            Attribute::MaxWind => "maxWind",
            Attribute::Gdd => "gdd",
            Attribute::AccGdd => "accGdd",
            Attribute::AccGddPriorYear => "accGddPriorYear",
            Attribute::AccGdd3YearAverage => "accGdd3YearAverage",
            Attribute::AccGddLongTermAverage => "accGddLongTermAverage",
            Attribute::Pet => "pet",
            Attribute::AccPet => "accPet",
            Attribute::Ppet => "ppet",
        }
    }

    pub const fn all() -> &'static [Attribute] {
        &[
            Attribute::MinTemperature,
            Attribute::MaxTemperature,
            Attribute::Precip,
            Attribute::AccPrecip,
            Attribute::AccPrecipPriorYear,
            Attribute::AccPrecip3YearAverage,
            Attribute::AccPrecipLongTermAverage,
            Attribute::Solar,
            Attribute::MinHumidity,
            Attribute::MaxHumidity,
            Attribute::MornWind,
            Attribute::MaxWind,
            Attribute::Gdd,
            Attribute::AccGdd,
            Attribute::AccGddPriorYear,
            Attribute::AccGdd3YearAverage,
            Attribute::AccGddLongTermAverage,
            Attribute::Pet,
            Attribute::AccPet,
            Attribute::Ppet,
        ]
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Attribute {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Attribute::all()
            .iter()
            .copied()
            .find(|a| a.as_str() == value)
            .ok_or_else(|| Error::InvalidAttributeValue(value.to_string()))
    }
}

/// Wire names of the optional query parameters.
pub const OPTION_NAMES: [&str; 8] = [
    "attribute",
    "endDate",
    "plantDate",
    "temperatureUnits",
    "gddMethod",
    "baseTemp",
    "maxTempCap",
    "minTempCap",
];

/// Optional parameters of a weather query. `None` fields are not sent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub attribute: Option<Vec<Attribute>>,
    pub end_date: Option<String>,
    pub plant_date: Option<String>,
    pub temperature_units: Option<String>,
    pub gdd_method: Option<String>,
    pub base_temp: Option<f64>,
    pub max_temp_cap: Option<f64>,
    pub min_temp_cap: Option<f64>,
}

impl QueryOptions {
    /// Validate a keyword-style parameter map. `null` values count as absent.
    ///
    /// Checks names against [`OPTION_NAMES`], requires `attribute` to be an
    /// array of known attribute names. Purely structural.
    pub fn from_map(params: &Map<String, Value>) -> Result<Self> {
        let mut options = QueryOptions::default();

        for (name, value) in params {
            match name.as_str() {
                "attribute" => options.attribute = attribute_list(value)?,
                "endDate" => options.end_date = text_param("endDate", value)?,
                "plantDate" => options.plant_date = text_param("plantDate", value)?,
                "temperatureUnits" => {
                    options.temperature_units = text_param("temperatureUnits", value)?
                }
                "gddMethod" => options.gdd_method = text_param("gddMethod", value)?,
                "baseTemp" => options.base_temp = number_param("baseTemp", value)?,
                "maxTempCap" => options.max_temp_cap = number_param("maxTempCap", value)?,
                "minTempCap" => options.min_temp_cap = number_param("minTempCap", value)?,
                _ => return Err(Error::InvalidParameterName(name.clone())),
            }
        }

        Ok(options)
    }

    /// Flatten into query pairs. Each attribute becomes its own `attribute` pair.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();

        if let Some(attributes) = &self.attribute {
            query.extend(attributes.iter().map(|a| ("attribute", a.as_str().to_string())));
        }

        let text = [
            ("endDate", &self.end_date),
            ("plantDate", &self.plant_date),
            ("temperatureUnits", &self.temperature_units),
            ("gddMethod", &self.gdd_method),
        ];
        query.extend(text.into_iter().filter_map(|(k, v)| v.clone().map(|v| (k, v))));

        let numbers = [
            ("baseTemp", self.base_temp),
            ("maxTempCap", self.max_temp_cap),
            ("minTempCap", self.min_temp_cap),
        ];
        query.extend(numbers.into_iter().filter_map(|(k, v)| v.map(|v| (k, v.to_string()))));

        query
    }
}

/// Free-function form of [`QueryOptions::from_map`].
pub fn validate_parameters(params: &Map<String, Value>) -> Result<QueryOptions> {
    QueryOptions::from_map(params)
}

fn attribute_list(value: &Value) -> Result<Option<Vec<Attribute>>> {
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Attribute::try_from(s.as_str()),
                other => Err(Error::InvalidAttributeValue(other.to_string())),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some),
        other => Err(Error::InvalidAttributeType(other.clone())),
    }
}

fn text_param(name: &'static str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(Error::InvalidParameterValue {
            name,
            value: other.clone(),
        }),
    }
}

fn number_param(name: &'static str, value: &Value) -> Result<Option<f64>> {
    let invalid = || Error::InvalidParameterValue {
        name,
        value: value.clone(),
    };

    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_f64().map(Some).ok_or_else(invalid),
        Value::String(s) => s.trim().parse().map(Some).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

/// Reshape the weather endpoint's JSON array into a [`Dataset`].
///
/// Every record must carry a `date` string and a `dailyAttributes` value;
/// the latter is stored verbatim.
pub fn reshape_response(raw: &Value) -> Result<Dataset> {
    let records = raw
        .as_array()
        .ok_or_else(|| Error::MalformedRecord("expected a JSON array of records".to_string()))?;

    let mut data = Dataset::new();

    for (idx, record) in records.iter().enumerate() {
        let date = record
            .get("date")
            .ok_or_else(|| Error::MalformedRecord(format!("record {idx} has no 'date'")))?;
        let attributes = record.get("dailyAttributes").ok_or_else(|| {
            Error::MalformedRecord(format!("record {idx} has no 'dailyAttributes'"))
        })?;

        let date = date
            .as_str()
            .ok_or_else(|| Error::MalformedRecord(format!("record {idx} 'date' is not a string")))?;
        let date = NaiveDateTime::parse_from_str(date, RECORD_DATE_FORMAT).map_err(|e| {
            Error::MalformedRecord(format!("record {idx} 'date' {date:?} is invalid: {e}"))
        })?;

        data.insert(date, attributes.clone());
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("test input must be an object"),
        }
    }

    #[test]
    fn attribute_as_str_roundtrip() {
        for attr in Attribute::all() {
            let parsed = Attribute::try_from(attr.as_str()).expect("roundtrip should succeed");
            assert_eq!(*attr, parsed);
        }
    }

    #[test]
    fn accepts_every_known_option() {
        let params = map(json!({
            "attribute": [],
            "endDate": null,
            "plantDate": null,
            "temperatureUnits": null,
            "gddMethod": null,
            "baseTemp": null,
            "maxTempCap": null,
            "minTempCap": null,
        }));

        let options = validate_parameters(&params).expect("valid options must pass");

        assert_eq!(options.attribute, Some(vec![]));
        assert!(options.to_query().is_empty());
    }

    #[test]
    fn every_option_name_is_recognized() {
        for name in OPTION_NAMES {
            let params = map(json!({ name: null }));
            assert!(validate_parameters(&params).is_ok(), "{name} should be accepted");
        }
    }

    #[test]
    fn rejects_unknown_option() {
        let err = validate_parameters(&map(json!({"invalid": "argument"}))).unwrap_err();
        assert!(matches!(err, Error::InvalidParameterName(name) if name == "invalid"));
    }

    #[test]
    fn rejects_unknown_attribute() {
        let err = validate_parameters(&map(json!({"attribute": ["invalid"]}))).unwrap_err();
        assert!(matches!(err, Error::InvalidAttributeValue(name) if name == "invalid"));
    }

    #[test]
    fn rejects_non_list_attribute() {
        let err = validate_parameters(&map(json!({"attribute": "precip"}))).unwrap_err();
        assert!(matches!(err, Error::InvalidAttributeType(_)));
    }

    #[test]
    fn rejects_non_numeric_temperature() {
        let err = validate_parameters(&map(json!({"baseTemp": "warm"}))).unwrap_err();
        assert!(matches!(err, Error::InvalidParameterValue { name: "baseTemp", .. }));
    }

    #[test]
    fn options_flatten_to_query_pairs() {
        let params = map(json!({
            "attribute": ["precip", "maxTemperature"],
            "endDate": "2016-07-10",
            "temperatureUnits": "fahrenheit",
            "baseTemp": 10,
            "maxTempCap": "30.5",
        }));

        let query = validate_parameters(&params).expect("valid").to_query();

        assert_eq!(
            query,
            vec![
                ("attribute", "precip".to_string()),
                ("attribute", "maxTemperature".to_string()),
                ("endDate", "2016-07-10".to_string()),
                ("temperatureUnits", "fahrenheit".to_string()),
                ("baseTemp", "10".to_string()),
                ("maxTempCap", "30.5".to_string()),
            ]
        );
    }

    #[test]
    fn reshapes_records_by_date() {
        let raw = json!([{
            "dailyAttributes": {"precip": 0.0},
            "latitude": 0,
            "date": "1999-12-31T00:00:00",
            "longitude": 0,
            "requestId": 0,
        }]);

        let data = reshape_response(&raw).expect("well-formed data");

        let date = NaiveDateTime::parse_from_str("1999-12-31T00:00:00", RECORD_DATE_FORMAT)
            .expect("valid date");
        let mut expected = Dataset::new();
        expected.insert(date, json!({"precip": 0.0}));
        assert_eq!(data, expected);
    }

    #[test]
    fn corrupted_record_is_rejected() {
        let err = reshape_response(&json!([{"invalid": "data"}])).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord(_)));
    }

    #[test]
    fn record_missing_attributes_is_rejected() {
        let raw = json!([
            {"date": "2016-07-01T00:00:00", "dailyAttributes": {"precip": 1.2}},
            {"date": "2016-07-02T00:00:00"},
        ]);

        let err = reshape_response(&raw).unwrap_err();
        assert!(matches!(err, Error::MalformedRecord(msg) if msg.contains("record 1")));
    }

    #[test]
    fn unparseable_date_is_rejected() {
        let raw = json!([{"date": "2016-07-01T00:00:00Z", "dailyAttributes": {}}]);
        assert!(matches!(reshape_response(&raw), Err(Error::MalformedRecord(_))));
    }

    #[test]
    fn non_array_body_is_rejected() {
        let raw = json!({"date": "2016-07-01T00:00:00", "dailyAttributes": {}});
        assert!(matches!(reshape_response(&raw), Err(Error::MalformedRecord(_))));
    }
}
