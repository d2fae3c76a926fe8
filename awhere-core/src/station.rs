use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::{
    client::WeatherClient,
    error::Result,
    model::{Dataset, QueryOptions},
    transport::{HttpTransport, Transport},
};

/// A [`WeatherClient`] pinned to one named location.
#[derive(Debug)]
pub struct WeatherStation<T = HttpTransport> {
    name: String,
    latitude: f64,
    longitude: f64,
    client: WeatherClient<T>,
}

impl WeatherStation<HttpTransport> {
    /// Build a station whose client is authorized from the credentials file.
    pub fn connect(name: impl Into<String>, latitude: f64, longitude: f64) -> Result<Self> {
        let client = WeatherClient::connect(None, None)?;
        Ok(Self::new(name, latitude, longitude, client))
    }
}

impl<T: Transport> WeatherStation<T> {
    pub fn new(
        name: impl Into<String>,
        latitude: f64,
        longitude: f64,
        client: WeatherClient<T>,
    ) -> Self {
        Self {
            name: name.into(),
            latitude,
            longitude,
            client,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn client(&self) -> &WeatherClient<T> {
        &self.client
    }

    /// Mutable access, e.g. to re-authorize an expired token.
    pub fn client_mut(&mut self) -> &mut WeatherClient<T> {
        &mut self.client
    }

    pub fn data(&self) -> Option<&Dataset> {
        self.client.data()
    }

    pub fn request(
        &mut self,
        start_date: Option<NaiveDate>,
        options: &QueryOptions,
    ) -> Result<bool> {
        self.client.request(self.latitude, self.longitude, start_date, options)
    }

    pub fn request_with(
        &mut self,
        start_date: Option<NaiveDate>,
        params: &Map<String, Value>,
    ) -> Result<bool> {
        self.client.request_with(self.latitude, self.longitude, start_date, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ClientConfig, Credentials,
        transport::{HttpResponse, mock::MockTransport},
    };

    const TOKEN: &str = r#"{"access_token":"xxxx","expires_in":3599}"#;
    const DATA: &str = r#"[{"date":"2016-07-01T00:00:00","dailyAttributes":{"precip":0.0}}]"#;

    fn client() -> WeatherClient<MockTransport> {
        let transport = MockTransport::with_responses([
            HttpResponse::new(200, TOKEN),
            HttpResponse::new(200, DATA),
        ]);
        let mut client = WeatherClient::with_transport(ClientConfig::default(), transport);
        client
            .authorize_with(&Credentials::new("ABCDEFG", "123456"))
            .expect("authorize must succeed");
        client
    }

    #[test]
    fn station_request_matches_direct_request() {
        let options = QueryOptions {
            temperature_units: Some("fahrenheit".into()),
            ..Default::default()
        };

        let mut direct = client();
        direct
            .request(39.8, -98.5, None, &options)
            .expect("direct request");

        let mut station = WeatherStation::new("Kansas", 39.8, -98.5, client());
        station.request(None, &options).expect("station request");

        assert_eq!(station.client().transport().calls(), direct.transport().calls());
        assert_eq!(station.data(), direct.data());
    }

    #[test]
    fn station_keeps_its_location() {
        let station = WeatherStation::new("Kansas", 39.8, -98.5, client());

        assert_eq!(station.name(), "Kansas");
        assert_eq!(station.latitude(), 39.8);
        assert_eq!(station.longitude(), -98.5);
        assert!(station.data().is_none());
    }
}
