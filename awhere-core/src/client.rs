use chrono::{Local, NaiveDate, Utc};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::{
    auth::{AccessToken, exchange_token},
    config::{ClientConfig, Credentials},
    error::{Error, Result},
    model::{Dataset, QueryOptions, reshape_response},
    transport::{HttpResponse, HttpTransport, Transport},
};

/// Mutable state of a client: the current token and the last dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientState {
    pub authorization: Option<AccessToken>,
    pub dataset: Option<Dataset>,
}

/// Client for the aWhere weather endpoint.
///
/// Not synchronized: one instance should not be shared across threads while
/// `authorize` or `request` are running.
#[derive(Debug)]
pub struct WeatherClient<T = HttpTransport> {
    config: ClientConfig,
    transport: T,
    state: ClientState,
}

impl WeatherClient<HttpTransport> {
    /// Unauthorized client against the production API.
    pub fn new() -> Result<Self> {
        Ok(Self::with_transport(ClientConfig::default(), HttpTransport::new()?))
    }

    /// Build a client and authorize it in one step. See [`Credentials::obtain`].
    pub fn connect(key: Option<&str>, secret: Option<&str>) -> Result<Self> {
        let mut client = Self::new()?;
        client.authorize(key, secret)?;
        Ok(client)
    }
}

impl<T: Transport> WeatherClient<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            state: ClientState::default(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.state.authorization.as_ref()
    }

    /// `Bearer <token>`, once authorized.
    pub fn authorization_header(&self) -> Option<String> {
        self.token().map(AccessToken::header_value)
    }

    /// `true` when there is no token or it has passed its expiry.
    pub fn token_expired(&self) -> bool {
        self.token().is_none_or(|t| t.is_expired(Utc::now()))
    }

    /// Dataset from the most recent successful request.
    pub fn data(&self) -> Option<&Dataset> {
        self.state.dataset.as_ref()
    }

    /// Authorize with explicit credentials, or the credentials file when
    /// either is missing.
    pub fn authorize(&mut self, key: Option<&str>, secret: Option<&str>) -> Result<()> {
        let credentials = Credentials::obtain(key, secret)?;
        self.authorize_with(&credentials)
    }

    pub fn authorize_with(&mut self, credentials: &Credentials) -> Result<()> {
        let token = exchange_token(&self.transport, &self.config, credentials, Utc::now())?;
        info!(expires_at = %token.expires_at, "authorized");
        self.state.authorization = Some(token);
        Ok(())
    }

    /// Query parameters for a request, in wire order.
    pub fn query_params(
        latitude: f64,
        longitude: f64,
        start_date: Option<NaiveDate>,
        options: &QueryOptions,
    ) -> Vec<(&'static str, String)> {
        let start_date = start_date.unwrap_or_else(|| Local::now().date_naive());

        let mut query = vec![
            ("latitude", latitude.to_string()),
            ("longitude", longitude.to_string()),
            ("startDate", start_date.format("%Y-%m-%d").to_string()),
        ];
        query.extend(options.to_query());
        query
    }

    /// Fetch weather for a location. `start_date` defaults to today.
    ///
    /// On success the dataset is replaced and `true` is returned; on any
    /// error the previous dataset is kept.
    pub fn request(
        &mut self,
        latitude: f64,
        longitude: f64,
        start_date: Option<NaiveDate>,
        options: &QueryOptions,
    ) -> Result<bool> {
        let authorization = self.authorization_header().ok_or(Error::NotAuthorized)?;
        let query = Self::query_params(latitude, longitude, start_date, options);
        let url = self.config.weather_url();

        debug!(%url, ?query, "requesting weather");
        let res = self.transport.get(&url, &authorization, &query)?;
        self.handle_response(res)
    }

    /// Like [`request`](Self::request), with keyword-style options validated
    /// by [`QueryOptions::from_map`] before any network call.
    pub fn request_with(
        &mut self,
        latitude: f64,
        longitude: f64,
        start_date: Option<NaiveDate>,
        params: &Map<String, Value>,
    ) -> Result<bool> {
        let options = QueryOptions::from_map(params)?;
        self.request(latitude, longitude, start_date, &options)
    }

    fn handle_response(&mut self, res: HttpResponse) -> Result<bool> {
        if res.status != 200 {
            warn!(status = res.status, "weather request failed");
            let body = serde_json::from_str(&res.body).unwrap_or(Value::String(res.body));
            return Err(Error::ApiRequestFailed {
                status: res.status,
                body,
            });
        }

        let raw: Value = serde_json::from_str(&res.body)
            .map_err(|e| Error::MalformedRecord(format!("response body is not JSON: {e}")))?;
        let data = reshape_response(&raw)?;

        debug!(records = data.len(), "weather data received");
        self.state.dataset = Some(data);
        Ok(true)
    }
}
