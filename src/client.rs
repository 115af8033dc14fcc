use reqwest::Url;
use serde_json::Value;

use crate::record::{Record, decode_record, decode_records, decode_value};
use crate::request::{
    self, Api, LOGIN_HEADER, PASSWORD_HEADER, RequestOptions, SOURCES_PATH, STREAMS_PATH,
};
use crate::{ClientConfig, ClientError, Credentials, DataSource, DataStream};

/// Async SmartData client.
///
/// Holds the credentials and both API roots. Entity handles returned by this
/// client keep a clone of it, so they can issue their own requests.
/// Cloning is cheap; the underlying connection pool is shared.
#[derive(Clone, Debug)]
pub struct SmartDataClient {
    out_api: Url,
    in_api: Url,
    credentials: Credentials,
    http: reqwest::Client,
}

impl SmartDataClient {
    /// Creates a client for the production API roots.
    pub fn new(credentials: Credentials) -> Result<Self, ClientError> {
        Self::from_config(ClientConfig::new(credentials))
    }

    /// Creates a client from an explicit configuration.
    ///
    /// API roots are normalized to include a trailing slash, so relative
    /// endpoint paths join correctly. Without a configured proxy, requests
    /// connect directly and proxy environment variables are ignored.
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let out_api = request::parse_base_url(&config.out_api)?;
        let in_api = request::parse_base_url(&config.in_api)?;

        let mut builder = match config.build_proxy()? {
            Some(proxy) => reqwest::Client::builder().proxy(proxy),
            None => reqwest::Client::builder().no_proxy(),
        };
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            out_api,
            in_api,
            credentials: config.credentials,
            http: builder.build()?,
        })
    }

    /// Lists streams, one page at a time when pagination parameters are
    /// given (see [`crate::Pagination`]).
    pub async fn streams(&self, params: Option<Value>) -> Result<Vec<DataStream>, ClientError> {
        let body = self
            .request(Api::In, STREAMS_PATH, RequestOptions { params, method: None })
            .await?;
        Ok(decode_records("stream", &body)?
            .into_iter()
            .map(|record| DataStream::new(self.clone(), record))
            .collect())
    }

    /// Fetches one stream by identifier.
    pub async fn stream(&self, id: &str) -> Result<DataStream, ClientError> {
        let record = self.fetch_record(Api::In, "stream", &request::stream_path(id)?).await?;
        Ok(DataStream::new(self.clone(), record))
    }

    /// Lists sources, one page at a time when pagination parameters are given.
    pub async fn sources(&self, params: Option<Value>) -> Result<Vec<DataSource>, ClientError> {
        let body = self
            .request(Api::In, SOURCES_PATH, RequestOptions { params, method: None })
            .await?;
        Ok(decode_records("source", &body)?
            .into_iter()
            .map(|record| DataSource::new(self.clone(), record))
            .collect())
    }

    /// Fetches one source by identifier.
    pub async fn source(&self, id: &str) -> Result<DataSource, ClientError> {
        let record = self.fetch_record(Api::In, "source", &request::source_path(id)?).await?;
        Ok(DataSource::new(self.clone(), record))
    }

    /// Sends a request and decodes the response as JSON.
    ///
    /// Returns [`Value::Null`] for successful responses with an empty body.
    pub async fn request_json(
        &self,
        api: Api,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value, ClientError> {
        let body = self.request(api, path, options).await?;
        decode_value(&body)
    }

    /// Sends one request and returns the raw response body.
    ///
    /// `path` is resolved against the root selected by `api`. Transport
    /// failures and non-success statuses are returned as errors.
    pub async fn request(
        &self,
        api: Api,
        path: &str,
        options: RequestOptions,
    ) -> Result<String, ClientError> {
        let prepared = request::prepare(self.base_url(api), path, options)?;
        request::log_dispatch(&prepared);

        let mut builder = self
            .http
            .request(prepared.method.clone(), prepared.url.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .header(LOGIN_HEADER, self.credentials.login())
            .header(PASSWORD_HEADER, self.credentials.password());

        if !prepared.query.is_empty() {
            builder = builder.query(&prepared.query);
        }

        if let Some(json_body) = &prepared.body {
            builder = builder.json(json_body);
        }

        let response = builder
            .send()
            .await
            .inspect_err(|error| request::log_transport_error(&prepared, error))?;
        let status = response.status();
        let payload = response
            .text()
            .await
            .inspect_err(|error| request::log_transport_error(&prepared, error))?;

        request::check_status(&prepared, status, payload)
    }

    pub(crate) async fn fetch_record(
        &self,
        api: Api,
        kind: &'static str,
        path: &str,
    ) -> Result<Record, ClientError> {
        let body = self.request(api, path, RequestOptions::new()).await?;
        decode_record(kind, &body)
    }

    fn base_url(&self, api: Api) -> &Url {
        match api {
            Api::In => &self.in_api,
            Api::Out => &self.out_api,
        }
    }
}
