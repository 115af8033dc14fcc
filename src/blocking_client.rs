use reqwest::{Method, Url};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::params::MappingProposal;
use crate::record::{Record, decode_at, decode_record, decode_records, decode_value};
use crate::request::{
    self, Api, LOGIN_HEADER, PASSWORD_HEADER, RequestOptions, SOURCES_PATH, STREAMS_PATH,
};
use crate::{ClientConfig, ClientError, Credentials};

/// Blocking SmartData client.
///
/// This is the synchronous counterpart of [`crate::SmartDataClient`]. It must
/// not be created or used from within an async runtime.
#[derive(Clone, Debug)]
pub struct BlockingSmartDataClient {
    out_api: Url,
    in_api: Url,
    credentials: Credentials,
    http: reqwest::blocking::Client,
}

impl BlockingSmartDataClient {
    /// Creates a client for the production API roots.
    pub fn new(credentials: Credentials) -> Result<Self, ClientError> {
        Self::from_config(ClientConfig::new(credentials))
    }

    /// Creates a client from an explicit configuration.
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let out_api = request::parse_base_url(&config.out_api)?;
        let in_api = request::parse_base_url(&config.in_api)?;

        let mut builder = match config.build_proxy()? {
            Some(proxy) => reqwest::blocking::Client::builder().proxy(proxy),
            None => reqwest::blocking::Client::builder().no_proxy(),
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

    /// Lists streams.
    pub fn streams(&self, params: Option<Value>) -> Result<Vec<BlockingDataStream>, ClientError> {
        let body = self.request(Api::In, STREAMS_PATH, RequestOptions { params, method: None })?;
        Ok(decode_records("stream", &body)?
            .into_iter()
            .map(|record| BlockingDataStream {
                client: self.clone(),
                record,
            })
            .collect())
    }

    /// Fetches one stream by identifier.
    pub fn stream(&self, id: &str) -> Result<BlockingDataStream, ClientError> {
        let body = self.request(Api::In, &request::stream_path(id)?, RequestOptions::new())?;
        Ok(BlockingDataStream {
            client: self.clone(),
            record: decode_record("stream", &body)?,
        })
    }

    /// Lists sources.
    pub fn sources(&self, params: Option<Value>) -> Result<Vec<BlockingDataSource>, ClientError> {
        let body = self.request(Api::In, SOURCES_PATH, RequestOptions { params, method: None })?;
        Ok(decode_records("source", &body)?
            .into_iter()
            .map(|record| BlockingDataSource {
                client: self.clone(),
                record,
            })
            .collect())
    }

    /// Fetches one source by identifier.
    pub fn source(&self, id: &str) -> Result<BlockingDataSource, ClientError> {
        let body = self.request(Api::In, &request::source_path(id)?, RequestOptions::new())?;
        Ok(BlockingDataSource {
            client: self.clone(),
            record: decode_record("source", &body)?,
        })
    }

    /// Sends a request and decodes the response as JSON.
    ///
    /// Returns [`Value::Null`] for successful responses with an empty body.
    pub fn request_json(
        &self,
        api: Api,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value, ClientError> {
        decode_value(&self.request(api, path, options)?)
    }

    /// Sends one request and returns the raw response body.
    pub fn request(
        &self,
        api: Api,
        path: &str,
        options: RequestOptions,
    ) -> Result<String, ClientError> {
        let base = match api {
            Api::In => &self.in_api,
            Api::Out => &self.out_api,
        };
        let prepared = request::prepare(base, path, options)?;
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
            .inspect_err(|error| request::log_transport_error(&prepared, error))?;
        let status = response.status();
        let payload = response
            .text()
            .inspect_err(|error| request::log_transport_error(&prepared, error))?;

        request::check_status(&prepared, status, payload)
    }
}

/// Blocking counterpart of [`crate::DataStream`].
#[derive(Clone, Debug)]
pub struct BlockingDataStream {
    client: BlockingSmartDataClient,
    record: Record,
}

impl BlockingDataStream {
    pub fn id(&self) -> &str {
        self.record.id()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.record.get(name)
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn data(&self, params: Option<Value>) -> Result<Value, ClientError> {
        let body = self.client.request(
            Api::Out,
            &request::stream_data_path(self.id())?,
            RequestOptions { params, method: None },
        )?;
        Ok(serde_json::from_str(&body)?)
    }

    pub fn fields(&self) -> Result<Value, ClientError> {
        let body = self.client.request(
            Api::Out,
            &request::stream_fields_path(self.id())?,
            RequestOptions::new(),
        )?;
        decode_at(&body, "/fields/content")
    }

    pub fn values(&self, params: Option<Value>) -> Result<Value, ClientError> {
        let body = self.client.request(
            Api::Out,
            &request::stream_values_path(self.id())?,
            RequestOptions { params, method: None },
        )?;
        decode_at(&body, "/content")
    }
}

impl Serialize for BlockingDataStream {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.record.serialize(serializer)
    }
}

/// Blocking counterpart of [`crate::DataSource`].
#[derive(Clone, Debug)]
pub struct BlockingDataSource {
    client: BlockingSmartDataClient,
    record: Record,
}

impl BlockingDataSource {
    pub fn id(&self) -> &str {
        self.record.id()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.record.get(name)
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn update(&self, data: Value) -> Result<BlockingDataSource, ClientError> {
        let options = RequestOptions::new()
            .with_params(data)
            .with_method(Method::PUT);
        let body = self
            .client
            .request(Api::In, &request::source_path(self.id())?, options)?;
        Ok(BlockingDataSource {
            client: self.client.clone(),
            record: decode_record("source", &body)?,
        })
    }

    pub fn delete(&self) -> Result<(), ClientError> {
        let options = RequestOptions::new().with_method(Method::DELETE);
        self.client
            .request(Api::In, &request::source_path(self.id())?, options)?;
        Ok(())
    }

    pub fn fields(&self) -> Result<Value, ClientError> {
        let body = self.client.request(
            Api::In,
            &request::source_path(self.id())?,
            RequestOptions::new(),
        )?;
        decode_at(&body, "/fields")
    }

    pub fn mapping_preview(&self, real_path: &str, mapped_to: &str) -> Result<Value, ClientError> {
        let proposal = MappingProposal {
            real_path: real_path.to_owned(),
            mapped_to: mapped_to.to_owned(),
        };
        let options = RequestOptions::new()
            .with_params(proposal)
            .with_method(Method::POST);
        let body = self
            .client
            .request(Api::In, &request::mapping_preview_path(self.id())?, options)?;
        decode_value(&body)
    }

    /// Not supported by this client; no request is sent.
    pub fn put(&self, _data: &Value) -> Result<(), ClientError> {
        Err(ClientError::Unsupported("put"))
    }

    /// Not supported by this client; no request is sent.
    pub fn integrate(&self) -> Result<(), ClientError> {
        Err(ClientError::Unsupported("integrate"))
    }

    /// Not supported by this client; no request is sent.
    pub fn remove(&self, _query: &Value) -> Result<(), ClientError> {
        Err(ClientError::Unsupported("remove"))
    }
}

impl Serialize for BlockingDataSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.record.serialize(serializer)
    }
}
