//! Entity handles returned by [`SmartDataClient`].

use reqwest::Method;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::params::MappingProposal;
use crate::record::{Record, decode_at, decode_record, decode_value};
use crate::request::{self, Api, RequestOptions};
use crate::{ClientError, SmartDataClient};

/// A stream: read-oriented records served by the out API.
#[derive(Clone, Debug)]
pub struct DataStream {
    client: SmartDataClient,
    record: Record,
}

impl DataStream {
    pub(crate) fn new(client: SmartDataClient, record: Record) -> Self {
        Self { client, record }
    }

    pub fn id(&self) -> &str {
        self.record.id()
    }

    /// Returns a property of the stream as the server sent it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.record.get(name)
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Fetches the stream contents.
    ///
    /// `params` (see [`crate::DataQuery`]) is forwarded verbatim as the query
    /// string; the decoded payload is returned as is.
    pub async fn data(&self, params: Option<Value>) -> Result<Value, ClientError> {
        let body = self
            .client
            .request(
                Api::Out,
                &request::stream_data_path(self.id())?,
                RequestOptions { params, method: None },
            )
            .await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Computes the list of the stream's fields (`fields.content`).
    pub async fn fields(&self) -> Result<Value, ClientError> {
        let body = self
            .client
            .request(
                Api::Out,
                &request::stream_fields_path(self.id())?,
                RequestOptions::new(),
            )
            .await?;
        decode_at(&body, "/fields/content")
    }

    /// Fetches the distinct values of one field (see [`crate::ValuesQuery`]),
    /// returning `content`.
    pub async fn values(&self, params: Option<Value>) -> Result<Value, ClientError> {
        let body = self
            .client
            .request(
                Api::Out,
                &request::stream_values_path(self.id())?,
                RequestOptions { params, method: None },
            )
            .await?;
        decode_at(&body, "/content")
    }
}

impl Serialize for DataStream {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.record.serialize(serializer)
    }
}

/// A source: an administratively managed collection on the in API.
///
/// Mutating calls return a fresh handle reflecting server state and leave
/// `self` untouched.
#[derive(Clone, Debug)]
pub struct DataSource {
    client: SmartDataClient,
    record: Record,
}

impl DataSource {
    pub(crate) fn new(client: SmartDataClient, record: Record) -> Self {
        Self { client, record }
    }

    pub fn id(&self) -> &str {
        self.record.id()
    }

    /// Returns a property of the source as the server sent it.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.record.get(name)
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    /// Replaces the source representation with `data`.
    pub async fn update(&self, data: Value) -> Result<DataSource, ClientError> {
        let options = RequestOptions::new()
            .with_params(data)
            .with_method(Method::PUT);
        let body = self
            .client
            .request(Api::In, &request::source_path(self.id())?, options)
            .await?;
        Ok(DataSource::new(self.client.clone(), decode_record("source", &body)?))
    }

    /// Deletes the source.
    pub async fn delete(&self) -> Result<(), ClientError> {
        let options = RequestOptions::new().with_method(Method::DELETE);
        self.client
            .request(Api::In, &request::source_path(self.id())?, options)
            .await?;
        Ok(())
    }

    /// Lists every leaf path of the objects held by the source.
    pub async fn fields(&self) -> Result<Value, ClientError> {
        let body = self
            .client
            .request(Api::In, &request::source_path(self.id())?, RequestOptions::new())
            .await?;
        decode_at(&body, "/fields")
    }

    /// Previews renaming `real_path` to `mapped_to`. The source is not
    /// modified; the server's preview is returned verbatim.
    pub async fn mapping_preview(
        &self,
        real_path: &str,
        mapped_to: &str,
    ) -> Result<Value, ClientError> {
        let proposal = MappingProposal {
            real_path: real_path.to_owned(),
            mapped_to: mapped_to.to_owned(),
        };
        let options = RequestOptions::new()
            .with_params(proposal)
            .with_method(Method::POST);
        let body = self
            .client
            .request(Api::In, &request::mapping_preview_path(self.id())?, options)
            .await?;
        decode_value(&body)
    }

    /// Data ingestion. Not supported by this client; no request is sent.
    pub fn put(&self, _data: &Value) -> Result<(), ClientError> {
        Err(ClientError::Unsupported("put"))
    }

    /// Integration trigger. Not supported by this client; no request is sent.
    pub fn integrate(&self) -> Result<(), ClientError> {
        Err(ClientError::Unsupported("integrate"))
    }

    /// Query-based document removal. Not supported by this client; no
    /// request is sent.
    pub fn remove(&self, _query: &Value) -> Result<(), ClientError> {
        Err(ClientError::Unsupported("remove"))
    }
}

impl Serialize for DataSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.record.serialize(serializer)
    }
}
