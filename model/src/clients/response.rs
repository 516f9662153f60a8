use super::error::{self, Result};
use super::{ApiMethod, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use snafu::{ensure, ResultExt};

/// The status and body of a Kiali API call. The status is not judged when the response is
/// received; negative tests expect 4xx and 5xx responses.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    method: ApiMethod,
    status: StatusCode,
    body: Vec<u8>,
}

impl ApiResponse {
    pub fn new<B>(method: ApiMethod, status: StatusCode, body: B) -> Self
    where
        B: Into<Vec<u8>>,
    {
        Self {
            method,
            status,
            body: body.into(),
        }
    }

    /// Creates a `200 OK` response carrying `value` as its body.
    pub fn ok_json(method: ApiMethod, value: &Value) -> Self {
        Self::new(method, StatusCode::OK, value.to_string())
    }

    pub fn method(&self) -> ApiMethod {
        self.method
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).to_string()
    }

    /// Deserializes the body as JSON.
    pub fn json<T>(&self) -> Result<T>
    where
        T: DeserializeOwned,
    {
        Ok(serde_json::from_slice(&self.body).context(error::DeserializeSnafu {
            method: self.method.to_string(),
        })?)
    }

    pub fn json_value(&self) -> Result<Value> {
        self.json()
    }

    /// Returns the response if its status is `expected`, otherwise an error carrying the body.
    pub fn expect_status(self, expected: StatusCode) -> Result<Self> {
        ensure!(
            self.status == expected,
            error::UnexpectedStatusSnafu {
                method: self.method.to_string(),
                expected: expected.as_u16(),
                status: self.status.as_u16(),
                body: self.text(),
            }
        );
        Ok(self)
    }
}
