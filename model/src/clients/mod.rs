mod api_method;
pub(crate) mod error;
mod http_status_code;
mod kiali_client;
mod response;

pub use api_method::ApiMethod;
pub use error::{Error, Result};
pub use http_status_code::{HttpStatusCode, StatusCode};
pub use kiali_client::{KialiApi, KialiClient};
pub use response::ApiResponse;
