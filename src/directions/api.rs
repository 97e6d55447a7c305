use std::time::Duration;

use serde_json::Value;

use crate::core::{
    MapsClient, MapsError, Request,
    client::{CacheMode, RetryConfig},
};

use super::model::OutputFormat;

pub(super) async fn fetch_directions(
    client: &MapsClient,
    format: OutputFormat,
    params: Vec<(&'static str, String)>,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
    timeout: Option<Duration>,
) -> Result<Value, MapsError> {
    let url = client.base_directions().join(format.as_str())?;

    let mut req = Request::get(url).param("key", client.api_key());
    for (k, v) in params {
        req = req.param(k, v);
    }
    if let Some(t) = timeout {
        req = req.timeout(t);
    }

    client.execute_with(req, cache_mode, retry_override).await
}
