use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use crate::core::{
    MapsClient, MapsError, Request,
    client::{API_KEY_HEADER, CacheMode, FIELD_MASK_HEADER, RetryConfig},
};

pub(super) const COMPUTE_ROUTES_PATH: &str = "directions/v2:computeRoutes";
pub(super) const ROUTE_MATRIX_PATH: &str = "distanceMatrix/v2:computeRouteMatrix";

pub(super) async fn post<B: Serialize>(
    client: &MapsClient,
    path: &str,
    body: &B,
    field_mask: Option<&str>,
    cache_mode: CacheMode,
    retry_override: Option<&RetryConfig>,
    timeout: Option<Duration>,
) -> Result<Value, MapsError> {
    let url = client.base_routes().join(path)?;

    let mut req = Request::post(url)
        .header(API_KEY_HEADER, client.api_key())
        .json(serde_json::to_value(body)?);
    if let Some(mask) = field_mask {
        req = req.vary_header(FIELD_MASK_HEADER, mask);
    }
    if let Some(t) = timeout {
        req = req.timeout(t);
    }

    client.execute_with(req, cache_mode, retry_override).await
}
