use serde_json::Value;
use tracing::warn;

use crate::error::ClientError;
use crate::session::{EndpointRef, PredictSession};

/// Invoke the first endpoint in the list that succeeds.
///
/// Each failing attempt is logged and the next endpoint tried with the same
/// payload; when every attempt fails, the last attempt's error is returned.
/// This is a bounded compatibility shim, not an open-ended retry loop: the
/// production call site passes exactly two addressing conventions.
pub async fn predict_with_fallback<S: PredictSession + ?Sized>(
    session: &S,
    endpoints: &[EndpointRef],
    data: &[Value],
) -> Result<Value, ClientError> {
    let mut last_err = None;
    for endpoint in endpoints {
        match session.predict(endpoint, data).await {
            Ok(reply) => return Ok(reply),
            Err(e) => {
                warn!(endpoint = %endpoint, error = %e, "endpoint failed");
                last_err = Some(e);
            }
        }
    }
    Err(last_err.unwrap_or(ClientError::NoEndpoint))
}
