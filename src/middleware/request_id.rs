//! UUID-based request-id generator plugged into `tower_http`'s
//! `SetRequestIdLayer`/`PropagateRequestIdLayer` pair so every response
//! carries the id back and every trace span can be correlated to it.

use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        id.parse::<http::HeaderValue>().ok().map(RequestId::new)
    }
}
