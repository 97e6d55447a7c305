use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

use crate::core::BoxError;
use crate::core::net::{TransportRequest, TransportResponse};

/// Callback run before every attempt is sent.
pub type RequestHook = Arc<dyn Fn(&TransportRequest) -> Result<(), BoxError> + Send + Sync>;
/// Callback run on every transport response, before classification.
pub type ResponseHook = Arc<dyn Fn(&TransportResponse) -> Result<(), BoxError> + Send + Sync>;

/// Handle returned when registering a hook, used to remove it again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HookId(u64);

#[derive(Default)]
struct HookList {
    next_id: u64,
    request: Vec<(HookId, RequestHook)>,
    response: Vec<(HookId, ResponseHook)>,
}

/// Ordered pre-request and post-response interceptors.
///
/// Hooks run best-effort: an `Err` or a panic is logged and dropped, and never stops the
/// remaining hooks or the request itself.
#[derive(Default)]
pub(crate) struct Hooks {
    inner: RwLock<HookList>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let list = self.inner.read();
        f.debug_struct("Hooks")
            .field("request", &list.request.len())
            .field("response", &list.response.len())
            .finish()
    }
}

impl Hooks {
    pub(crate) fn add_request(&self, hook: RequestHook) -> HookId {
        let mut list = self.inner.write();
        let id = HookId(list.next_id);
        list.next_id += 1;
        list.request.push((id, hook));
        id
    }

    pub(crate) fn add_response(&self, hook: ResponseHook) -> HookId {
        let mut list = self.inner.write();
        let id = HookId(list.next_id);
        list.next_id += 1;
        list.response.push((id, hook));
        id
    }

    pub(crate) fn remove(&self, id: HookId) -> bool {
        let mut list = self.inner.write();
        let before = list.request.len() + list.response.len();
        list.request.retain(|(h, _)| *h != id);
        list.response.retain(|(h, _)| *h != id);
        before != list.request.len() + list.response.len()
    }

    pub(crate) fn clear(&self) {
        let mut list = self.inner.write();
        list.request.clear();
        list.response.clear();
    }

    pub(crate) fn len(&self) -> usize {
        let list = self.inner.read();
        list.request.len() + list.response.len()
    }

    pub(crate) fn before_request(&self, request: &TransportRequest) {
        // snapshot so a hook may register or remove hooks without deadlocking
        let hooks: Vec<RequestHook> = self
            .inner
            .read()
            .request
            .iter()
            .map(|(_, h)| h.clone())
            .collect();
        for hook in hooks {
            if let Err(e) = guarded(|| hook(request)) {
                warn!(error = %e, "request hook failed; continuing");
            }
        }
    }

    pub(crate) fn after_response(&self, response: &TransportResponse) {
        let hooks: Vec<ResponseHook> = self
            .inner
            .read()
            .response
            .iter()
            .map(|(_, h)| h.clone())
            .collect();
        for hook in hooks {
            if let Err(e) = guarded(|| hook(response)) {
                warn!(error = %e, status = response.status, "response hook failed; continuing");
            }
        }
    }
}

/// Run one hook, turning an `Err` or an unwinding panic into a message.
fn guarded(call: impl FnOnce() -> Result<(), BoxError>) -> Result<(), String> {
    match panic::catch_unwind(AssertUnwindSafe(call)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => Err(e.to_string()),
        Err(payload) => Err(format!("panicked: {}", panic_message(&*payload))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string payload"
    }
}
