use std::fmt;

use crate::request::RequestDescriptor;

/// Request-scoped logger for gate decisions.
///
/// Every event carries the request id and path so a single request can be
/// followed through both gate stages. Cookie values never reach this type;
/// only names and decisions are logged.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GateLog<'a> {
    request_id: &'a str,
    path: &'a str,
}

impl<'a> GateLog<'a> {
    /// Creates a logger bound to one request.
    pub(crate) fn for_request(req: &'a RequestDescriptor) -> Self {
        Self {
            request_id: req.request_id(),
            path: req.path(),
        }
    }

    pub(crate) fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(request_id = %self.request_id, path = %self.path, "{}", args);
    }

    pub(crate) fn warn(&self, args: fmt::Arguments<'_>) {
        tracing::warn!(request_id = %self.request_id, path = %self.path, "{}", args);
    }

    pub(crate) fn debug(&self, args: fmt::Arguments<'_>) {
        tracing::debug!(request_id = %self.request_id, path = %self.path, "{}", args);
    }
}
