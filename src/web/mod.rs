//! Integration with `http`-based frameworks.
//!
//! The gate core works on [`RequestDescriptor`](crate::RequestDescriptor) and
//! [`GateOutcome`](crate::GateOutcome), neither of which depends on a web
//! framework. This module is the boundary:
//!
//! - [`DescribeRequest`] maps an `http::Request` onto a descriptor, using the
//!   configured site origin instead of the `Host` header
//! - [`EdgeGate::handle_http`](crate::EdgeGate::handle_http) runs the gate on
//!   an `http::Request` directly
//! - [`redirect_response`] and [`append_cookie_ops`] turn an outcome back into
//!   response headers, so provider cookie mutations are sent on every path
//!
//! # Example Flow
//!
//! ```ignore
//! let outcome = gate.handle_http(&request).await;
//! let response = match &outcome {
//!     GateOutcome::Redirect(r) => redirect_response(r)?,
//!     GateOutcome::PassThrough(_) => {
//!         let mut response = router.call(request).await?;
//!         apply_outcome_cookies(&outcome, &mut response);
//!         response
//!     }
//! };
//! ```

mod extract;
mod middleware;

pub use extract::{DescribeRequest, REQUEST_ID_HEADER};
pub use middleware::{append_cookie_ops, apply_outcome_cookies, redirect_response};
