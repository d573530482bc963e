use axum::{body::Body, response::Response};
use axum_htmx::HX_REDIRECT;

/// Assert that `response` carries an `HX-Redirect` header pointing at `endpoint`.
#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    let location = response
        .headers()
        .get(HX_REDIRECT)
        .expect("expected response to have the header hx-redirect");

    assert_eq!(
        location, endpoint,
        "got redirect to {location:?}, want redirect to {endpoint}"
    );
}
