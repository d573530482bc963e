//! Alert messages displayed to users via HTMX out-of-band swaps.
//!
//! Error responses from form endpoints render into the fixed `#alert-container`
//! element of the base layout.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

/// Render an error alert with the given `message` headline and `details` body.
pub fn alert_error(status_code: StatusCode, message: &str, details: &str) -> Response {
    (status_code, alert_view(AlertType::Error, message, details)).into_response()
}

/// Render a success alert with the given `message` headline and `details` body.
#[allow(dead_code)]
pub fn alert_success(message: &str, details: &str) -> Response {
    (StatusCode::OK, alert_view(AlertType::Success, message, details)).into_response()
}

enum AlertType {
    Success,
    Error,
}

fn alert_view(alert_type: AlertType, message: &str, details: &str) -> Markup {
    let (container_style, icon) = match alert_type {
        AlertType::Success => (
            "flex items-start gap-3 p-4 text-sm text-green-800 rounded-lg \
            bg-green-50 dark:bg-gray-800 dark:text-green-400 border border-green-300 \
            dark:border-green-800 shadow",
            "✓",
        ),
        AlertType::Error => (
            "flex items-start gap-3 p-4 text-sm text-red-800 rounded-lg \
            bg-red-50 dark:bg-gray-800 dark:text-red-400 border border-red-300 \
            dark:border-red-800 shadow",
            "!",
        ),
    };

    html! {
        div
            class=(container_style)
            role="alert"
        {
            span class="font-bold" { (icon) }

            div
            {
                p class="font-medium" { (message) }

                @if !details.is_empty() {
                    p { (details) }
                }
            }

            button
                type="button"
                class="ms-auto font-bold"
                onclick="document.getElementById('alert-container').classList.add('hidden')"
                aria-label="Dismiss"
            {
                "×"
            }
        }
    }
}
