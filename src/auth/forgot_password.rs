//! The page with instructions for resetting a forgotten password.

use axum::response::{IntoResponse, Response};
use maud::html;

use crate::{
    endpoints,
    html::{PAGE_CONTAINER_STYLE, base, link},
};

/// Display instructions for resetting the user's password.
pub async fn get_forgot_password_page() -> Response {
    let content = html! {
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Reset your password" }

            p class="mb-2"
            {
                "Passwords can only be reset from the machine running the server. \
                Run the following command and follow the prompts:"
            }

            pre class="bg-gray-100 dark:bg-gray-800 rounded p-3 mb-4"
            {
                code { "cargo run --bin reset_password -- --db-path <DB_PATH>" }
            }

            p
            {
                "Remembered it after all? "
                (link(endpoints::LOG_IN_VIEW, "Log in here"))
            }
        }
    };

    base("Forgot Password", &[], &content).into_response()
}
