//! Category edit page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    audit::{AuditAction, EntityKind, record_audit_event},
    auth::UserID,
    category::{
        Category, CategoryId, CategoryName, create::CategoryFormData, create::category_form_fields,
        get_category,
    },
    endpoints,
    html::{BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, base},
    navigation::NavBar,
};

use super::core::update_category;

/// The state needed for editing a category.
#[derive(Debug, Clone)]
pub struct EditCategoryState {
    /// The database connection for managing categories.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditCategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the category edit page.
pub async fn get_edit_category_page(
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .map_err(|_| Error::DatabaseLockError)?;

    let category = get_category(category_id, user_id, &connection)?;

    Ok(edit_category_view(&category).into_response())
}

fn edit_category_view(category: &Category) -> Markup {
    let nav_bar = NavBar::new(endpoints::SETTINGS_VIEW).into_html();
    let update_url = endpoints::format_endpoint(endpoints::CATEGORY, category.id);

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            form
                hx-put=(update_url)
                hx-target-error="#alert-container"
                class="w-full space-y-4 md:space-y-6"
            {
                (category_form_fields(category.name.as_ref(), category.kind))

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Save Category" }
            }
        }
    };

    base("Edit Category", &[], &content)
}

/// Handle category edit form submission.
pub async fn update_category_endpoint(
    State(state): State<EditCategoryState>,
    Extension(user_id): Extension<UserID>,
    Path(category_id): Path<CategoryId>,
    Form(form): Form<CategoryFormData>,
) -> Response {
    let name = match CategoryName::new(&form.name) {
        Ok(name) => name,
        Err(error) => {
            return error.into_alert_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_category(category_id, user_id, name, form.kind, &connection) {
        Ok(()) => {
            record_audit_event(
                user_id,
                AuditAction::Updated,
                EntityKind::Category,
                category_id,
                &connection,
            );

            (
                HxRedirect(endpoints::SETTINGS_VIEW.to_owned()),
                StatusCode::SEE_OTHER,
            )
                .into_response()
        }
        Err(error) => error.into_alert_response(),
    }
}

#[cfg(test)]
mod edit_category_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;

    use crate::{
        auth::{Email, PasswordHash, UserID, create_user},
        category::{CategoryKind, CategoryName, create_category, get_category},
        category::create::CategoryFormData,
        db::initialize,
    };

    use super::{EditCategoryState, get_edit_category_page, update_category_endpoint};

    fn get_test_state() -> (EditCategoryState, UserID) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        let user = create_user(
            Email::new_unchecked("foo@bar.baz"),
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();

        (
            EditCategoryState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn edit_page_renders_for_existing_category() {
        let (state, user_id) = get_test_state();
        let category = {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                user_id,
                CategoryName::new_unchecked("Rent"),
                CategoryKind::FixedExpense,
                &connection,
            )
            .unwrap()
        };

        let response =
            get_edit_category_page(State(state), Extension(user_id), Path(category.id))
                .await
                .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn update_changes_name_and_kind() {
        let (state, user_id) = get_test_state();
        let category = {
            let connection = state.db_connection.lock().unwrap();
            create_category(
                user_id,
                CategoryName::new_unchecked("Rent"),
                CategoryKind::FixedExpense,
                &connection,
            )
            .unwrap()
        };

        let form = CategoryFormData {
            name: "Dining out".to_owned(),
            kind: CategoryKind::VariableExpense,
        };
        let response = update_category_endpoint(
            State(state.clone()),
            Extension(user_id),
            Path(category.id),
            Form(form),
        )
        .await
        .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        let connection = state.db_connection.lock().unwrap();
        let updated = get_category(category.id, user_id, &connection).unwrap();
        assert_eq!(updated.name.as_ref(), "Dining out");
        assert_eq!(updated.kind, CategoryKind::VariableExpense);
    }

    #[tokio::test]
    async fn update_missing_category_returns_not_found() {
        let (state, user_id) = get_test_state();

        let form = CategoryFormData {
            name: "Dining out".to_owned(),
            kind: CategoryKind::VariableExpense,
        };
        let response =
            update_category_endpoint(State(state), Extension(user_id), Path(999), Form(form))
                .await
                .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
