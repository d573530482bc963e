//! Category management.
//!
//! Categories group transactions by purpose (e.g. 'Rent', 'Groceries') and
//! carry a kind that matches the transaction types they apply to.

mod core;
mod create;
mod delete;
mod edit;
mod list;

pub use core::{
    Category, CategoryId, CategoryKind, CategoryName, category_exists, create_category,
    create_category_table, get_all_categories, get_category,
};
pub use create::{create_category_endpoint, get_new_category_page};
pub use delete::delete_category_endpoint;
pub use edit::{get_edit_category_page, update_category_endpoint};
pub use list::category_manager_section;
