//! Credit card management.
//!
//! Cards are attached to expense transactions; the cards page shows each
//! card's limit and its computed invoice for the current month.

mod cards_page;
mod core;
mod create_endpoint;
mod create_page;
mod delete_endpoint;
mod edit_endpoint;
mod edit_page;

pub use cards_page::get_cards_page;
pub use core::{
    Card, CardId, card_exists, create_card, create_card_table, get_all_cards, get_card,
    get_card_invoice,
};
pub use create_endpoint::create_card_endpoint;
pub use create_page::get_new_card_page;
pub use delete_endpoint::delete_card_endpoint;
pub use edit_endpoint::update_card_endpoint;
pub use edit_page::get_edit_card_page;

pub(crate) use create_endpoint::CardForm;
