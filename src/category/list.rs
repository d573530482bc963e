//! The category manager section rendered on the settings page.

use maud::{Markup, html};

use crate::{
    category::Category,
    endpoints,
    html::{
        CATEGORY_BADGE_STYLE, LINK_STYLE, PANEL_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE,
        TABLE_ROW_STYLE, edit_delete_action_links,
    },
};

/// Render the category manager: a table of the user's categories with
/// edit/delete actions and a link to the creation page.
pub fn category_manager_section(categories: &[Category]) -> Markup {
    let table_row = |category: &Category| {
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_CATEGORY_VIEW, category.id);
        let delete_url = endpoints::format_endpoint(endpoints::CATEGORY, category.id);
        let confirm_message = format!(
            "Are you sure you want to delete '{}'? Transactions keep existing but lose the category.",
            category.name
        );

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    span class=(CATEGORY_BADGE_STYLE) { (category.name) }
                }

                td class=(TABLE_CELL_STYLE) { (category.kind.label()) }

                td class=(TABLE_CELL_STYLE)
                {
                    (edit_delete_action_links(&edit_url, &delete_url, &confirm_message))
                }
            }
        )
    };

    html! {
        section class=(PANEL_STYLE)
        {
            div class="flex items-center justify-between mb-4"
            {
                h2 class="text-xl font-semibold" { "Categories" }

                a href=(endpoints::NEW_CATEGORY_VIEW) class=(LINK_STYLE) { "New category" }
            }

            @if categories.is_empty() {
                p class="text-gray-500 dark:text-gray-400" { "No categories yet." }
            } @else {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400"
                {
                    thead class=(TABLE_HEADER_STYLE)
                    {
                        tr
                        {
                            th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Kind" }
                            th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                        }
                    }

                    tbody
                    {
                        @for category in categories {
                            (table_row(category))
                        }
                    }
                }
            }
        }
    }
}
