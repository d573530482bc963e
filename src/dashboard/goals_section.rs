//! The monthly goals section of the dashboard.

use maud::{Markup, html};

use crate::{
    endpoints,
    goal::MonthlyGoal,
    html::{
        BUTTON_DELETE_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        PANEL_STYLE, format_currency,
    },
};

/// Render the goals checklist with a form for adding a new goal.
pub(super) fn goals_section(goals: &[MonthlyGoal], month: u8, year: i32) -> Markup {
    html! {
        section class=(PANEL_STYLE)
        {
            h2 class="text-xl font-semibold mb-4" { "Goals for this month" }

            @if goals.is_empty() {
                p class="text-gray-500 dark:text-gray-400 mb-4" { "No goals set for this month." }
            } @else {
                ul class="space-y-3 mb-4"
                {
                    @for goal in goals {
                        (goal_item(goal))
                    }
                }
            }

            form
                hx-post=(endpoints::GOALS_API)
                hx-target-error="#alert-container"
                class="grid grid-cols-2 lg:grid-cols-3 gap-3 items-end"
            {
                input type="hidden" name="month" value=(month);
                input type="hidden" name="year" value=(year);

                div
                {
                    label for="goal-name" class=(FORM_LABEL_STYLE) { "Goal" }

                    input
                        type="text"
                        name="name"
                        id="goal-name"
                        placeholder="e.g. Save for the trip"
                        required
                        class=(FORM_TEXT_INPUT_STYLE);
                }

                div
                {
                    label for="target_amount" class=(FORM_LABEL_STYLE) { "Target" }

                    div class="input-wrapper w-full"
                    {
                        input
                            type="number"
                            name="target_amount"
                            id="target_amount"
                            step="0.01"
                            min="0"
                            required
                            class=(FORM_TEXT_INPUT_STYLE);
                    }
                }

                button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Add goal" }
            }
        }
    }
}

fn goal_item(goal: &MonthlyGoal) -> Markup {
    let toggle_url = endpoints::format_endpoint(endpoints::GOAL_TOGGLE, goal.id);
    let delete_url = endpoints::format_endpoint(endpoints::GOAL, goal.id);
    let name_style = if goal.is_completed {
        "line-through text-gray-500 dark:text-gray-400"
    } else {
        "font-medium"
    };

    html! {
        li class="flex items-center justify-between p-3 bg-gray-50 dark:bg-gray-700 rounded-md"
        {
            div
            {
                p class=(name_style) { (goal.name) }

                p class="text-sm text-gray-600 dark:text-gray-400"
                {
                    "Target: " (format_currency(goal.target_amount))
                }
            }

            div class="flex gap-3"
            {
                button
                    type="button"
                    hx-post=(toggle_url)
                    hx-target-error="#alert-container"
                    class="text-blue-600 hover:text-blue-500 dark:text-blue-500 underline bg-transparent border-none cursor-pointer"
                {
                    @if goal.is_completed { "Reopen" } @else { "Done" }
                }

                button
                    type="button"
                    hx-delete=(delete_url)
                    hx-confirm="Delete this goal?"
                    hx-target="closest li"
                    hx-swap="outerHTML"
                    hx-target-error="#alert-container"
                    class=(BUTTON_DELETE_STYLE)
                {
                    "Delete"
                }
            }
        }
    }
}
