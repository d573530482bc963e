//! Chart generation and rendering for the dashboard.
//!
//! The expenses-by-category pie chart is generated as JSON configuration for
//! the ECharts library and rendered with an HTML container and a JavaScript
//! initialization snippet.

use charming::{
    Chart,
    component::{Axis, Grid, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::Bar,
};
use maud::{Markup, PreEscaped, html};

use crate::{html::HeadElement, transaction::TransactionRow};

/// The label used for expenses that have no category.
pub(super) const UNCATEGORIZED_LABEL: &str = "Uncategorized";

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Sum expense rows by category name, largest total first.
///
/// Rows without a category are grouped under [UNCATEGORIZED_LABEL].
pub(super) fn group_expenses_by_category(rows: &[TransactionRow]) -> Vec<(String, f64)> {
    let mut totals: Vec<(String, f64)> = Vec::new();

    for row in rows {
        let label = row
            .category_name
            .clone()
            .unwrap_or_else(|| UNCATEGORIZED_LABEL.to_owned());

        match totals.iter_mut().find(|(name, _)| *name == label) {
            Some((_, total)) => *total += row.amount,
            None => totals.push((label, row.amount)),
        }
    }

    totals.sort_by(|a, b| b.1.total_cmp(&a.1));
    totals
}

/// Build the expenses-by-category bar chart.
pub(super) fn expenses_chart(category_totals: &[(String, f64)]) -> DashboardChart {
    let labels: Vec<String> = category_totals.iter().map(|(name, _)| name.clone()).collect();
    let values: Vec<f64> = category_totals.iter().map(|(_, total)| *total).collect();

    let chart = Chart::new()
        .title(Title::new().text("Expenses by category"))
        .tooltip(currency_tooltip())
        .grid(
            Grid::new()
                .left("3%")
                .right("4%")
                .bottom("3%")
                .contain_label(true),
        )
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(currency_formatter())),
        )
        .series(Bar::new().name("Expenses").data(values));

    DashboardChart {
        id: "expenses-chart",
        options: chart.to_string(),
    }
}

#[inline]
fn currency_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "const currencyFormatter = new Intl.NumberFormat('en-US', {
              style: 'currency',
              currency: 'USD'
            });
            return (number) ? currencyFormatter.format(number) : \"-\";",
    )
}

/// Creates a tooltip configuration for currency values
fn currency_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(currency_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

/// Renders the HTML container for a dashboard chart.
pub(super) fn chart_view(chart: &DashboardChart) -> Markup {
    html!(
        div
            id=(chart.id)
            class="min-h-[380px] w-full rounded dark:bg-gray-100"
        {}
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates a script that initializes ECharts instances with responsive
/// resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);
                }})();"#,
                chart.id, chart.options
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}
