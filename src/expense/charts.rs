//! Chart generation and rendering for the expense list.
//!
//! Two ECharts visualizations summarize the filtered expenses:
//! - **Category Chart**: Donut chart of the total spent in each category
//! - **Daily Chart**: Bar chart of the total spent on each day
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{
        AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger,
    },
    series::{Bar, Pie},
};
use maud::{Markup, PreEscaped, html};
use time::Date;

use crate::{expense::Category, html::HeadElement};

/// An expense chart with its HTML container ID and ECharts configuration.
pub(super) struct ExpenseChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for the expense charts.
pub(super) fn charts_view(charts: &[ExpenseChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for the expense charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[ExpenseChart]) -> HeadElement {
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

                    const darkModeMediaQuery = window.matchMedia('(prefers-color-scheme: dark)');
                    const updateTheme = () => {{
                        const isDarkMode = darkModeMediaQuery.matches;
                        chart.setTheme(isDarkMode ? 'dark' : 'default');
                    }}
                    darkModeMediaQuery.addEventListener('change', updateTheme);
                    updateTheme();
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

/// Build both charts for the given category and daily totals.
pub(super) fn expense_charts(
    category_totals: &[(Category, f64)],
    daily_totals: &[(Date, f64)],
) -> [ExpenseChart; 2] {
    [
        ExpenseChart {
            id: "category-chart",
            options: category_chart(category_totals).to_string(),
        },
        ExpenseChart {
            id: "daily-chart",
            options: daily_chart(daily_totals).to_string(),
        },
    ]
}

pub(super) fn category_chart(category_totals: &[(Category, f64)]) -> Chart {
    let data = category_totals
        .iter()
        .map(|(category, total)| (*total, category.to_string()))
        .collect::<Vec<_>>();

    Chart::new()
        .title(Title::new().text("Spending by Category"))
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Item)
                .value_formatter(currency_formatter()),
        )
        .legend(Legend::new().bottom("1%"))
        .series(
            Pie::new()
                .name("Category")
                .radius(vec!["40%", "70%"])
                .data(data),
        )
}

pub(super) fn daily_chart(daily_totals: &[(Date, f64)]) -> Chart {
    let (labels, values) = get_daily_label_and_value_pairs(daily_totals);

    Chart::new()
        .title(Title::new().text("Spending by Day"))
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
        .series(Bar::new().name("Spent").data(values))
}

/// Split daily totals into ISO date labels and their amounts.
fn get_daily_label_and_value_pairs(daily_totals: &[(Date, f64)]) -> (Vec<String>, Vec<f64>) {
    daily_totals
        .iter()
        .map(|(date, total)| (date.to_string(), *total))
        .unzip()
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
