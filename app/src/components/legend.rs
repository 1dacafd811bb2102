use dioxus::prelude::*;
use grievance_core::timeline::narration::legend_lines;

/// Static key for the bubble chart.
#[component]
pub fn Legend(sentinel: String) -> Element {
    let lines = legend_lines(&sentinel);
    rsx! {
        div { id: "legend", class: "legend-inner",
            for line in lines {
                div { class: "legend-line", "{line}" }
            }
        }
    }
}
