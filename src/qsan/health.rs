//! Storage health evaluation
//!
//! SANOS 4 publishes a labelled status list; SANOS 3 only shows a row of indicator
//! icons whose file names encode the colour.

use crate::qsan::markup::Document;
use crate::qsan::types::Health;

pub const HEALTH_LABEL: &str = "System Health";
pub const HEALTHY_VALUE: &str = "Good";
pub const INDICATOR_ID: &str = "status_indicator";

/// Looks for the `System Health` item. Unknown when the list has no such item.
pub fn from_status_list(page: &Document) -> Health {
    page.find_all("status_item")
        .into_iter()
        .find(|item| item.child_text("label").is_some_and(|l| l.trim() == HEALTH_LABEL))
        .map(|item| {
            Health::from(
                item.child_text("value")
                    .is_some_and(|v| v.trim() == HEALTHY_VALUE),
            )
        })
        .unwrap_or(Health::Unknown)
}

/// Healthy only when the indicator exists and every icon in it is green.
pub fn from_status_indicator(page: &Document) -> Health {
    let Some(indicator) = page.find_by_id(INDICATOR_ID) else {
        return Health::Unhealthy;
    };

    let all_green = indicator
        .find_all("img")
        .iter()
        .all(|img| img.attribute("src").is_some_and(|src| src.contains("green")));
    Health::from(all_green)
}
