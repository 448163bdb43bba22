use crate::models::schema::travel_plan_schema;
use crate::models::travel_plan::{Destination, TravelPlan};
use crate::services::completion::{CompletionClient, GenerationError, GenerationRequest};

const PLAN_TEMPERATURE: f32 = 0.7;

pub fn build_plan_prompt(country: &str, days: i64) -> String {
    format!(
        "You are an expert travel planner. Create a travel plan for a {days}-day trip to {country}. \
         Your plan should distribute the {days} days among 3 to 5 key cities or regions. \
         For each destination, provide its name, a short compelling description, a publicly accessible, \
         directly linkable, high-quality image URL (preferably from Wikimedia Commons or a similar \
         open-source repository), its precise latitude and longitude, and the number of days you suggest \
         spending there. Ensure the sum of 'suggestedDays' equals the total trip duration of {days} days. \
         Also, provide a bounding box that encompasses all these locations."
    )
}

/// Generate a plan for `days` days in `country` and force the day split to
/// match the request.
pub async fn fetch_travel_plan(
    client: &dyn CompletionClient,
    country: &str,
    days: i64,
) -> Result<TravelPlan, GenerationError> {
    let request = GenerationRequest {
        prompt: build_plan_prompt(country, days),
        schema: travel_plan_schema(),
        temperature: PLAN_TEMPERATURE,
    };

    let text = client.generate(request).await.map_err(|e| {
        log::error!("Error fetching travel plan for {}: {}", country, e);
        e
    })?;

    let mut plan = parse_travel_plan(&text).map_err(|e| {
        log::error!("Unusable travel plan for {}: {}", country, e);
        e
    })?;

    reconcile_days(&mut plan.destinations, days);
    Ok(plan)
}

pub fn parse_travel_plan(text: &str) -> Result<TravelPlan, GenerationError> {
    let value: serde_json::Value = serde_json::from_str(text.trim())?;

    if value.get("destinations").is_none() || value.get("boundingBox").is_none() {
        return Err(GenerationError::InvalidStructure);
    }

    Ok(serde_json::from_value(value)?)
}

/// Push the whole day surplus or deficit onto the longest stay.
///
/// Ties go to the first destination. The adjusted stay never drops below one
/// day, so when the clamp kicks in the total still differs from `days`.
pub fn reconcile_days(destinations: &mut [Destination], days: i64) {
    let total = destinations
        .iter()
        .fold(0i64, |acc, d| acc.saturating_add(d.suggested_days));
    if total == days || destinations.is_empty() {
        return;
    }

    log::warn!(
        "Model suggested {} days, but user requested {}. Normalizing...",
        total,
        days
    );

    let diff = days.saturating_sub(total);
    let mut target = 0;
    let mut max_days = 0;
    for (index, destination) in destinations.iter().enumerate() {
        if destination.suggested_days > max_days {
            max_days = destination.suggested_days;
            target = index;
        }
    }

    let destination = &mut destinations[target];
    destination.suggested_days = destination.suggested_days.saturating_add(diff);
    if destination.suggested_days <= 0 {
        destination.suggested_days = 1;
    }
}
