use crate::models::destination_details::DestinationDetails;
use crate::models::schema::destination_details_schema;
use crate::models::travel_plan::Destination;
use crate::services::completion::{CompletionClient, GenerationError, GenerationRequest};

const DETAIL_TEMPERATURE: f32 = 0.5;

/// The stop after `destination`, wrapping around to the first one.
///
/// A name that is not in the list also resolves to the first stop.
pub fn next_destination<'a>(
    destination: &Destination,
    all_destinations: &'a [Destination],
) -> Option<&'a Destination> {
    let next_index = all_destinations
        .iter()
        .position(|d| d.name == destination.name)
        .map(|index| index + 1)
        .unwrap_or(0);

    all_destinations
        .get(next_index)
        .or_else(|| all_destinations.first())
}

pub fn build_detail_prompt(destination: &Destination, next: &Destination, country: &str) -> String {
    let days = destination.suggested_days;
    let name = &destination.name;
    let next_name = &next.name;

    format!(
        "You are a helpful travel assistant planning a trip to {country}. The user wants a detailed plan \
         for their {days}-day stay in \"{name}\". The next major destination on their trip is \"{next_name}\".\n\n\
         Please provide the following in JSON format:\n\
         1. A day-by-day itinerary for the {days} day(s) in \"{name}\". Each day should have a title and 2-4 activities with short descriptions.\n\
         2. Narrative travel directions from \"{name}\" to \"{next_name}\".\n\
         3. A \"packingAndTips\" object containing a 'packingList' of 5-7 essential items for this city, and two 'travelTips'.\n\
         4. An \"entertainment\" object with two 'movieRecommendations' (title and reason) relevant to the location, \
         and a list of 'streamingSites' like Ventura where they could be watched."
    )
}

pub async fn fetch_destination_details(
    client: &dyn CompletionClient,
    destination: &Destination,
    country: &str,
    all_destinations: &[Destination],
) -> Result<DestinationDetails, GenerationError> {
    let next = next_destination(destination, all_destinations)
        .ok_or(GenerationError::InvalidStructure)?;

    let request = GenerationRequest {
        prompt: build_detail_prompt(destination, next, country),
        schema: destination_details_schema(),
        temperature: DETAIL_TEMPERATURE,
    };

    let text = client.generate(request).await.map_err(|e| {
        log::error!(
            "Error fetching destination details for {}: {}",
            destination.name,
            e
        );
        e
    })?;

    let details: DestinationDetails = serde_json::from_str(text.trim()).map_err(|e| {
        log::error!(
            "Unparseable destination details for {}: {}",
            destination.name,
            e
        );
        GenerationError::from(e)
    })?;

    // Kept as generated; a short or long itinerary is still worth showing.
    if details.daily_plans.len() as i64 != destination.suggested_days {
        log::warn!(
            "{} has {} suggested days but {} daily plans were generated",
            destination.name,
            destination.suggested_days,
            details.daily_plans.len()
        );
    }

    Ok(details)
}
