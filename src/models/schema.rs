//! Response-shape constraints sent with every generation request.
//!
//! The completion service only returns documents matching these schemas, so
//! the field names and `required` lists here must stay in step with the
//! structs in `travel_plan` and `destination_details`.

use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchemaType {
    Object,
    Array,
    String,
    Number,
    Integer,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct Schema {
    #[serde(rename = "type")]
    pub schema_type: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<BTreeMap<String, Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl Schema {
    fn primitive(schema_type: SchemaType) -> Self {
        Self {
            schema_type,
            description: None,
            properties: None,
            items: None,
            required: None,
        }
    }

    pub fn string() -> Self {
        Self::primitive(SchemaType::String)
    }

    pub fn number() -> Self {
        Self::primitive(SchemaType::Number)
    }

    pub fn integer() -> Self {
        Self::primitive(SchemaType::Integer)
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::primitive(SchemaType::Array)
        }
    }

    /// Object whose listed properties are all required.
    pub fn object(properties: Vec<(&str, Schema)>) -> Self {
        let required = properties.iter().map(|(name, _)| name.to_string()).collect();
        let properties = properties
            .into_iter()
            .map(|(name, schema)| (name.to_string(), schema))
            .collect();

        Self {
            properties: Some(properties),
            required: Some(required),
            ..Self::primitive(SchemaType::Object)
        }
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn property(&self, name: &str) -> Option<&Schema> {
        self.properties.as_ref().and_then(|props| props.get(name))
    }
}

pub fn travel_plan_schema() -> Schema {
    let location = Schema::object(vec![
        ("lat", Schema::number().describe("Latitude of the destination.")),
        ("lng", Schema::number().describe("Longitude of the destination.")),
    ]);

    let destination = Schema::object(vec![
        (
            "name",
            Schema::string().describe("The name of the tourist destination."),
        ),
        (
            "description",
            Schema::string()
                .describe("A brief, engaging description of the destination (2-3 sentences)."),
        ),
        ("location", location),
        (
            "suggestedDays",
            Schema::integer()
                .describe("The recommended number of days to spend in this destination."),
        ),
        (
            "imageUrl",
            Schema::string()
                .describe("A publicly accessible, high-quality image URL for the destination."),
        ),
    ]);

    let bounding_box = Schema::object(vec![
        ("north", Schema::number().describe("Northernmost latitude.")),
        ("south", Schema::number().describe("Southernmost latitude.")),
        ("east", Schema::number().describe("Easternmost longitude.")),
        ("west", Schema::number().describe("Westernmost longitude.")),
    ])
    .describe("The geographical bounding box that contains all the destinations.");

    Schema::object(vec![
        (
            "destinations",
            Schema::array(destination)
                .describe("A list of 3-5 key tourist destinations (cities or regions)."),
        ),
        ("boundingBox", bounding_box),
    ])
}

pub fn destination_details_schema() -> Schema {
    let activity = Schema::object(vec![
        (
            "name",
            Schema::string().describe("Name of the activity or place to visit."),
        ),
        (
            "description",
            Schema::string().describe(
                "A one-sentence description, which could include a tip or a restaurant suggestion.",
            ),
        ),
    ]);

    let daily_plan = Schema::object(vec![
        (
            "day",
            Schema::integer().describe("The day number (e.g., 1, 2, 3)."),
        ),
        (
            "title",
            Schema::string().describe(
                "A catchy title for the day's theme (e.g., 'Historical Heart & Culinary Delights').",
            ),
        ),
        (
            "activities",
            Schema::array(activity).describe("A list of activities for the day."),
        ),
    ]);

    let packing_and_tips = Schema::object(vec![
        (
            "packingList",
            Schema::array(Schema::string())
                .describe("A list of 5-7 essential items to pack for this specific destination."),
        ),
        (
            "travelTips",
            Schema::array(Schema::string()).describe(
                "Two useful, concise travel tips for this destination (e.g., 'Public transport is very efficient,' or 'Try the local street food.').",
            ),
        ),
    ]);

    let movie = Schema::object(vec![
        ("title", Schema::string().describe("The title of the movie.")),
        (
            "reason",
            Schema::string()
                .describe("A brief reason why it's a good movie to watch for this trip."),
        ),
    ]);

    let entertainment = Schema::object(vec![
        (
            "movieRecommendations",
            Schema::array(movie).describe(
                "Two movie recommendations that are filmed in or are thematically related to the destination.",
            ),
        ),
        (
            "streamingSites",
            Schema::array(Schema::string()).describe(
                "A list of 2-3 popular streaming sites where these movies might be available, such as Ventura, Netflix, etc.",
            ),
        ),
    ]);

    Schema::object(vec![
        (
            "dailyPlans",
            Schema::array(daily_plan)
                .describe("A detailed day-by-day itinerary for the specified number of days."),
        ),
        (
            "directionsToNext",
            Schema::string().describe(
                "Narrative travel directions from the current destination to the next, mentioning mode of transport and estimated time.",
            ),
        ),
        ("packingAndTips", packing_and_tips),
        ("entertainment", entertainment),
    ])
}
