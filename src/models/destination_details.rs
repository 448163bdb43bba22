use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Activity {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct DailyPlan {
    pub day: i64,
    pub title: String,
    pub activities: Vec<Activity>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PackingAndTips {
    pub packing_list: Vec<String>,
    pub travel_tips: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct MovieRecommendation {
    pub title: String,
    pub reason: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entertainment {
    pub movie_recommendations: Vec<MovieRecommendation>,
    pub streaming_sites: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DestinationDetails {
    pub daily_plans: Vec<DailyPlan>,
    pub directions_to_next: String,
    pub packing_and_tips: PackingAndTips,
    pub entertainment: Entertainment,
}

impl DestinationDetails {
    /// Stand-in shown in the detail panel when generation fails, so the
    /// panel always has something to render.
    pub fn placeholder() -> Self {
        Self {
            daily_plans: vec![DailyPlan {
                day: 1,
                title: "Error".to_string(),
                activities: vec![Activity {
                    name: "Could not load plan".to_string(),
                    description: "Please try again.".to_string(),
                }],
            }],
            directions_to_next: "Could not load directions.".to_string(),
            packing_and_tips: PackingAndTips {
                packing_list: vec!["-".to_string()],
                travel_tips: vec!["-".to_string()],
            },
            entertainment: Entertainment {
                movie_recommendations: vec![MovieRecommendation {
                    title: "Error".to_string(),
                    reason: "Could not load recommendations.".to_string(),
                }],
                streaming_sites: vec!["-".to_string()],
            },
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DestinationSelection {
    pub name: String,
}
