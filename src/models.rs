pub mod destination_details;
pub mod schema;
pub mod travel_plan;
