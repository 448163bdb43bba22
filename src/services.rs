pub mod completion;
pub mod credential_store;
pub mod detail_service;
pub mod map_bootstrap;
pub mod map_scene;
pub mod maps_loader;
pub mod plan_service;
pub mod trip_session;
