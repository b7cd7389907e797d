pub mod beat;
pub mod params;
pub mod plan;
pub mod story;
