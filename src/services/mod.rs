pub mod account;
pub mod tracker;

pub use account::AccountService;
pub use tracker::{CollegeTracking, ScholarshipTracking, Tracker, TrackerView, TrackingApi};
