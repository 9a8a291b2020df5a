pub mod application;
pub mod institution;
pub mod profile;
pub mod scholarship;

pub use application::{
    ApplicationType, NewApplicationRequest, TrackedApplication, UpdateApplicationRequest,
};
pub use institution::Institution;
pub use profile::{Profile, ProfileUpdate, Settings, SettingsPatch, UserAccount};
pub use scholarship::Scholarship;
