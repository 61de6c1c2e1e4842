pub mod history;
pub mod profile;

pub use history::{ProfileHistoryEntry, StatusChange};
pub use profile::{NewProfile, ParseStatusError, Profile, ProfileChanges, ProfileId, ProfileStatus};
