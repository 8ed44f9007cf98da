mod history;
mod machine;

pub use history::{SurveyHistory, SurveyRecord, SURVEYS_KEY};
pub use machine::{JourneyStatus, Survey, SurveyState};
