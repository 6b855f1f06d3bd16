use chrono::{DateTime, FixedOffset};
use serde::Deserialize;
use validator::Validate;

#[derive(Deserialize, Validate, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateTournamentParams {
    #[validate(length(min = 1, max = 1024))]
    pub title: String,
    pub start_time: DateTime<FixedOffset>,
    #[validate(length(min = 1))]
    pub host_id: Option<String>,
}
