//! Request and response payloads for the two skill operations.
//!
//! Field names follow the service's camelCase wire format.

use serde::{Deserialize, Serialize};

/// A player's active session, used for session-scoped rating lookups.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSession {
    pub player_id: String,
    pub session_id: String,
}

/// One team's final standing in a finished match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamResult {
    pub team_id: String,
    /// Final placement, 1 = winner. Ties share a rank.
    pub rank: u32,
    pub players: Vec<String>,
}

/// Finished-match report submitted to update player skill ratings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResultRequest {
    pub match_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub player_sessions: Vec<PlayerSession>,
    pub teams: Vec<TeamResult>,
}

/// Updated rating for a single player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerRating {
    pub player_id: String,
    pub rating: f64,
    pub uncertainty: f64,
}

/// Ratings produced by a match-result submission.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResultResponse {
    pub match_id: String,
    #[serde(default)]
    pub ratings: Vec<PlayerRating>,
}

/// One team's lineup for an upcoming match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamLineup {
    pub team_id: String,
    pub players: Vec<String>,
}

/// Pre-match query asking for expected outcomes before play starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreMatchRequest {
    pub match_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub player_sessions: Vec<PlayerSession>,
    pub teams: Vec<TeamLineup>,
}

/// Predicted outcome for a single team.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPrediction {
    pub team_id: String,
    pub win_probability: f64,
}

/// Expected outcomes returned by a pre-match query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreMatchResponse {
    pub match_id: String,
    #[serde(default)]
    pub predictions: Vec<TeamPrediction>,
}

#[cfg(test)]
mod tests {
    use crate::{MatchResultRequest, TeamResult};

    #[test]
    fn match_result_request_serializes_camel_case() {
        let request = MatchResultRequest {
            match_id: "m-1".to_owned(),
            player_sessions: Vec::new(),
            teams: vec![TeamResult {
                team_id: "blue".to_owned(),
                rank: 1,
                players: vec!["p1".to_owned()],
            }],
        };

        let json = serde_json::to_value(&request).expect("must serialize");
        assert_eq!(json["matchId"], "m-1");
        assert_eq!(json["teams"][0]["teamId"], "blue");
        // Empty session lists stay off the wire entirely.
        assert!(json.get("playerSessions").is_none());
    }

    #[test]
    fn pre_match_response_tolerates_missing_predictions() {
        let response: crate::PreMatchResponse =
            serde_json::from_str(r#"{"matchId":"m-2"}"#).expect("must deserialize");
        assert_eq!(response.match_id, "m-2");
        assert!(response.predictions.is_empty());
    }
}
