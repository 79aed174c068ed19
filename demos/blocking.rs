//! Blocking call style for non-async applications. No `#[tokio::main]`
//! needed; the client drives the call on its own runtime.

use skill_http::{PreMatchRequest, SkillClient, TeamLineup};

fn main() -> anyhow::Result<()> {
    let api_key = std::env::var("SKILL_API_KEY")?;

    let client = SkillClient::builder().api_key(api_key).build()?;

    let prediction = client.compute_pre_match_blocking(
        "demo-model",
        &PreMatchRequest {
            match_id: "match-43".to_owned(),
            player_sessions: Vec::new(),
            teams: vec![
                TeamLineup {
                    team_id: "blue".to_owned(),
                    players: vec!["alice".to_owned()],
                },
                TeamLineup {
                    team_id: "red".to_owned(),
                    players: vec!["carol".to_owned()],
                },
            ],
        },
    )?;

    for team in prediction.predictions {
        println!("{}: {:.1}%", team.team_id, team.win_probability * 100.0);
    }

    client.shutdown();
    Ok(())
}
