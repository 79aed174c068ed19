use skill_http::{MatchResultRequest, SkillClient, TeamResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let api_key = std::env::var("SKILL_API_KEY")?;

    let client = SkillClient::builder()
        .api_key(api_key)
        .environment("staging")
        .build()?;

    let result = client
        .submit_match_result(
            "demo-model",
            &MatchResultRequest {
                match_id: "match-42".to_owned(),
                player_sessions: Vec::new(),
                teams: vec![
                    TeamResult {
                        team_id: "blue".to_owned(),
                        rank: 1,
                        players: vec!["alice".to_owned(), "bob".to_owned()],
                    },
                    TeamResult {
                        team_id: "red".to_owned(),
                        rank: 2,
                        players: vec!["carol".to_owned(), "dave".to_owned()],
                    },
                ],
            },
        )
        .await?;

    for rating in result.ratings {
        println!(
            "{}: {:.2} (±{:.2})",
            rating.player_id, rating.rating, rating.uncertainty
        );
    }

    client.shutdown();
    Ok(())
}
