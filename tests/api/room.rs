use std::time::Duration;

use serde_json::json;

use crate::helpers::test_app::TestApp;
use crate::helpers::test_player::TestPlayer;

#[tokio::test]
async fn create_room_claims_hostship_and_generates_a_code() {
    let app = TestApp::spawn_app().await;

    let (mut host, code) = app.create_room("", "Host").await;

    assert_eq!(code.len(), 4);
    host.send(json!({ "type": "room:sync" })).await;
    let update = host.receive_update_where(|update| update["code"] == code).await;
    assert_eq!(update["host"], json!(host.id));
    assert_eq!(update["phase"], "lobby");
    assert_eq!(update["timerSec"], 90);
    assert_eq!(update["voteTimerSec"], 25);
}

#[tokio::test]
async fn client_supplied_codes_are_opaque_and_used_verbatim() {
    let app = TestApp::spawn_app().await;

    let (_host, code) = app.create_room("  testab ", "Host").await;
    let (_other_host, other_code) = app.create_room("  testac ", "Host").await;

    assert_eq!(code, "  testab ");
    assert_eq!(other_code, "  testac ");
    assert_ne!(code, other_code);
}

#[tokio::test]
async fn a_joiner_receives_the_update_their_own_join_broadcasts() {
    let app = TestApp::spawn_app().await;
    let (_host, code) = app.create_room("", "Host").await;

    let mut player = TestPlayer::connect(&app.base_address).await;
    player
        .send(json!({ "type": "room:join", "code": code, "name": "Ana" }))
        .await;

    let update = player.receive_until("room:update").await;
    assert!(update["players"]
        .as_array()
        .unwrap()
        .iter()
        .any(|entry| entry["id"] == json!(player.id)));
}

#[tokio::test]
async fn everyone_sees_players_join() {
    let app = TestApp::spawn_app().await;
    let (mut host, code) = app.create_room("JOIN", "Host").await;

    let ana = app.join_room(&code, "Ana").await;

    let update = host
        .receive_update_where(|update| update["players"].as_array().is_some_and(|players| players.len() == 2))
        .await;
    let players = update["players"].as_array().unwrap();
    assert!(players.iter().any(|player| player["id"] == json!(ana.id)));
    assert!(players.iter().any(|player| player["name"] == "Ana"));
}

#[tokio::test]
async fn dealing_with_too_few_players_reports_the_shortfall() {
    let app = TestApp::spawn_app().await;
    let (mut host, code) = app.create_room("", "Host").await;
    let _ana = app.join_room(&code, "Ana").await;

    host.send(json!({ "type": "round:deal" })).await;

    let error = host.receive_until("round:error").await;
    assert_eq!(error["reason"], "not_enough_players");
    assert_eq!(error["need"], 3);
    assert_eq!(error["have"], 2);
}

#[tokio::test]
async fn a_full_round_reaches_the_reveal() {
    let app = TestApp::spawn_app().await;
    let (mut players, _code) = lobby_with_three_players(&app).await;

    set_topic(&mut players[0], "tech").await;
    let (imposter_index, secret) = deal(&mut players).await;

    // Discussion: every player describes the word on their turn.
    players[0].send(json!({ "type": "round:discuss" })).await;
    let turn_state = players[0].receive_until("turn:state").await;
    let order: Vec<String> = turn_state["order"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(order.len(), 3);
    assert_eq!(turn_state["currentTurn"], json!(order[0]));

    // One socket observes all three broadcast words; reading them on the
    // submitters would interleave with everyone else's copies.
    for id in &order {
        player_by_id(&mut players, id)
            .send(json!({ "type": "turn:submit", "word": "clue" }))
            .await;
        let word = players[0].receive_until("turn:word").await;
        assert_eq!(word["pid"], json!(id.clone()));
        assert_eq!(word["text"], "clue");
    }
    players[0]
        .receive_update_where(|update| update["phase"] == "vote")
        .await;

    // Everyone votes for the impostor except the impostor.
    let imposter_id = players[imposter_index].id.clone();
    let civilian_id = players[(imposter_index + 1) % 3].id.clone();
    for index in 0..players.len() {
        let target = if index == imposter_index {
            civilian_id.clone()
        } else {
            imposter_id.clone()
        };
        players[index]
            .send(json!({ "type": "vote:cast", "targetId": target }))
            .await;
    }

    let results = players[0].receive_until("round:results").await;
    assert_eq!(results["executed"], json!(imposter_id.clone()));
    assert_eq!(results["isHit"], true);
    assert_eq!(results["imposters"], json!(vec![imposter_id]));
    assert_eq!(results["secret"], json!(secret));
    assert_eq!(results["jailbreak"], serde_json::Value::Null);
}

#[tokio::test]
async fn the_imposter_can_jailbreak_with_a_correct_guess() {
    let app = TestApp::spawn_app().await;
    let (mut players, _code) = lobby_with_three_players(&app).await;

    set_topic(&mut players[0], "food").await;
    let (imposter_index, secret) = deal(&mut players).await;

    players[0].send(json!({ "type": "round:discuss" })).await;
    players[0].send(json!({ "type": "round:start-vote" })).await;
    players[0]
        .receive_update_where(|update| update["phase"] == "vote")
        .await;

    let sloppy_guess = format!("  {}  ", secret.to_uppercase());
    players[imposter_index]
        .send(json!({ "type": "imposter:guess", "guess": sloppy_guess }))
        .await;

    let imposter_id = players[imposter_index].id.clone();
    let results = players[0].receive_until("round:results").await;
    assert_eq!(results["jailbreak"], json!(imposter_id));
    assert_eq!(results["executed"], serde_json::Value::Null);
    assert_eq!(results["isHit"], false);
}

#[tokio::test]
async fn an_emptied_room_comes_back_as_a_fresh_lobby() {
    let app = TestApp::spawn_app().await;
    let (mut host, code) = app.create_room("RECY", "Host").await;
    set_topic(&mut host, "disney").await;

    host.send(json!({ "type": "room:leave" })).await;
    // room:leave is fire-and-forget; let the room process it and empty
    // itself before the code is reused.
    tokio::time::sleep(Duration::from_millis(250)).await;

    let (mut host, reused_code) = app.create_room("RECY", "Host").await;
    assert_eq!(reused_code, code);
    host.send(json!({ "type": "room:sync" })).await;
    let update = host
        .receive_update_where(|update| update["code"] == json!(code.clone()))
        .await;
    assert_eq!(update["topic"], serde_json::Value::Null);
    assert_eq!(update["players"].as_array().unwrap().len(), 1);
}

async fn lobby_with_three_players(app: &TestApp) -> (Vec<TestPlayer>, String) {
    let (host, code) = app.create_room("", "Host").await;
    let ana = app.join_room(&code, "Ana").await;
    let bea = app.join_room(&code, "Bea").await;
    (vec![host, ana, bea], code)
}

async fn set_topic(host: &mut TestPlayer, topic: &str) {
    host.send(json!({ "type": "topic:set", "topic": topic })).await;
    host.receive_update_where(|update| update["topic"] == json!(topic.to_string()))
        .await;
}

/// Deals and reads every player's private role. Returns the impostor's index
/// and the secret word the civilians share.
async fn deal(players: &mut [TestPlayer]) -> (usize, String) {
    players[0].send(json!({ "type": "round:deal" })).await;

    let mut imposter_index = None;
    let mut secret = None;
    for (index, player) in players.iter_mut().enumerate() {
        let role = player.receive_until("role:assign").await;
        if role["isImposter"] == true {
            assert_eq!(role["word"], serde_json::Value::Null);
            assert_eq!(imposter_index, None, "more than one impostor was dealt");
            imposter_index = Some(index);
        } else {
            secret = Some(role["word"].as_str().expect("civilian without a word").to_string());
        }
    }

    (
        imposter_index.expect("no impostor was dealt"),
        secret.expect("no civilian received the secret"),
    )
}

fn player_by_id<'a>(players: &'a mut [TestPlayer], id: &str) -> &'a mut TestPlayer {
    players
        .iter_mut()
        .find(|player| player.id == id)
        .expect("unknown player id in the turn order")
}
