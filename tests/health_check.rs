use std::net::SocketAddr;

use tokio::net::TcpListener;
use turncoat::config::Config;

#[tokio::test]
async fn health_check_works() {
    let base_address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{base_address}/health"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    assert_eq!("healthy".to_string(), response.text().await.unwrap());
}

#[tokio::test]
async fn metrics_endpoint_exposes_the_gauges() {
    let base_address = spawn_app().await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{base_address}/metrics"))
        .send()
        .await
        .expect("Failed to execute request.");

    assert!(response.status().is_success());
    let body = response.text().await.unwrap();
    assert!(body.contains("turncoat_active_rooms"));
    assert!(body.contains("turncoat_connected_players"));
}

async fn spawn_app() -> String {
    // Binding to port 0 triggers an OS scan for an available port, this way we can run tests in parallel where each runs its own application
    let random_port_address = SocketAddr::from(([127, 0, 0, 1], 0));
    let listener = TcpListener::bind(random_port_address)
        .await
        .expect("Failed to bind random port.");
    let address = listener.local_addr().unwrap();

    std::env::set_var("ENVIRONMENT", "dev");
    let config = Config::get().expect("Failed to read configuration.");
    let _ = tokio::spawn(turncoat::startup::run_web_server(listener, config));

    format!("localhost:{}", address.port())
}
