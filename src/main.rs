use tokio::net::TcpListener;

use turncoat::config::Config;
use turncoat::startup::run_web_server;

#[tokio::main]
async fn main() {
    std_logger::Config::logfmt().init();

    let config = Config::get().expect("Unable to get the Config.");
    let address = format!("{}:{}", config.application.host, config.application.port);
    let listener = TcpListener::bind(&address)
        .await
        .unwrap_or_else(|error| panic!("Failed to bind to {address}. Error: '{error}'."));

    if let Err(error) = run_web_server(listener, config).await {
        log::error!("The web server stopped. Error: '{error}'.");
    }
}
