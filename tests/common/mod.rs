use reqwest::{Client, redirect::Policy};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use uuid::Uuid;

use secrecy::ExposeSecret;
use workshophub::{AppState, Config, build_router, services::storage::FileStorageService};

/// HTTP test application wrapper
///
/// Boots the router on a random port so tests can exercise routing,
/// middleware and handlers over real HTTP. The database pool is created
/// lazily: routes that never touch the database run without one.
pub struct TestApp {
    /// Server base URL (e.g., "http://127.0.0.1:54321")
    pub address: String,
    /// HTTP client for making requests
    pub client: Client,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = Config::load().expect("Failed to load config");

        let pool = PgPoolOptions::new()
            .connect_lazy(config.database.connection_string().expose_secret())
            .expect("Failed to create lazy pool");

        let storage_root = std::env::temp_dir().join(format!("workshophub-http-{}", Uuid::now_v7()));
        let storage = FileStorageService::new(storage_root.to_str().unwrap());

        let state = AppState::new(pool, storage, config);
        let app = build_router(state);

        // Bind to port 0 so the OS assigns a free port and tests can run in
        // parallel.
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{port}");

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server crashed");
        });

        let client = Client::builder()
            .redirect(Policy::none())
            .build()
            .expect("Failed to build HTTP client");

        Self { address, client }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}
