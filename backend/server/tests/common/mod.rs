#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use server::{build_router, config::Config, state::State};
use tempfile::{TempDir, tempdir};
use tokio::net::TcpListener;

pub const ADMIN_TOKEN: &str = "test-admin-token";

pub struct TestServer {
    pub base: String,
    pub state: Arc<State>,
    pub dir: TempDir,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }
}

pub async fn serve(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let address = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    format!("http://{address}")
}

pub async fn spawn_with(configure: impl FnOnce(&mut Config)) -> TestServer {
    let dir = tempdir().expect("tempdir");
    let mut config = Config::local(dir.path().join("data"), dir.path().join("uploads"));
    configure(&mut config);

    let state = State::local(config, catalog::bundled().expect("bundled catalog"));
    let base = serve(build_router(state.clone())).await;

    TestServer { base, state, dir }
}

pub async fn spawn() -> TestServer {
    spawn_with(|config| config.admin_token = Some(ADMIN_TOKEN.to_string())).await
}

pub fn no_redirects() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client")
}
