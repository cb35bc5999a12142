mod routes;

use std::sync::Arc;

use anyhow::Result;
use axum::extract::Path;
use sunrise_axum::{axum, AxumApp};
use sunrise_core::{MemoryStore, SunriseApp};

/// Build the demo app on top of a store seeded from JSON.
pub fn build(seed: &str) -> Result<AxumApp> {
    let store = Arc::new(MemoryStore::from_json(seed)?);
    let app = SunriseApp::new(store.clone(), store);
    app.set("http.host", "127.0.0.1");
    app.set("http.port", "3040");
    app.load_env("SUNRISE");

    let ax = axum(app);
    let app = Arc::clone(&ax.app);

    let ax = ax
        .service("/", routes::current_site)
        .service("/network/{*path}", routes::network_link)
        .service("/users/{id}/networks", move |Path(id): Path<u64>| {
            let app = Arc::clone(&app);
            async move { routes::user_networks(app, id).await }
        })
        .service("/health", || async { "ok" });

    Ok(ax)
}
