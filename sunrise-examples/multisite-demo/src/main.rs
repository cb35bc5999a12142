use anyhow::{Context, Result};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let seed_path = std::env::var("SUNRISE__STORE__SEED").unwrap_or_else(|_| "sites.json".to_string());
    let seed = tokio::fs::read_to_string(&seed_path)
        .await
        .with_context(|| format!("reading site seed {seed_path}"))?;

    let ax = multisite_demo::build(&seed)?;

    let host = ax
        .app
        .get("http.host")
        .unwrap_or_else(|| "127.0.0.1".to_string());

    let port = ax
        .app
        .get("http.port")
        .unwrap_or_else(|| "3040".to_string());

    let addr = format!("{host}:{port}");

    println!("[sunrise] listening on http://{addr}");

    ax.listen(addr).await?;

    Ok(())
}
