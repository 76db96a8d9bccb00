use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use repo_recommender::{
    api::{create_router, AppState},
    config::Config,
    db::JsonStore,
    error::AppError,
    services::{GithubSource, LexiconTagger, PosTagger, Recommender},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "repo_recommender=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let settings = config.recommender_settings()?;

    let tagger: Arc<dyn PosTagger> = match &config.pos_lexicon_path {
        Some(path) => Arc::new(
            LexiconTagger::from_path(path)
                .with_context(|| format!("Failed to load part-of-speech lexicon {}", path))?,
        ),
        None => {
            tracing::warn!("No part-of-speech lexicon configured; every README word is tagged NN");
            Arc::new(LexiconTagger::default())
        }
    };

    let store = JsonStore::new(&config.data_dir);
    let repositories = match store.load_repositories().await {
        Ok(repositories) => repositories,
        Err(AppError::NotFound(message)) => {
            tracing::warn!(
                "{}; starting with an empty corpus. POST /api/v1/repositories/extract builds one for the next start",
                message
            );
            Vec::new()
        }
        Err(e) => return Err(e).context("Failed to load repository dataset"),
    };

    let recommender = tokio::task::spawn_blocking(move || Recommender::new(settings, tagger, &repositories))
        .await
        .context("Corpus preparation panicked")?;

    let source = GithubSource::new(&config.github_api_url, config.github_token.clone())?;
    let state = AppState::new(recommender, store, Arc::new(source));
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
