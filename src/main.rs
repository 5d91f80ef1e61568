use std::sync::Arc;

use anyhow::{Context, ensure};
use tracing_subscriber::EnvFilter;

use recipelens::config::Config;
use recipelens::labels::ClassRegistry;
use recipelens::model::{CnnClassifier, Model};
use recipelens::recipes::RecipeCatalog;
use recipelens::routes::{AppState, router};
use recipelens::store::PredictionStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    std::fs::create_dir_all(&config.uploads_dir).with_context(|| {
        format!("failed to create uploads directory {}", config.uploads_dir.display())
    })?;

    // Startup phase: every resource loads here or the process does not
    // start. There is no degraded-mode serving.
    tracing::info!(path = %config.model_path.display(), "loading model");
    let model = CnnClassifier::load(&config.model_path)?;

    tracing::info!(path = %config.class_names_path.display(), "loading class names");
    let registry = ClassRegistry::load(&config.class_names_path)?;

    tracing::info!(path = %config.recipes_path.display(), "loading recipes");
    let recipes = RecipeCatalog::load(&config.recipes_path)?;

    // The argmax index is resolved positionally against the class list, so
    // the model head and the list must come from the same training run.
    ensure!(
        model.num_classes() == registry.len(),
        "model outputs {} classes but the class list has {} entries",
        model.num_classes(),
        registry.len()
    );
    recipes.warn_unknown_labels(&registry);

    let store = PredictionStore::connect(&config.database_path)
        .await
        .with_context(|| format!("failed to open database {}", config.database_path.display()))?;
    store.init().await.context("failed to initialize predictions table")?;
    tracing::info!(path = %config.database_path.display(), "database initialized");

    let state = Arc::new(AppState {
        registry,
        recipes,
        model: Arc::new(model) as Arc<dyn Model>,
        store,
        uploads_dir: config.uploads_dir.clone(),
    });

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("listening on http://{}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}
