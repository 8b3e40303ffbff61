use anyhow::Context;
use bookstore_app::modules;
use bookstore_kernel::{settings::Settings, Database, InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookstore settings")?;
    bookstore_telemetry::init(&settings.telemetry)?;

    let url = settings.database.require_url()?;
    let db = Database::connect(url, settings.database.max_connections)
        .await
        .with_context(|| "failed to connect to the document store")?;

    tracing::info!(
        env = ?settings.environment,
        backend = db.backend(),
        "bookstore bootstrap starting"
    );

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &db);

    let applied = db
        .migrate(&registry.collect_migrations())
        .await
        .with_context(|| "failed to migrate the document store")?;
    tracing::info!(applied, "migrations complete");

    let ctx = InitCtx {
        settings: &settings,
        db: &db,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!("bookstore bootstrap complete");
    let served = bookstore_http::start_server(&registry, &settings).await;

    registry.stop_modules().await?;
    db.close().await;
    served
}
