use sqlx::PgPool;
use tracing::warn;

use bus_timetable_updater::config::Config;
use bus_timetable_updater::updaters::timetable::TimetableUpdater;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt().init();

    let config = Config::from_env()?;
    let pool = connect(&config).await?;

    let updater = TimetableUpdater::new(&config)?;
    updater.run(&pool).await?;

    pool.close().await;
    Ok(())
}

async fn connect(config: &Config) -> anyhow::Result<PgPool> {
    match PgPool::connect(&config.database_url).await {
        Ok(pool) => Ok(pool),
        Err(error) => {
            let Some(master_url) = config.master_database_url.as_deref() else {
                return Err(error.into());
            };
            warn!(
                "primary database unavailable ({}), falling back to master",
                error
            );
            Ok(PgPool::connect(master_url).await?)
        }
    }
}
