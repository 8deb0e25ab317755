use std::{collections::HashSet, time::Duration};

use futures::future::join_all;
use serde::Deserialize;
use sqlx::{PgPool, QueryBuilder};
use tracing::{error, info, warn};

use crate::{
    config::Config,
    models::database::{BusRoute, BusTimetable, Weekday},
    updaters::{parse_departure_time, FetchError},
};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug)]
pub struct TimetableUpdater {
    pub client: reqwest::Client,
    pub base_url: String,
    pub excluded_routes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TimetableRow {
    route_id: i32,
    start_stop_id: i32,
    departure_time: String,
}

impl TimetableUpdater {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()?,
            base_url: config.timetable_base_url.clone(),
            excluded_routes: config.excluded_routes.clone(),
        })
    }

    pub async fn run(&self, db: &PgPool) -> Result<(), anyhow::Error> {
        let routes = self.routes_to_sync(db).await?;
        info!("syncing timetables for {} routes", routes.len());

        let jobs = routes.iter().map(|route| self.sync_route(db, route));
        let results = join_all(jobs).await;

        let mut failed = 0;
        for (route, result) in routes.iter().zip(results) {
            if let Err(error) = result {
                failed += 1;
                error!(
                    "timetable sync failed for route {}: {:#}",
                    route.route_name, error
                );
            }
        }
        if failed > 0 {
            warn!("{} of {} routes failed to sync", failed, routes.len());
        }

        Ok(())
    }

    pub async fn routes_to_sync(&self, db: &PgPool) -> Result<Vec<BusRoute>, sqlx::Error> {
        let routes: Vec<BusRoute> =
            sqlx::query_as("SELECT route_name, route_id FROM bus_route ORDER BY route_id")
                .fetch_all(db)
                .await?;

        Ok(routes
            .into_iter()
            .filter(|route| !self.is_excluded(&route.route_name))
            .collect())
    }

    pub fn is_excluded(&self, route_name: &str) -> bool {
        self.excluded_routes.iter().any(|name| name == route_name)
    }

    pub async fn sync_route(&self, db: &PgPool, route: &BusRoute) -> Result<(), anyhow::Error> {
        let entries = self.fetch_route(route).await?;
        self.replace_timetable(db, route.route_id, &entries).await?;
        info!(
            "stored {} timetable rows for route {}",
            entries.len(),
            route.route_name
        );
        Ok(())
    }

    pub async fn fetch_route(&self, route: &BusRoute) -> Result<Vec<BusTimetable>, FetchError> {
        let jobs = Weekday::ALL.map(|weekday| self.fetch_weekday(&route.route_name, weekday));
        let mut entries: Vec<BusTimetable> = Vec::new();

        for (weekday, result) in Weekday::ALL.into_iter().zip(join_all(jobs).await) {
            match result {
                Ok(rows) => entries.extend(rows),
                Err(error) if error.is_transient() => {
                    warn!(
                        "skipping {} timetable for route {} ({}): {}",
                        weekday,
                        route.route_name,
                        self.timetable_url(&route.route_name, weekday),
                        error
                    );
                }
                Err(error) => return Err(error),
            }
        }

        // The upstream CSV carries its own route_id column; stored rows keep
        // it, but a disagreement with the catalog is worth a loud note.
        if let Some(entry) = entries.iter().find(|entry| entry.route_id != route.route_id) {
            warn!(
                "timetable rows for route {} report route id {} instead of {}",
                route.route_name, entry.route_id, route.route_id
            );
        }

        let mut seen = HashSet::new();
        entries.retain(|entry| seen.insert(entry.key()));

        Ok(entries)
    }

    async fn fetch_weekday(
        &self,
        route_name: &str,
        weekday: Weekday,
    ) -> Result<Vec<BusTimetable>, FetchError> {
        let url = self.timetable_url(route_name, weekday);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(FetchError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus(status));
        }

        let body = response.text().await.map_err(FetchError::from_request)?;
        parse_timetable_csv(&body, weekday)
    }

    pub fn timetable_url(&self, route_name: &str, weekday: Weekday) -> String {
        format!("{}/{}/{}/timetable.csv", self.base_url, route_name, weekday)
    }

    /// Replaces the stored timetable for one route in a single transaction.
    /// The delete always runs, even for an empty candidate list.
    pub async fn replace_timetable(
        &self,
        db: &PgPool,
        route_id: i32,
        entries: &[BusTimetable],
    ) -> Result<(), sqlx::Error> {
        let mut tx = db.begin().await?;

        sqlx::query("DELETE FROM bus_timetable WHERE route_id = $1")
            .bind(route_id)
            .execute(&mut *tx)
            .await?;

        if !entries.is_empty() {
            QueryBuilder::new(
                "INSERT INTO bus_timetable (route_id, start_stop_id, departure_time, weekday)",
            )
            .push_values(entries, |mut b, entry| {
                b.push_bind(entry.route_id)
                    .push_bind(entry.start_stop_id)
                    .push_bind(entry.departure_time)
                    .push_bind(entry.weekday.as_str());
            })
            .push(" ON CONFLICT DO NOTHING")
            .build()
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

pub fn parse_timetable_csv(body: &str, weekday: Weekday) -> Result<Vec<BusTimetable>, FetchError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut entries = Vec::new();
    for row in reader.deserialize::<TimetableRow>() {
        let row = row?;
        let departure_time = parse_departure_time(&row.departure_time)?;

        entries.push(BusTimetable {
            route_id: row.route_id,
            start_stop_id: row.start_stop_id,
            departure_time,
            weekday,
        });
    }

    Ok(entries)
}
