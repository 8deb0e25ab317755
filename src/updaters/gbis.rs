use std::collections::HashSet;

use chrono::NaiveTime;
use futures::future::join_all;
use sqlx::{PgPool, QueryBuilder};
use tracing::{info, warn};

use crate::{
    config::Config,
    models::gbis::{
        GbisRouteInfo, GbisStation, RouteInfoResponse, RouteSearchResponse, StationSearchResponse,
    },
    updaters::{parse_departure_time, timetable::REQUEST_TIMEOUT, FetchError},
};

pub const STOP_KEYWORDS: [&str; 16] = [
    "경기테크노파크",
    "한양대",
    "한국생산기술연구원",
    "성안길입구",
    "신안산대학교",
    "새솔고",
    "상록수역",
    "수원역",
    "강남역우리은행",
    "본오동",
    "한라비발디1차",
    "푸르지오6차후문",
    "선부동차고지",
    "안산역",
    "경인합섬앞",
    "오목천차고지",
];

pub const ROUTE_KEYWORDS: [&str; 8] = ["10-1", "62", "3100", "3101", "3102", "110", "707", "909"];

// Search results cover the whole province; only this region is seeded.
const SEED_REGION: &str = "안산";

/// One-time reference-data seeding from the GBIS open API. Invoked by
/// bootstrap and test tooling, not by the steady-state sync job.
#[derive(Debug)]
pub struct GbisSeeder {
    pub client: reqwest::Client,
    pub base_url: String,
    pub service_key: String,
}

impl GbisSeeder {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()?,
            base_url: config.gbis_base_url.clone(),
            service_key: config.gbis_service_key.clone(),
        })
    }

    pub async fn run(&self, db: &PgPool) -> Result<(), anyhow::Error> {
        self.insert_bus_stops(db).await?;
        self.insert_bus_routes(db).await?;
        Ok(())
    }

    pub async fn insert_bus_stops(&self, db: &PgPool) -> Result<(), anyhow::Error> {
        info!("getting bus stops for {} keywords", STOP_KEYWORDS.len());

        let jobs = STOP_KEYWORDS.map(|keyword| self.fetch_bus_stops(keyword));
        let mut stops: Vec<GbisStation> = Vec::new();
        for (keyword, result) in STOP_KEYWORDS.into_iter().zip(join_all(jobs).await) {
            match result {
                Ok(found) => {
                    if found.is_empty() {
                        warn!("no bus stops found for keyword {}", keyword);
                    }
                    stops.extend(found);
                }
                Err(error) if error.is_transient() => {
                    warn!("skipping bus stop keyword {}: {}", keyword, error);
                }
                Err(error) => return Err(error.into()),
            }
        }

        let mut seen = HashSet::new();
        stops.retain(|stop| seen.insert(stop.station_id));

        if stops.is_empty() {
            warn!("no bus stops to insert");
            return Ok(());
        }

        let insert_result = QueryBuilder::new(
            "INSERT INTO bus_stop (stop_id, stop_name, district_code, mobile_number, region_name, latitude, longitude)",
        )
        .push_values(&stops, |mut b, stop| {
            b.push_bind(stop.station_id)
                .push_bind(&stop.station_name)
                .push_bind(stop.district_code)
                .push_bind(stop.mobile_number.trim())
                .push_bind(&stop.region_name)
                .push_bind(stop.x)
                .push_bind(stop.y);
        })
        .push(
            " ON CONFLICT (stop_id) DO UPDATE SET
                stop_name=EXCLUDED.stop_name,
                district_code=EXCLUDED.district_code,
                mobile_number=EXCLUDED.mobile_number,
                region_name=EXCLUDED.region_name,
                latitude=EXCLUDED.latitude,
                longitude=EXCLUDED.longitude",
        )
        .build()
        .execute(db)
        .await?;

        info!("inserted/updated {} bus stops", insert_result.rows_affected());
        Ok(())
    }

    pub async fn insert_bus_routes(&self, db: &PgPool) -> Result<(), anyhow::Error> {
        info!("getting bus routes for {} keywords", ROUTE_KEYWORDS.len());

        let search_jobs = ROUTE_KEYWORDS.map(|keyword| self.search_bus_routes(keyword));
        let mut route_ids: Vec<i32> = Vec::new();
        for (keyword, result) in ROUTE_KEYWORDS.into_iter().zip(join_all(search_jobs).await) {
            match result {
                Ok(found) => route_ids.extend(found),
                Err(error) if error.is_transient() => {
                    warn!("skipping bus route keyword {}: {}", keyword, error);
                }
                Err(error) => return Err(error.into()),
            }
        }

        route_ids.sort_unstable();
        route_ids.dedup();

        let info_jobs = route_ids
            .iter()
            .map(|route_id| self.fetch_bus_route(*route_id));
        let mut routes: Vec<GbisRouteInfo> = Vec::new();
        for (route_id, result) in route_ids.iter().zip(join_all(info_jobs).await) {
            match result {
                Ok(Some(route)) => routes.push(route),
                Ok(None) => warn!("no route information for route id {}", route_id),
                Err(error) if error.is_transient() => {
                    warn!("skipping route id {}: {}", route_id, error);
                }
                Err(error) => return Err(error.into()),
            }
        }

        let mut rows = Vec::with_capacity(routes.len());
        for route in routes {
            match RouteRow::try_from(route) {
                Ok(row) => rows.push(row),
                Err(error) => warn!("skipping route: {}", error),
            }
        }

        if rows.is_empty() {
            warn!("no bus routes to insert");
            return Ok(());
        }

        let insert_result = QueryBuilder::new(
            "INSERT INTO bus_route (route_id, company_id, company_name, company_telephone, district_code, \
             up_first_time, up_last_time, down_first_time, down_last_time, \
             start_stop_id, end_stop_id, route_name, route_type_code, route_type_name)",
        )
        .push_values(&rows, |mut b, row| {
            b.push_bind(row.route.route_id)
                .push_bind(row.route.company_id)
                .push_bind(&row.route.company_name)
                .push_bind(&row.route.company_telephone)
                .push_bind(row.route.district_code)
                .push_bind(row.up_first_time)
                .push_bind(row.up_last_time)
                .push_bind(row.down_first_time)
                .push_bind(row.down_last_time)
                .push_bind(row.route.start_stop_id)
                .push_bind(row.route.end_stop_id)
                .push_bind(&row.route.route_name)
                .push_bind(&row.route.route_type_code)
                .push_bind(&row.route.route_type_name);
        })
        .push(
            " ON CONFLICT (route_id) DO UPDATE SET
                company_id=EXCLUDED.company_id,
                company_name=EXCLUDED.company_name,
                company_telephone=EXCLUDED.company_telephone,
                district_code=EXCLUDED.district_code,
                up_first_time=EXCLUDED.up_first_time,
                up_last_time=EXCLUDED.up_last_time,
                down_first_time=EXCLUDED.down_first_time,
                down_last_time=EXCLUDED.down_last_time,
                start_stop_id=EXCLUDED.start_stop_id,
                end_stop_id=EXCLUDED.end_stop_id,
                route_name=EXCLUDED.route_name,
                route_type_code=EXCLUDED.route_type_code,
                route_type_name=EXCLUDED.route_type_name",
        )
        .build()
        .execute(db)
        .await?;

        info!(
            "inserted/updated {} bus routes",
            insert_result.rows_affected()
        );
        Ok(())
    }

    pub async fn fetch_bus_stops(&self, keyword: &str) -> Result<Vec<GbisStation>, FetchError> {
        let url = format!("{}/busstationservice", self.base_url);
        let body = self.fetch_text(&url, &[("keyword", keyword)]).await?;
        let parsed: StationSearchResponse = serde_xml_rs::from_str(&body)?;

        Ok(parsed.body.map(|body| body.stations).unwrap_or_default())
    }

    pub async fn search_bus_routes(&self, keyword: &str) -> Result<Vec<i32>, FetchError> {
        let url = format!("{}/busrouteservice", self.base_url);
        let body = self.fetch_text(&url, &[("keyword", keyword)]).await?;
        let parsed: RouteSearchResponse = serde_xml_rs::from_str(&body)?;

        Ok(parsed
            .body
            .map(|body| {
                body.routes
                    .into_iter()
                    .filter(|route| route.region_name.contains(SEED_REGION))
                    .map(|route| route.route_id)
                    .collect()
            })
            .unwrap_or_default())
    }

    pub async fn fetch_bus_route(&self, route_id: i32) -> Result<Option<GbisRouteInfo>, FetchError> {
        let url = format!("{}/busrouteservice/info", self.base_url);
        let route_id = route_id.to_string();
        let body = self.fetch_text(&url, &[("routeId", route_id.as_str())]).await?;
        let parsed: RouteInfoResponse = serde_xml_rs::from_str(&body)?;

        Ok(parsed.body.and_then(|body| body.route))
    }

    async fn fetch_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .query(&[("serviceKey", self.service_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(FetchError::from_request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus(status));
        }

        response.text().await.map_err(FetchError::from_request)
    }
}

struct RouteRow {
    route: GbisRouteInfo,
    up_first_time: NaiveTime,
    up_last_time: NaiveTime,
    down_first_time: NaiveTime,
    down_last_time: NaiveTime,
}

impl TryFrom<GbisRouteInfo> for RouteRow {
    type Error = FetchError;

    fn try_from(route: GbisRouteInfo) -> Result<Self, Self::Error> {
        Ok(Self {
            up_first_time: parse_departure_time(&route.up_first_time)?,
            up_last_time: parse_departure_time(&route.up_last_time)?,
            down_first_time: parse_departure_time(&route.down_first_time)?,
            down_last_time: parse_departure_time(&route.down_last_time)?,
            route,
        })
    }
}
