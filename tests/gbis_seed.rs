use std::time::Duration;

use sqlx::PgPool;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bus_timetable_updater::updaters::gbis::GbisSeeder;
use bus_timetable_updater::updaters::FetchError;

fn seeder(base_url: String) -> GbisSeeder {
    GbisSeeder {
        client: reqwest::Client::builder()
            .timeout(Duration::from_millis(500))
            .build()
            .unwrap(),
        base_url,
        service_key: "1234567890".to_string(),
    }
}

const STATION_SEARCH: &str = r#"
    <response>
        <msgBody>
            <busStationList>
                <districtCd>3</districtCd>
                <mobileNo>17135</mobileNo>
                <regionName>안산</regionName>
                <stationId>216000379</stationId>
                <stationName>안산역</stationName>
                <x>126.7700</x>
                <y>37.3180</y>
            </busStationList>
        </msgBody>
    </response>
"#;

const ROUTE_SEARCH: &str = r#"
    <response>
        <msgBody>
            <busRouteList>
                <regionName>안산</regionName>
                <routeId>216000026</routeId>
                <routeName>10-1</routeName>
            </busRouteList>
            <busRouteList>
                <regionName>수원</regionName>
                <routeId>200000103</routeId>
                <routeName>10-1</routeName>
            </busRouteList>
        </msgBody>
    </response>
"#;

const ROUTE_INFO: &str = r#"
    <response>
        <msgBody>
            <busRouteInfoItem>
                <companyId>7</companyId>
                <companyName>경원여객</companyName>
                <companyTel>031-492-4954</companyTel>
                <districtCd>2</districtCd>
                <upFirstTime>05:40</upFirstTime>
                <upLastTime>22:30</upLastTime>
                <downFirstTime>06:40</downFirstTime>
                <downLastTime>23:40</downLastTime>
                <startStationId>216000379</startStationId>
                <endStationId>216000152</endStationId>
                <routeId>216000026</routeId>
                <routeName>10-1</routeName>
                <routeTypeCd>13</routeTypeCd>
                <routeTypeName>일반형시내버스</routeTypeName>
            </busRouteInfoItem>
        </msgBody>
    </response>
"#;

#[tokio::test]
async fn station_search_returns_parsed_stops() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busstationservice"))
        .and(query_param("keyword", "안산역"))
        .respond_with(ResponseTemplate::new(200).set_body_string(STATION_SEARCH))
        .mount(&server)
        .await;

    let stops = seeder(server.uri()).fetch_bus_stops("안산역").await.unwrap();

    assert_eq!(stops.len(), 1);
    assert_eq!(stops[0].station_id, 216000379);
    assert_eq!(stops[0].station_name, "안산역");
}

#[tokio::test]
async fn route_search_keeps_only_the_seeded_region() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busrouteservice"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ROUTE_SEARCH))
        .mount(&server)
        .await;

    let route_ids = seeder(server.uri()).search_bus_routes("10-1").await.unwrap();

    assert_eq!(route_ids, vec![216000026]);
}

#[tokio::test]
async fn route_info_parses_the_single_item() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busrouteservice/info"))
        .and(query_param("routeId", "216000026"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ROUTE_INFO))
        .mount(&server)
        .await;

    let route = seeder(server.uri())
        .fetch_bus_route(216000026)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(route.route_name, "10-1");
    assert_eq!(route.company_name, "경원여객");
    assert_eq!(route.end_stop_id, 216000152);
}

#[tokio::test]
async fn bad_status_is_transient() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busstationservice"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let error = seeder(server.uri()).fetch_bus_stops("안산역").await.unwrap_err();

    assert!(matches!(error, FetchError::BadStatus(_)));
    assert!(error.is_transient());
}

#[sqlx::test]
#[ignore = "needs a postgres instance via DATABASE_URL"]
async fn seeding_stops_twice_upserts(pool: PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busstationservice"))
        .respond_with(ResponseTemplate::new(200).set_body_string(STATION_SEARCH))
        .mount(&server)
        .await;

    let seeder = seeder(server.uri());
    seeder.insert_bus_stops(&pool).await.unwrap();
    seeder.insert_bus_stops(&pool).await.unwrap();

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM bus_stop")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 1);
}

#[sqlx::test]
#[ignore = "needs a postgres instance via DATABASE_URL"]
async fn seeding_routes_inserts_region_matches(pool: PgPool) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busrouteservice"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ROUTE_SEARCH))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/busrouteservice/info"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ROUTE_INFO))
        .mount(&server)
        .await;

    seeder(server.uri()).insert_bus_routes(&pool).await.unwrap();

    let names: Vec<(i32, String)> =
        sqlx::query_as("SELECT route_id, route_name FROM bus_route ORDER BY route_id")
            .fetch_all(&pool)
            .await
            .unwrap();
    assert_eq!(names, vec![(216000026, "10-1".to_string())]);
}
