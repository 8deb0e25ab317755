use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct StationSearchResponse {
    #[serde(alias = "msgBody", default)]
    pub body: Option<StationSearchBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StationSearchBody {
    #[serde(alias = "busStationList", default)]
    pub stations: Vec<GbisStation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GbisStation {
    #[serde(alias = "stationId")]
    pub station_id: i32,
    #[serde(alias = "stationName")]
    pub station_name: String,
    #[serde(alias = "districtCd")]
    pub district_code: i32,
    #[serde(alias = "mobileNo")]
    pub mobile_number: String,
    #[serde(alias = "regionName")]
    pub region_name: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Deserialize)]
pub struct RouteSearchResponse {
    #[serde(alias = "msgBody", default)]
    pub body: Option<RouteSearchBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RouteSearchBody {
    #[serde(alias = "busRouteList", default)]
    pub routes: Vec<GbisRouteSummary>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GbisRouteSummary {
    #[serde(alias = "routeId")]
    pub route_id: i32,
    #[serde(alias = "routeName")]
    pub route_name: String,
    #[serde(alias = "regionName")]
    pub region_name: String,
}

#[derive(Debug, Deserialize)]
pub struct RouteInfoResponse {
    #[serde(alias = "msgBody", default)]
    pub body: Option<RouteInfoBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RouteInfoBody {
    #[serde(alias = "busRouteInfoItem", default)]
    pub route: Option<GbisRouteInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GbisRouteInfo {
    #[serde(alias = "routeId")]
    pub route_id: i32,
    #[serde(alias = "routeName")]
    pub route_name: String,
    #[serde(alias = "companyId")]
    pub company_id: i32,
    #[serde(alias = "companyName")]
    pub company_name: String,
    #[serde(alias = "companyTel")]
    pub company_telephone: String,
    #[serde(alias = "districtCd")]
    pub district_code: i32,
    #[serde(alias = "upFirstTime")]
    pub up_first_time: String,
    #[serde(alias = "upLastTime")]
    pub up_last_time: String,
    #[serde(alias = "downFirstTime")]
    pub down_first_time: String,
    #[serde(alias = "downLastTime")]
    pub down_last_time: String,
    #[serde(alias = "startStationId")]
    pub start_stop_id: i32,
    #[serde(alias = "endStationId")]
    pub end_stop_id: i32,
    #[serde(alias = "routeTypeCd")]
    pub route_type_code: String,
    #[serde(alias = "routeTypeName")]
    pub route_type_name: String,
}
