use askama::Template;
use askama_web::WebTemplate;

use crate::interlink::SatelliteInfo;

#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub default_step_seconds: i64,
    pub default_max_range_km: f64,
    pub satellites: Vec<SatelliteInfo>,
}
