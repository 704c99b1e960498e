use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One resource as returned by the API: an opaque JSON object
pub type Record = Map<String, Value>;

/// Envelope of every list endpoint
///
/// `meta` carries paging information that is not interpreted; `results`
/// keeps the server's order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourcePage {
    #[serde(default)]
    pub meta: Value,
    pub results: Vec<Record>,
}
