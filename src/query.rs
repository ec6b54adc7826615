use url::form_urlencoded::byte_serialize;

use crate::models::QuerySpec;

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

/// Builds the render query for `spec` on top of `base_path`.
///
/// The result has the shape
/// `<base>/?format=json[&from=..][&until=..]&target=<t1>&target=<t2>...`
/// with targets kept in configuration order. Values are form-urlencoded.
pub fn build_path(base_path: &str, spec: &QuerySpec) -> String {
    let mut path = format!("{}/?format=json", base_path.trim_end_matches('/'));

    if let Some(from) = &spec.from {
        path.push_str("&from=");
        path.push_str(&encode(from));
    }
    if let Some(until) = &spec.until {
        path.push_str("&until=");
        path.push_str(&encode(until));
    }
    for target in &spec.targets {
        path.push_str("&target=");
        path.push_str(&encode(target));
    }

    path
}
