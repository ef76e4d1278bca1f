use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use super::API_PREFIX;

fn base_join(base: &str, path: &str) -> String {
    let b = base.trim_end_matches('/');
    let p = path.trim_start_matches('/');
    format!("{}/{}", b, p)
}

fn enc(s: &str) -> String {
    utf8_percent_encode(s, NON_ALPHANUMERIC).to_string()
}

pub fn auth_login(base: &str) -> String {
    base_join(base, &format!("{}/auth/login", API_PREFIX))
}
pub fn my_tasks(base: &str) -> String {
    base_join(base, &format!("{}/tasks", API_PREFIX))
}
pub fn schedule(base: &str, employee_id: Option<i32>) -> String {
    let url = base_join(base, &format!("{}/schedule", API_PREFIX));
    match employee_id {
        Some(id) => format!("{}?employee_id={}", url, enc(&id.to_string())),
        None => url,
    }
}
