use std::io::{self, Write};
use std::path::PathBuf;

use staffplan_shared::api;
use staffplan_shared::jwt;

use crate::AppError;
use crate::config::{ClientConfig, load_config, normalize_server_url, resolve_config_path, save_config};

pub async fn login(
    server_arg: Option<String>,
    email_arg: Option<String>,
    cfg_path_opt: Option<PathBuf>,
) -> Result<(), AppError> {
    let path = resolve_config_path(cfg_path_opt)?;
    let existing = load_config(&path).ok();

    // Server url: CLI arg > config if present > prompt
    let server_url = match (server_arg, &existing) {
        (Some(s), _) => normalize_server_url(&s),
        (None, Some(cfg)) => cfg.base_url(),
        (None, None) => normalize_server_url(&prompt("Server URL (e.g., 127.0.0.1:5000): ")?),
    };

    let email = match email_arg {
        Some(e) => e,
        None => prompt("Email: ")?,
    };
    let password = rpassword::prompt_password("Password: ")
        .map_err(|e| AppError::Io(std::io::Error::other(e.to_string())))?;

    let body = api::rest::login(&server_url, &api::LoginReq { email, password })
        .await
        .map_err(|e| AppError::Http(format!("login failed: {e}")))?;

    // Sanity-check the token shape before persisting it.
    let claims = jwt::decode_unverified(&body.token)
        .map_err(|e| AppError::Http(format!("server returned an unusable token: {e}")))?;

    let mut cfg = existing.unwrap_or_else(|| ClientConfig::new(&server_url));
    cfg.server_url = server_url;
    cfg.token = Some(body.token);
    save_config(&path, &cfg)?;

    println!(
        "Logged in as {} ({}, {}); token expires at {}. Config written to {}",
        body.user.name,
        body.user.email,
        claims.role,
        chrono::DateTime::from_timestamp(claims.exp, 0)
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| claims.exp.to_string()),
        path.display()
    );
    Ok(())
}

fn prompt(msg: &str) -> Result<String, AppError> {
    print!("{}", msg);
    io::stdout().flush().ok();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).map_err(AppError::Io)?;
    Ok(buf.trim().to_string())
}
