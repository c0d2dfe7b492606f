use serde_json::json;

use crate::auth::JwtKeys;
use crate::cli::OutputFormat;
use crate::config::AppConfig;

pub fn handle(
    config: &AppConfig,
    user_id: i64,
    hours: Option<u64>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let keys = JwtKeys::from_config(&config.security)
        .map_err(|e| anyhow::anyhow!("{} (set JWT_SECRET_KEY)", e))?;
    let hours = hours.unwrap_or(config.security.jwt_expiry_hours);
    let token = keys.issue_with_expiry(user_id, hours)?;

    match output_format {
        OutputFormat::Json => println!(
            "{}",
            json!({ "token": token, "user_id": user_id, "expires_in_hours": hours })
        ),
        OutputFormat::Text => println!("{}", token),
    }

    Ok(())
}
