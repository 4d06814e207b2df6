use crate::error::Result;
use reqwest::Client;
use std::time::Duration;

pub const USER_AGENT: &str = "ScamShield/0.3 (https://github.com/trapdoorsec/scamshield)";

/// Builds the HTTP client shared by every collector and the probe.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    let timeout_secs = timeout_secs.max(1);
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
        .pool_max_idle_per_host(8)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()?;

    Ok(client)
}
