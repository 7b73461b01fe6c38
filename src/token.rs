//! CLI entry point for the `token` subcommand: signs a bearer token with the
//! local store's secret so operators can exercise the authed endpoints.

use std::path::Path;

use anyhow::{Context, Result, bail};

pub fn run(user_id: &str, data_dir: &Path) -> Result<()> {
    if user_id.is_empty() {
        bail!("user id must not be empty");
    }

    let db_path = data_dir.join("wheelhouse.db");
    let (_db, secret) = crate::store::open(&db_path)
        .with_context(|| format!("opening database at {}", db_path.display()))?;

    let token = crate::api::auth::create_jwt(user_id, &secret)?;
    println!("{token}");
    Ok(())
}
