use crate::output::Output;
use color_eyre::Result;
use nowwatching_config::{CredentialStore, PathManager};

pub async fn run_clear(credentials: bool, output: &Output) -> Result<()> {
    if !credentials {
        output.warn("No clear option specified. Use --credentials");
        output.println("\nExample: nowwatching clear --credentials");
        return Ok(());
    }

    clear_credentials(&PathManager::default(), output)
}

fn clear_credentials(path_manager: &PathManager, output: &Output) -> Result<()> {
    let credentials_file = path_manager.credentials_file();

    if !credentials_file.exists() {
        output.info("No credentials file found to clear");
        return Ok(());
    }

    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;
    if !cred_store.clear_trakt_tokens() {
        output.info("No Trakt tokens stored");
        return Ok(());
    }
    cred_store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials to {}: {}", credentials_file.display(), e))?;

    output.success(format!("Cleared Trakt tokens: {}", credentials_file.display()));
    Ok(())
}
