// =====================================================================================
// File: src/bin/reset.rs
// Description: CLI entry point for the full reset/reseed operation (§4.K)
// Author: arkSong (arksong2018@gmail.com)
// =====================================================================================

use fraudguard_core::lifecycle::{reset, ResetConfig};
use fraudguard_core::repository::{InMemoryRepository, Repository};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let repo = InMemoryRepository::new();
    match reset(&repo, &ResetConfig::default()) {
        Ok(()) => tracing::info!("reset complete: {} cards seeded", repo.all_cards().len()),
        Err(e) => {
            tracing::error!(error = %e, "reset failed");
            std::process::exit(1);
        }
    }
}
