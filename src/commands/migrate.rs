//! Migrate command implementation

use crate::error::Result;
use crate::staging::StagingStore;
use crate::warehouse::{MigrationStats, Warehouse};

/// Migrate all staged documents into the warehouse tables
pub async fn cmd_migrate(staging: &StagingStore, warehouse: &Warehouse) -> Result<MigrationStats> {
    warehouse.migrate(staging).await
}

/// Human-readable migration summary
pub fn print_migration_stats(stats: &MigrationStats) {
    println!("\n✓ Migration complete");
    println!("  Channels:  {}", stats.channels);
    println!("  Playlists: {}", stats.playlists);
    println!("  Videos:    {}", stats.videos);
    println!("  Comments:  {}", stats.comments);
}
