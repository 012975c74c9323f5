//! The `admissions init` command.

use anyhow::Result;

use admissions_store::config::starter_config;

pub fn execute() -> Result<()> {
    let path = std::path::Path::new("admissions.toml");
    if path.exists() {
        println!("admissions.toml already exists, skipping.");
        return Ok(());
    }

    std::fs::write(path, starter_config())?;
    println!("Created admissions.toml");

    println!("\nNext steps:");
    println!("  1. Export SUPABASE_URL and SUPABASE_ANON_KEY (or edit admissions.toml)");
    println!("  2. Run: admissions check");
    println!("  3. Run: admissions enroll");

    Ok(())
}
