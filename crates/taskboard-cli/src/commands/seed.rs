//! Seed command for CLI.

use taskboard_core::seed;
use taskboard_core::storage::BoardDb;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let db = BoardDb::open()?;
    if seed::seed_database(&db)? {
        println!("Seeded sample project");
    } else {
        println!("Board already has data; nothing to do");
    }
    Ok(())
}
