//! Display the contract account for an origin

use anyhow::Result;
use colored::Colorize;

use crate::commands::local_image;
use crate::config::Paths;

pub fn run(paths: &Paths, origin: &str, recovery: &[String]) -> Result<()> {
    let image = local_image(paths, origin, recovery)?;

    println!();
    println!("{}", "Delegated Contract Account".yellow().bold());
    println!();
    println!("{}", image.address());
    println!();
    println!("{}:", "Bound parameters".dimmed());
    println!("  Origin: {}", image.origin());
    for (i, owner) in image.owners().keys().iter().enumerate() {
        let role = if i == 0 { "owner" } else { "recovery" };
        println!("  {:<9} {}", format!("{}:", role), owner);
    }
    println!();
    println!("{}:", "Program image".dimmed());
    println!("  {}", hex::encode(image.as_bytes()));
    println!();
    println!(
        "{}",
        "Fund this address, then 'delegate authenticate' to open a session.".dimmed()
    );

    Ok(())
}
