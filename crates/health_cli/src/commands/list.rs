//! List command - Show the check catalog.

use anyhow::Result;
use clap::Args;

use health_core::HealthConfig;

#[derive(Args)]
pub struct ListArgs {
    /// Only show this category's checks
    #[arg(long)]
    category: Option<String>,
}

pub fn execute(args: ListArgs, config: &HealthConfig) -> Result<()> {
    let suite = config.suite();

    match args.category {
        Some(name) => {
            let index = suite.category_index(&name)?;
            let category = &suite.categories()[index];
            println!("{} ({} checks)", category.name, category.tests.len());
            for (i, test) in category.tests.iter().enumerate() {
                println!("  {:>2}. {}", i + 1, test);
            }
        }
        None => {
            for category in suite.categories() {
                println!("{:<12} {} checks", category.name, category.tests.len());
            }
            println!();
            println!("{} checks in total", suite.total_count());
        }
    }
    Ok(())
}
