mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use log::{info, warn};
use webbot::{BrowserOptions, LearningCache, compile, engine, parser, synthesize};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan { url, task } => {
            let plan = parser::parse(&task, &url);
            println!("Plan ({} actions):", plan.len());
            for (i, action) in plan.iter().enumerate() {
                println!("{:>3}. {action:?}", i + 1);
            }
            let program = synthesize(&plan);
            println!("\nProgram:\n{}", program.listing());
        }

        Commands::Show { task } => {
            let cache = LearningCache::open(&cli.db, &cli.programs_dir)?;
            match cache.lookup(&task)? {
                Some(record) => {
                    println!("Saved program: {}", record.program_location);
                    println!("Last used:     {}", record.last_used);
                    println!("Successes:     {}", record.success_count);
                    println!("Failures:      {}", record.fail_count);
                }
                None => println!("No saved program for this task."),
            }
        }

        Commands::Run {
            url,
            task,
            headless,
            reuse,
            save_failed,
            webdriver,
        } => {
            let options = BrowserOptions::default()
                .headless(headless)
                .webdriver_url(&webdriver);

            // A broken cache degrades to a cacheless run, never a failed one.
            let cache = match LearningCache::open(&cli.db, &cli.programs_dir) {
                Ok(cache) => Some(cache),
                Err(e) => {
                    warn!("cache unavailable, continuing without it: {e}");
                    None
                }
            };

            let cached = cache.as_ref().and_then(|c| match c.lookup(&task) {
                Ok(hit) => hit,
                Err(e) => {
                    warn!("cache lookup failed: {e}");
                    None
                }
            });

            if let Some(record) = &cached {
                info!(
                    "found saved program {} (last used {}, {} successes, {} failures)",
                    record.program_location,
                    record.last_used,
                    record.success_count,
                    record.fail_count
                );
            }

            let success = if let (true, Some(record)) = (reuse, &cached) {
                info!("reusing saved program");
                engine::run_program_text(&record.program_text, options).await
            } else {
                if reuse {
                    info!("no saved program for this task; regenerating");
                } else if cached.is_some() {
                    info!("regenerating (pass --reuse to run the saved program)");
                }

                let program = compile(&task, &url);
                info!("synthesized program:\n{}", program.listing());

                let success = engine::run_program(&program, options).await;
                if success || save_failed {
                    if let Some(cache) = &cache {
                        match program.to_json() {
                            Ok(text) => {
                                if let Err(e) = cache.upsert(&task, &text) {
                                    warn!("saving program failed: {e}");
                                }
                            }
                            Err(e) => warn!("serializing program failed: {e}"),
                        }
                    }
                }
                success
            };

            if let Some(cache) = &cache {
                if let Err(e) = cache.record_outcome(&task, success) {
                    warn!("recording outcome failed: {e}");
                }
            }

            println!("{}", if success { "Success" } else { "Failed" });
        }
    }

    Ok(())
}
