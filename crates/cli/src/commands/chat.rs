//! `motiva chat` — Interactive or single-message counseling chat.

use std::io::{BufRead, Write};

use motiva_config::AppConfig;

pub async fn run(
    message: Option<String>,
    identity: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    MOTIVA_API_KEY = 'sk-...'");
        eprintln!("    OPENAI_API_KEY = 'sk-...'");
        eprintln!();
        eprintln!("  Or add api_key to your config file:");
        eprintln!(
            "    {}",
            AppConfig::config_dir().join("config.toml").display()
        );
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let state = motiva_gateway::build_state(&config).await?;
    let engine = state.engine.clone();

    if let Some(msg) = message {
        eprint!("  Thinking...");
        let reply = engine.respond(identity, &msg).await?;
        eprint!("\r              \r");
        println!("{}", reply.message);
        return Ok(());
    }

    println!();
    println!("  Motiva — Interactive Counseling Chat");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.generation_model);
    println!("  Identity:  {identity}");
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let stdin = std::io::stdin();
    print!("  You > ");
    std::io::stdout().flush()?;

    for line in stdin.lock().lines() {
        let line = line?;
        let input = line.trim();

        if input.is_empty() {
            print!("  You > ");
            std::io::stdout().flush()?;
            continue;
        }
        if input == "exit" {
            break;
        }

        eprint!("  ...");
        match engine.respond(identity, input).await {
            Ok(reply) => {
                eprint!("\r     \r");
                println!();
                for line in reply.message.lines() {
                    println!("  Counselor > {line}");
                }
                println!();
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }

        print!("  You > ");
        std::io::stdout().flush()?;
    }

    println!();
    println!("  Goodbye!");
    println!();

    Ok(())
}
