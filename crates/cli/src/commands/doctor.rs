//! `motiva doctor` — Diagnose configuration and connectivity.

use motiva_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Motiva Doctor — Diagnostics");
    println!("===========================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        match AppConfig::load() {
            Ok(config) => {
                println!("  [ok] Config file valid");

                if config.has_api_key() {
                    println!("  [ok] API key configured");
                } else {
                    println!("  [!!] No API key configured — set MOTIVA_API_KEY");
                    issues += 1;
                }

                let router = motiva_providers::build_from_config(&config);
                match router.default() {
                    Some(provider) => match provider.health_check().await {
                        Ok(true) => println!("  [ok] Provider '{}' reachable", provider.name()),
                        Ok(false) | Err(_) => {
                            println!(
                                "  [!!] Provider '{}' not reachable — check api_url and key",
                                config.default_provider
                            );
                            issues += 1;
                        }
                    },
                    None => {
                        println!(
                            "  [!!] Default provider '{}' not configured",
                            config.default_provider
                        );
                        issues += 1;
                    }
                }
            }
            Err(e) => {
                println!("  [!!] Config file invalid: {e}");
                issues += 1;
            }
        }
    } else {
        println!("  [!!] No config file — run `motiva onboard`");
        issues += 1;
    }

    println!();
    if issues == 0 {
        println!("  All checks passed.");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
