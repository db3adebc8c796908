//! `thinki doctor`: Diagnose configuration and provider access.

use thinki_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 Thinki Doctor — Configuration Diagnostics");
    println!("============================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("  ✅ Config file found: {}", config_path.display());
    } else {
        println!("  ⚠️  No config file — using defaults (run `thinki onboard` to create one)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  1 issue(s) found. See above for details.");
            return Ok(());
        }
    };

    println!(
        "  ✅ Provider: {} (model {})",
        config.default_provider,
        config.resolved_model()
    );

    match thinki_providers::build_from_config(&config) {
        Ok(provider) => {
            println!("  ✅ API key configured");
            match provider.health_check().await {
                Ok(true) => println!("  ✅ Provider reachable"),
                Ok(false) => {
                    println!("  ⚠️  Provider answered but rejected the health check (check the key)");
                    issues += 1;
                }
                Err(e) => {
                    println!("  ❌ Provider unreachable: {e}");
                    issues += 1;
                }
            }
        }
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
