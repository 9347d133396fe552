use std::path::Path;

use sm_domain::config::{Config, ConfigSeverity, StoreBackend};

/// Run all diagnostic checks and print a summary.
///
/// Returns `Ok(true)` when every check passes, `Ok(false)` when at least
/// one check failed.
pub async fn run(config: &Config, config_path: &str) -> anyhow::Result<bool> {
    println!("smash doctor");
    println!("============\n");

    let mut all_passed = true;

    check_config_file(config_path, &mut all_passed);
    check_config_validation(config, &mut all_passed);
    check_api_key(config, &mut all_passed);
    check_user_store(config, &mut all_passed);
    check_upstream(config, &mut all_passed).await;

    println!();
    if all_passed {
        println!("All checks passed.");
    } else {
        println!("Some checks failed. Review the output above.");
    }

    Ok(all_passed)
}

// ── Individual checks ─────────────────────────────────────────────────

fn check_config_file(config_path: &str, all_passed: &mut bool) {
    let exists = Path::new(config_path).exists();
    print_check(
        "Config file exists",
        exists,
        if exists {
            config_path.to_owned()
        } else {
            format!("{config_path} not found (using defaults)")
        },
    );
    if !exists {
        *all_passed = false;
    }
}

fn check_config_validation(config: &Config, all_passed: &mut bool) {
    let issues = config.validate();
    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();

    if issues.is_empty() {
        print_check("Config validation", true, "no issues".into());
        return;
    }

    print_check(
        "Config validation",
        error_count == 0,
        format!("{} issue(s) ({} error(s))", issues.len(), error_count),
    );
    for issue in &issues {
        println!("      {issue}");
    }
    if error_count > 0 {
        *all_passed = false;
    }
}

fn check_api_key(config: &Config, all_passed: &mut bool) {
    let source = config.llm.auth.env.as_deref().unwrap_or("llm.auth.key");
    match sm_providers::util::resolve_api_key(&config.llm.auth) {
        Ok(_) => print_check("LLM API key", true, format!("resolved ({source})")),
        Err(e) => {
            print_check("LLM API key", false, e.to_string());
            *all_passed = false;
        }
    }
}

fn check_user_store(config: &Config, all_passed: &mut bool) {
    match config.store.backend {
        StoreBackend::Json => {
            let dir = config.store.state_path.join("users");
            let writable = std::fs::create_dir_all(&dir).is_ok() && {
                let marker = dir.join(".smash_doctor_write_check");
                let ok = std::fs::write(&marker, b"ok").is_ok();
                let _ = std::fs::remove_file(&marker);
                ok
            };
            print_check(
                "User store directory",
                writable,
                if writable {
                    format!("{} (writable)", dir.display())
                } else {
                    format!("{} (not writable)", dir.display())
                },
            );
            if !writable {
                *all_passed = false;
            }
        }
        StoreBackend::Mongodb => {
            let built = cfg!(feature = "mongodb");
            print_check(
                "MongoDB user store",
                built,
                if built {
                    config.store.mongodb.uri.clone()
                } else {
                    "binary built without the `mongodb` feature".into()
                },
            );
            if !built {
                *all_passed = false;
            }
        }
    }
}

async fn check_upstream(config: &Config, all_passed: &mut bool) {
    let url = &config.llm.base_url;
    // Any HTTP answer counts; only connection failures fail the check.
    let reachable = match reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
    {
        Ok(client) => client.get(url).send().await.is_ok(),
        Err(_) => false,
    };

    print_check(
        "Upstream API reachable",
        reachable,
        if reachable {
            url.clone()
        } else {
            format!("{url} (unreachable)")
        },
    );

    if !reachable {
        *all_passed = false;
    }
}

// ── Formatting helper ─────────────────────────────────────────────────

fn print_check(name: &str, passed: bool, detail: String) {
    let status = if passed { "PASS" } else { "FAIL" };
    println!("  [{status}] {name}: {detail}");
}
