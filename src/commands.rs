//! Command implementations for the reviewlens CLI

use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;

use reviewlens::error::{Result, ScrapeError};
use reviewlens::fetch::{self, BrowserStatus, DefaultFetcher};
use reviewlens::record::ScrapeResult;
use reviewlens::registry::SiteRegistry;
use reviewlens::scrape::{self, ScrapeOptions};
use reviewlens::summarize::{KeywordSummarizer, ReviewSummary, Summarizer};
use reviewlens::utils::{parse_duration, truncate_str};

#[allow(clippy::too_many_arguments)]
pub fn cmd_scrape(
    url: &str,
    profile: Option<String>,
    generic: bool,
    max_pages: usize,
    timeout: Option<String>,
    registry_path: Option<PathBuf>,
    no_halve: bool,
    json: bool,
    summarize: bool,
) -> Result<()> {
    let registry = match registry_path {
        Some(path) => SiteRegistry::load_from_file(&path)?,
        None => SiteRegistry::load_default(),
    };

    let timeout = timeout
        .map(|raw| {
            parse_duration(&raw)
                .map(Duration::from_secs)
                .ok_or_else(|| {
                    ScrapeError::ConfigError(format!(
                        "invalid timeout '{}' (try 30s, 2m, 1h)",
                        raw
                    ))
                })
        })
        .transpose()?;

    if !json {
        match (&profile, generic, registry.identify(url)) {
            (Some(key), _, _) => eprintln!("Using platform profile: {}", key),
            (None, true, _) => eprintln!("Generic detection forced"),
            (None, false, Some(key)) => eprintln!("Identified platform: {}", key),
            (None, false, None) => eprintln!("No platform matched, using generic detection"),
        }
    }

    let opts = ScrapeOptions {
        max_pages,
        timeout,
        ten_scale_halving: !no_halve,
        force_generic: generic,
        profile_override: profile,
        ..Default::default()
    };

    let result = scrape::scrape(&DefaultFetcher, &registry, url, &opts)?;

    let summary = if summarize {
        Some(KeywordSummarizer.summarize(&result.reviews)?)
    } else {
        None
    };

    if json {
        print_json(&result, summary.as_ref())?;
    } else {
        print_human(&result, summary.as_ref());
    }
    Ok(())
}

fn print_json(result: &ScrapeResult, summary: Option<&ReviewSummary>) -> Result<()> {
    let mut value = serde_json::to_value(result)?;
    if let Some(summary) = summary {
        value["summary"] = serde_json::to_value(summary)?;
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn stars(rating: f32) -> String {
    let filled = rating.round().clamp(0.0, 5.0) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
}

fn print_human(result: &ScrapeResult, summary: Option<&ReviewSummary>) {
    println!("\n{}", result.product.name.bold());
    if let Some(rating) = result.product.rating {
        println!("  Rating: {} {:.1}/5", stars(rating).yellow(), rating);
    }
    if let Some(price) = &result.product.price {
        println!("  Price: {}", price);
    }
    println!(
        "\n{} review(s) from {} page(s):\n",
        result.reviews.len().to_string().bold(),
        result.pages_fetched
    );

    for (i, review) in result.reviews.iter().enumerate() {
        let header = format!("{}. {}", i + 1, review.author.green());
        match &review.date {
            Some(date) => println!(
                "{} {} {}",
                header,
                stars(review.rating.value()).yellow(),
                date.dimmed()
            ),
            None => println!("{} {}", header, stars(review.rating.value()).yellow()),
        }
        if let Some(title) = &review.title {
            println!("   {}", title.bold());
        }
        println!("   {}\n", truncate_str(&review.text, 300));
    }

    if let Some(summary) = summary {
        println!("{}", "Pros:".green().bold());
        for pro in &summary.pros {
            println!("  + {}", pro);
        }
        println!("\n{}", "Cons:".red().bold());
        for con in &summary.cons {
            println!("  - {}", con);
        }
        println!();
    }
}

pub fn cmd_platforms(json: bool) -> Result<()> {
    let registry = SiteRegistry::load_default();
    let keys = registry.platform_keys();

    if json {
        let entries: Vec<serde_json::Value> = keys
            .iter()
            .filter_map(|key| registry.get(key).map(|site| (key, site)))
            .map(|(key, site)| {
                serde_json::json!({
                    "key": key,
                    "name": site.display_name(key),
                    "domains": site.domains,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if keys.is_empty() {
        println!("\nNo platforms configured.");
        return Ok(());
    }

    println!("\n{} platform(s) with selector profiles:\n", keys.len());
    for key in keys {
        if let Some(site) = registry.get(key) {
            println!(
                "  {} ({})",
                site.display_name(key).bold(),
                site.domains.join(", ")
            );
        }
    }
    println!("\nOther URLs fall back to generic review detection.");
    Ok(())
}

pub fn cmd_doctor() -> Result<()> {
    println!("\nreviewlens doctor\n");

    println!("  reviewlens binary: v{}", env!("CARGO_PKG_VERSION"));

    let node = std::process::Command::new("node").arg("--version").output();
    match node {
        Ok(o) if o.status.success() => {
            let v = String::from_utf8_lossy(&o.stdout);
            println!("  Node.js: {}", v.trim());
        }
        _ => println!("  Node.js: NOT INSTALLED"),
    }

    match fetch::check_browser_runtime() {
        BrowserStatus::Ready => println!("  Browser render: ready"),
        status => println!(
            "  Browser render: unavailable ({})",
            status.install_instructions()
        ),
    }

    let registry = SiteRegistry::load_default();
    println!("  Platform profiles: {} loaded", registry.platform_keys().len());

    match SiteRegistry::ensure_user_registry() {
        Ok(path) => println!("  Registry file: {}", path.display()),
        Err(e) => println!("  Registry file: ERROR - {}", e),
    }

    println!("\nPages that block plain HTTP are fetched with a browser render;");
    println!("run `npx playwright install chromium` if that shows unavailable.\n");
    Ok(())
}
