use std::collections::BTreeMap;
use std::env;
use std::path::PathBuf;

use chrono::{Duration, Utc};
use ingest::{locate_history, probe_history, read_history};
use youknow_core::{CategorizedVisit, Category};

fn main() {
    let args: Vec<String> = env::args().skip(1).collect();
    if args.len() > 2 || args.iter().any(|arg| arg == "-h" || arg == "--help") {
        eprintln!("usage: history_cli [<History path|->] [days]");
        std::process::exit(2);
    }

    let explicit = args
        .first()
        .filter(|value| value.as_str() != "-")
        .map(PathBuf::from);
    let days = match args.get(1).map(|value| value.parse::<i64>()) {
        None => 7,
        Some(Ok(days)) if days > 0 => days,
        Some(_) => {
            eprintln!("days must be a positive integer");
            std::process::exit(2);
        }
    };

    let path = locate_history(explicit.as_deref()).unwrap_or_else(|err| {
        eprintln!("{}", err);
        std::process::exit(1);
    });
    let probe = probe_history(&path);
    println!("source {}", probe.path);
    println!("size_bytes {}", probe.size_bytes);
    println!("urls {}", probe.url_count.unwrap_or(0));
    println!("visits_total {}", probe.visit_count.unwrap_or(0));

    let since = Utc::now() - Duration::days(days);
    let stream = read_history(&path, since).unwrap_or_else(|err| {
        eprintln!("{}", err);
        std::process::exit(1);
    });

    let mut per_category: BTreeMap<Category, usize> = BTreeMap::new();
    let mut per_domain: BTreeMap<String, usize> = BTreeMap::new();
    let mut total = 0usize;
    for visit in stream {
        let visit = visit.unwrap_or_else(|err| {
            eprintln!("{}", err);
            std::process::exit(3);
        });
        let visit = CategorizedVisit::from_visit(visit);
        *per_category.entry(visit.category).or_default() += 1;
        *per_domain.entry(visit.domain).or_default() += 1;
        total += 1;
    }

    println!("visits_window {} ({} days)", total, days);
    for (category, count) in &per_category {
        println!("category {} {}", category, count);
    }
    let mut domains: Vec<_> = per_domain.into_iter().collect();
    domains.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    for (domain, count) in domains.into_iter().take(10) {
        println!("domain {} {}", domain, count);
    }
}
