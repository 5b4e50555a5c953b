//! Hospital Timeline CLI - Play a facility deployment timeline from a JSON dataset.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use chrono::{Days, NaiveDate};
use rand::Rng;

use hospital_timeline::{
    compute::{Dashboard, PlaybackStatus},
    schema::{
        Coordinates, DashboardConfig, DateFormatter, Facility, FacilityStatus, FacilityStore,
        IsoDateFormatter,
    },
};

/// Host loop frame time.
const FRAME: Duration = Duration::from_millis(50);

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <facilities.json> [frames]", args[0]);
        eprintln!();
        eprintln!("Play a facility deployment timeline from a JSON dataset.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  facilities.json  Path to the facility dataset (JSON array)");
        eprintln!("  frames           Maximum timeline steps to play (default: all)");
        eprintln!();
        eprintln!("An example dataset and configuration is printed with --example.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example();
        return;
    }

    let dataset_path = PathBuf::from(&args[1]);
    let max_frames = parse_frames(args.get(2).map(String::as_str)).unwrap_or_else(|e| {
        eprintln!("Error parsing frames '{}': {}", args[2], e);
        std::process::exit(1);
    });

    // Load dataset
    let store = FacilityStore::load(&dataset_path).unwrap_or_else(|e| {
        eprintln!("Error loading dataset: {}", e);
        std::process::exit(1);
    });

    // Load configuration if present next to the dataset
    let config_path = dataset_path.with_extension("config.json");
    let config: DashboardConfig = if config_path.exists() {
        let config_str = fs::read_to_string(&config_path).unwrap_or_else(|e| {
            eprintln!("Error reading config file: {}", e);
            std::process::exit(1);
        });
        serde_json::from_str(&config_str).unwrap_or_else(|e| {
            eprintln!("Error parsing config: {}", e);
            std::process::exit(1);
        })
    } else {
        DashboardConfig::default()
    };

    let mut dashboard = Dashboard::new(Arc::new(store), config).unwrap_or_else(|e| {
        eprintln!("Error creating dashboard: {}", e);
        std::process::exit(1);
    });

    dashboard.subscribe(|event| {
        if let Some(diagnostic) = &event.diagnostic {
            eprintln!("  ! {}", diagnostic);
        }
    });

    let formatter = IsoDateFormatter;
    let timeline = dashboard.timeline();

    println!("Hospital Deployment Timeline");
    println!("============================");
    println!("Facilities: {}", dashboard.store().len());
    for (status, count) in dashboard.store().count_by_status() {
        println!("  {}: {}", status, count);
    }
    match (timeline.first(), timeline.last()) {
        (Some(first), Some(last)) => println!(
            "Timeline: {} dates, {} .. {}",
            timeline.len(),
            formatter.format(first),
            formatter.format(last)
        ),
        _ => println!("Timeline: empty"),
    }
    println!(
        "Statuses shown: {:?}",
        dashboard.status_selection().included()
    );
    println!("Tick interval: {:?}", dashboard.tick_interval());
    println!();

    print_frame(&dashboard, &formatter);

    if dashboard.play().is_none() {
        println!("Nothing to play.");
        return;
    }

    // Host event loop: feed wall time to the playback timer
    let mut frames = 0;
    let mut last = Instant::now();
    while dashboard.playback_state().status == PlaybackStatus::Playing {
        thread::sleep(FRAME);
        let now = Instant::now();
        let ticks = dashboard.advance(now - last);
        last = now;

        if ticks > 0 {
            print_frame(&dashboard, &formatter);
            frames += ticks;
        }
        if max_frames.is_some_and(|max| frames >= max) {
            dashboard.pause();
        }
    }

    println!();
    let state = dashboard.playback_state();
    println!("Playback {:?} at index {:?}", state.status, state.current_index);
}

/// Optional step limit from the command line.
fn parse_frames(arg: Option<&str>) -> Result<Option<usize>, std::num::ParseIntError> {
    arg.map(str::parse).transpose()
}

fn print_frame(dashboard: &Dashboard, formatter: &impl DateFormatter) {
    let state = dashboard.playback_state();
    let summary = dashboard.visible_summary();
    println!(
        "  [{:>3}/{}] {}: {} visible (deployed {}, signed {})",
        state.current_index.map_or(0, |i| i + 1),
        state.timeline_length,
        formatter.format(dashboard.as_of_date()),
        summary.total,
        summary.count(FacilityStatus::Deployed),
        summary.count(FacilityStatus::Signed),
    );
}

fn print_example() {
    let mut rng = rand::thread_rng();
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();

    let facilities: Vec<Facility> = (0..8)
        .map(|i| {
            let status = if rng.gen_bool(0.6) {
                FacilityStatus::Deployed
            } else {
                FacilityStatus::Signed
            };
            let date = start + Days::new(rng.gen_range(0..540));
            let mut facility = Facility::new(
                format!("hospital-{}", i + 1),
                status,
                date,
                format!("Example Hospital {}", i + 1),
            );
            facility.details.coordinates = Some(Coordinates {
                lat: rng.gen_range(25.0..49.0),
                lng: rng.gen_range(-124.0..-67.0),
            });
            facility
        })
        .collect();

    println!("Example dataset (facilities.json):");
    println!("{}", serde_json::to_string_pretty(&facilities).unwrap());
    println!();
    println!("Example configuration (facilities.config.json):");
    println!(
        "{}",
        serde_json::to_string_pretty(&DashboardConfig::default()).unwrap()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_frames() {
        assert_eq!(parse_frames(None), Ok(None));
        assert_eq!(parse_frames(Some("12")), Ok(Some(12)));
        assert!(parse_frames(Some("ten")).is_err());
        assert!(parse_frames(Some("-1")).is_err());
        assert!(parse_frames(Some("")).is_err());
    }
}
