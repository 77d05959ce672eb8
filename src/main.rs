use flowroute::bundling::EdgeBundlingCalculator;
use flowroute::graph::GraphInput;
use flowroute::routing::{EdgeCalculator, PathQuality};
use serde_json::json;
use std::env;
use std::fs;
use std::process;
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_env("FLOWROUTE_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <graph.json> [options]", args[0]);
        eprintln!();
        eprintln!("Options:");
        eprintln!("  -o, --output <file>    Output file (default: stdout)");
        eprintln!("  -q, --quality <tier>   Path quality: fast, balanced, smooth (default: balanced)");
        eprintln!("  -b, --bundles          Also compute edge bundles");
        process::exit(1);
    }

    let input_path = &args[1];
    let mut output_path: Option<String> = None;
    let mut quality = PathQuality::default();
    let mut with_bundles = false;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "-o" | "--output" => {
                i += 1;
                if i < args.len() {
                    output_path = Some(args[i].clone());
                }
            }
            "-q" | "--quality" => {
                i += 1;
                if i < args.len() {
                    quality = PathQuality::parse(&args[i]).unwrap_or_else(|e| {
                        eprintln!("{}", e);
                        process::exit(1);
                    });
                }
            }
            "-b" | "--bundles" => with_bundles = true,
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let input = match fs::read_to_string(input_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to read {}: {}", input_path, e);
            process::exit(1);
        }
    };

    let graph = match GraphInput::from_json(&input) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let mut calculator = EdgeCalculator::default();
    calculator.set_nodes(&graph.nodes);
    let routes = calculator.route_all(&graph, quality);

    let mut report = json!({
        "quality": quality,
        "routes": routes,
        "cacheStats": calculator.cache_stats(),
    });
    if with_bundles {
        let bundles = EdgeBundlingCalculator::default().calculate_bundles(&graph.edges, &graph.nodes);
        report["bundles"] = json!(bundles);
    }

    let output = match serde_json::to_string_pretty(&report) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to encode report: {}", e);
            process::exit(1);
        }
    };

    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(&path, &output) {
                eprintln!("Failed to write {}: {}", path, e);
                process::exit(1);
            }
        }
        None => println!("{}", output),
    }
}
