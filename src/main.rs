use clap::{Arg, Command};
use log::LevelFilter;
use scamguard::config::DetectionConfig;
use scamguard::engine::ScamDetector;
use scamguard::model::Model;
use scamguard::training::{self, TrainingOptions};
use scamguard::url_scorer::{UrlAnalysis, UrlScorer};
use scamguard::DetectionResult;
use std::path::Path;
use std::process;

fn main() {
    let matches = Command::new("scamguard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Scam message detector combining a trained text classifier with URL risk heuristics")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Detection configuration file (YAML)")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Write the default detection configuration and exit")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("FILE")
                .help("Model artifact path")
                .default_value("models/model.json"),
        )
        .arg(
            Arg::new("train")
                .long("train")
                .value_name("FILE")
                .help("Train a model from a JSON dataset and save it")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("create-sample")
                .long("create-sample")
                .help("Write the built-in sample dataset, train on it and save the model")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("message")
                .long("message")
                .value_name("TEXT")
                .help("Analyze a single message")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("check-url")
                .long("check-url")
                .value_name("URL")
                .help("Score a bare URL without running the text classifier")
                .action(clap::ArgAction::Set),
        )
        .arg(
            Arg::new("demo")
                .long("demo")
                .help("Analyze a set of demonstration messages")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Emit results as JSON instead of a formatted report")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(clap::ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(path) = matches.get_one::<String>("generate-config") {
        if let Err(e) = DetectionConfig::write_default(Path::new(path)) {
            eprintln!("Error writing configuration: {e}");
            process::exit(1);
        }
        println!("Default configuration written to {path}");
        return;
    }

    let config = match matches.get_one::<String>("config") {
        Some(path) => match DetectionConfig::load_from_file(Path::new(path)) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error loading configuration: {e}");
                process::exit(1);
            }
        },
        None => DetectionConfig::default(),
    };

    let model_path = matches.get_one::<String>("model").unwrap();
    let as_json = matches.get_flag("json");

    // URL-only mode needs no model.
    if let Some(url) = matches.get_one::<String>("check-url") {
        let scorer = UrlScorer::new(config.url_rules.clone());
        let analysis = scorer.score(url);
        if as_json {
            println!("{}", serde_json::to_string_pretty(&analysis).unwrap());
        } else {
            print_url_analysis(&analysis, 1);
        }
        return;
    }

    if matches.get_flag("create-sample") {
        let dataset = training::sample_dataset();
        if let Err(e) = training::save_dataset(&dataset, Path::new("data/sample_dataset.json")) {
            eprintln!("Error writing sample dataset: {e}");
            process::exit(1);
        }
        train_and_save(&dataset, Path::new(model_path));
        return;
    }

    if let Some(dataset_path) = matches.get_one::<String>("train") {
        let dataset = match training::load_dataset(Path::new(dataset_path)) {
            Ok(dataset) => dataset,
            Err(e) => {
                eprintln!("Error loading dataset: {e}");
                process::exit(1);
            }
        };
        train_and_save(&dataset, Path::new(model_path));
        return;
    }

    // The remaining commands run inference; load the model up front and
    // fail loudly if it is unavailable.
    let has_work = matches.get_one::<String>("message").is_some() || matches.get_flag("demo");
    if !has_work {
        eprintln!("Error: provide --message, --check-url, --demo, --train or --create-sample");
        process::exit(2);
    }

    let model = match Model::load(Path::new(model_path)) {
        Ok(model) => model,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Train a model first with --create-sample or --train <dataset>");
            process::exit(1);
        }
    };
    let detector = ScamDetector::from_model(model, config);

    if let Some(message) = matches.get_one::<String>("message") {
        let result = detector.analyze(message);
        if as_json {
            println!("{}", serde_json::to_string_pretty(&result).unwrap());
        } else {
            print_report(message, &result);
        }
        return;
    }

    if matches.get_flag("demo") {
        for message in demo_messages() {
            let result = detector.analyze(message);
            if as_json {
                println!("{}", serde_json::to_string_pretty(&result).unwrap());
            } else {
                print_report(message, &result);
            }
        }
    }
}

fn train_and_save(dataset: &[scamguard::training::LabeledMessage], model_path: &Path) {
    println!("Training on {} samples...", dataset.len());
    match training::train(dataset, &TrainingOptions::default()) {
        Ok((model, metrics)) => {
            if let Err(e) = model.save(model_path) {
                eprintln!("Error saving model: {e}");
                process::exit(1);
            }
            println!("Training completed successfully!");
            println!("  Accuracy:  {:.4}", metrics.accuracy);
            println!("  Precision: {:.4}", metrics.precision);
            println!("  Recall:    {:.4}", metrics.recall);
            println!("  F1-Score:  {:.4}", metrics.f1_score);
            println!("Model saved to {}", model_path.display());
        }
        Err(e) => {
            eprintln!("Training failed: {e}");
            process::exit(1);
        }
    }
}

fn print_report(message: &str, result: &DetectionResult) {
    println!();
    println!("{}", "=".repeat(70));
    println!("SCAM DETECTION ANALYSIS");
    println!("{}", "=".repeat(70));
    println!();
    println!("Message: {message}");
    println!();
    if result.is_scam {
        println!("🚨 VERDICT: SCAM");
    } else {
        println!("✅ VERDICT: SAFE");
    }
    println!("Confidence: {:.2}%", result.confidence * 100.0);
    println!();
    println!("Text Analysis:");
    println!("  Scam Probability: {:.2}%", result.text_scam_probability * 100.0);
    println!("  Safe Probability: {:.2}%", result.text_safe_probability * 100.0);

    if result.urls_found > 0 {
        println!();
        println!("URL Analysis:");
        println!("  URLs Found: {}", result.urls_found);
        println!(
            "  Suspicious URLs: {}",
            if result.has_suspicious_urls { "YES" } else { "NO" }
        );
        println!("  Max Suspicion Score: {}/100", result.max_url_suspicion_score);
        for (i, analysis) in result.url_analyses.iter().enumerate() {
            println!();
            println!("  URL {}: {}", i + 1, analysis.url);
            print_url_analysis(analysis, 2);
        }
    }

    println!();
    println!("Reasons:");
    for reason in &result.reasons {
        println!("  • {reason}");
    }
    println!("{}", "=".repeat(70));
}

fn print_url_analysis(analysis: &UrlAnalysis, indent: usize) {
    let pad = "  ".repeat(indent);
    println!("{pad}Suspicion Score: {}/100", analysis.suspicion_score);
    println!(
        "{pad}Status: {}",
        if analysis.is_suspicious {
            "⚠️  SUSPICIOUS"
        } else {
            "✓ OK"
        }
    );
    if !analysis.reasons.is_empty() {
        println!("{pad}Reasons:");
        for reason in &analysis.reasons {
            println!("{pad}  - {reason}");
        }
    }
}

fn demo_messages() -> &'static [&'static str] {
    &[
        "Hi, how are you? Let's catch up tomorrow.",
        "URGENT! Your bank account has been suspended. Click http://secure-bank-verify.tk/login to restore access immediately!",
        "Congratulations! You've won 10 lakhs. Pay 5000 processing fee to bit.ly/claim123",
        "Enaku solla irukku, call me when free",
        "FREE iPhone 15! Limited offer! Click www.free-iphone-claim.xyz/winner",
        "Meeting at 3 PM today in conference room",
        "Panam jeyikum! Investment guarantee 100%. Contact: http://192.168.1.1/invest",
    ]
}
