// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};
use plane_features::config::{load_and_validate_config, RuntimeBuilder};
use plane_features::engine::{Outcome, RunSummary};
use plane_features::errors::ParseError;
use plane_features::model::ObjectRef;
use plane_features::work::BatchSpec;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: plane-features <config.yaml|config.toml> [--batch INDEX/COUNT] [Kind:id ...]";

/// Command line arguments
struct Args {
    config: PathBuf,
    batch: Option<BatchSpec>,
    roots: Vec<ObjectRef>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, ParseError> {
    let config = args
        .next()
        .ok_or(ParseError::MissingArgument("config file"))?;
    let mut batch = None;
    let mut roots = Vec::new();

    while let Some(arg) = args.next() {
        if arg == "--batch" {
            let value = args
                .next()
                .ok_or(ParseError::MissingArgument("value for --batch"))?;
            batch = Some(value.parse::<BatchSpec>()?);
        } else if let Some(value) = arg.strip_prefix("--batch=") {
            batch = Some(value.parse::<BatchSpec>()?);
        } else {
            roots.push(arg.parse::<ObjectRef>()?);
        }
    }

    Ok(Args {
        config: PathBuf::from(config),
        batch,
        roots,
    })
}

fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Published { item, path } => println!("published  {} -> {}", item, path.display()),
        Outcome::AlreadyComputed { item } => println!("skipped    {} (already computed)", item),
        Outcome::Failed { subject, error } => println!("failed     {}: {}", subject, error),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let args = match parse_args(env::args().skip(1)) {
        Ok(args) => args,
        Err(error) => {
            eprintln!("error: {}", error);
            eprintln!("{}", USAGE);
            std::process::exit(2);
        }
    };

    let config = load_and_validate_config(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let runtime = RuntimeBuilder::from_config(&config)?;

    let roots = if args.roots.is_empty() {
        runtime.roots.clone()
    } else {
        args.roots
    };
    if roots.is_empty() {
        bail!("no roots to process; list them in the config or on the command line");
    }

    if let Some(max_age) = runtime.orphan_max_age {
        let cache = runtime.cache.clone();
        let report = tokio::task::spawn_blocking(move || cache.sweep_orphans(max_age)).await??;
        tracing::info!(
            removed = report.removed.len(),
            in_use = report.in_use,
            recent = report.recent,
            "orphan sweep finished"
        );
    }

    let calculator = runtime.calculator();
    let cancel = calculator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, stopping after the current plane");
            cancel.cancel();
        }
    });

    let mut unresolved = 0;
    let mut stream = match args.batch.or(runtime.batch) {
        None => calculator.run(roots, runtime.extractor.clone()),
        Some(spec) => {
            let plan = calculator.plan(&roots).await;
            for (root, error) in plan.unresolved() {
                println!("failed     {}: {}", root, error);
            }
            unresolved = plan.unresolved().len();
            let items = plan.batch(spec).to_vec();
            tracing::info!(
                batch = spec.index(),
                batches = spec.count(),
                items = items.len(),
                planned = plan.len(),
                "running batch"
            );
            calculator.run_items(items, runtime.extractor.clone())
        }
    };

    let mut summary = RunSummary::default();
    while let Some(outcome) = stream.next().await {
        print_outcome(&outcome);
        summary.record(&outcome);
    }

    println!("{}", summary);
    if summary.failed + unresolved > 0 {
        bail!("{} items failed", summary.failed + unresolved);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ParseError> {
        parse_args(args.iter().map(|a| a.to_string()))
    }

    #[test]
    fn parses_batch_and_roots() {
        let args = parse(&["demo.yaml", "--batch", "1/4", "Dataset:2", "Image:7"]).unwrap();
        assert_eq!(args.config, PathBuf::from("demo.yaml"));
        assert_eq!(args.batch, Some(BatchSpec::new(1, 4).unwrap()));
        assert_eq!(args.roots.len(), 2);

        let args = parse(&["demo.yaml", "--batch=0/2"]).unwrap();
        assert_eq!(args.batch, Some(BatchSpec::new(0, 2).unwrap()));
        assert!(args.roots.is_empty());
    }

    #[test]
    fn reports_which_argument_is_wrong() {
        assert_eq!(
            parse(&[]).err(),
            Some(ParseError::MissingArgument("config file"))
        );
        assert_eq!(
            parse(&["demo.yaml", "--batch"]).err(),
            Some(ParseError::MissingArgument("value for --batch"))
        );
        assert_eq!(
            parse(&["demo.yaml", "--batch=4/4"]).err(),
            Some(ParseError::BatchIndexOutOfRange { index: 4, count: 4 })
        );
        assert_eq!(
            parse(&["demo.yaml", "Folder:1"]).err(),
            Some(ParseError::UnknownObjectKind("Folder".into()))
        );
    }
}
