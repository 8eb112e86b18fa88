use std::path::{Path, PathBuf};

use colored::Colorize;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use tessera_sync::{FillReport, Replicator, ReplicatorConfig, StoreSource};
use tessera_types::{Dynamic, Reference};
use tessera_want::{compute_wants, Container};

use crate::cli::*;
use crate::config::CliConfig;
use crate::demo;
use crate::workspace::Workspace;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(cli.config.as_deref())?;
    let dir = config.store_dir(cli.store);
    let format = config.output(cli.format);

    match cli.command {
        Command::Init => cmd_init(&dir, format),
        Command::Stat => cmd_stat(&dir, format),
        Command::Demo => cmd_demo(&dir, format),
        Command::Schema(args) => cmd_schema(&dir, format, args),
        Command::Names => cmd_names(&dir, format),
        Command::Bind(args) => cmd_bind(&dir, format, args),
        Command::Want(args) => cmd_want(&dir, format, args),
        Command::Pull(args) => cmd_pull(&dir, format, args, &config.replicator),
    }
}

/// Print `value` as JSON, or run `text` for the human-readable form.
fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce()) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => text(),
    }
    Ok(())
}

fn cmd_init(dir: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let ws = Workspace::init(dir)?;
    emit(format, &json!({ "store": ws.root() }), || {
        println!(
            "{} Initialized tessera store in {}",
            "✓".green().bold(),
            ws.root().display().to_string().bold()
        );
    })
}

fn cmd_stat(dir: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let ws = Workspace::open(dir)?;
    let (objects, bytes) = ws.store().stat()?;
    let names = ws.registry().names().len();
    emit(
        format,
        &json!({ "store": ws.root(), "objects": objects, "bytes": bytes, "names": names }),
        || {
            println!("Store {}", ws.root().display().to_string().bold());
            println!("  Objects: {} ({} bytes)", objects.to_string().bold(), bytes);
            println!("  Names:   {}", names.to_string().bold());
        },
    )
}

fn cmd_demo(dir: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let ws = Workspace::open(dir)?;
    let root = write_demo(&ws)?;
    emit(format, &root, || {
        println!("{} Wrote sample group", "✓".green().bold());
        print_root(&root);
    })
}

fn write_demo(ws: &Workspace) -> anyhow::Result<Dynamic> {
    let container = Container::new(ws.registry().clone());
    let root = demo::populate(&container)?;
    ws.save_names()?;
    info!(root = %root, "sample graph written");
    Ok(root)
}

fn cmd_schema(dir: &Path, format: OutputFormat, args: SchemaArgs) -> anyhow::Result<()> {
    let ws = Workspace::open(dir)?;
    let schema = ws.registry().schema_by_reference(&args.reference)?;
    emit(format, &schema, || println!("{schema}"))
}

fn cmd_names(dir: &Path, format: OutputFormat) -> anyhow::Result<()> {
    let ws = Workspace::open(dir)?;
    let names = ws.registry().names();
    let listing: Vec<_> = names
        .iter()
        .map(|(name, reference)| json!({ "name": name, "schema": reference }))
        .collect();
    emit(format, &listing, || {
        if names.is_empty() {
            println!("No names bound.");
        }
        for (name, reference) in &names {
            println!("{}  {}", reference.short_hex().yellow(), name.bold());
        }
    })
}

fn cmd_bind(dir: &Path, format: OutputFormat, args: BindArgs) -> anyhow::Result<()> {
    let ws = Workspace::open(dir)?;
    ws.registry().bind(&args.name, args.reference)?;
    ws.save_names()?;
    emit(
        format,
        &json!({ "name": args.name, "schema": args.reference }),
        || {
            println!(
                "{} Bound {} → {}",
                "✓".green().bold(),
                args.name.bold(),
                args.reference.short_hex().yellow()
            );
        },
    )
}

fn want(ws: &Workspace, root: Dynamic) -> anyhow::Result<Vec<Reference>> {
    let wants = compute_wants(ws.registry(), ws.store().as_ref(), root.schema, root.object)?;
    Ok(wants.into_sorted_vec())
}

fn cmd_want(dir: &Path, format: OutputFormat, args: RootArgs) -> anyhow::Result<()> {
    let ws = Workspace::open(dir)?;
    let wants = want(&ws, Dynamic::new(args.schema, args.object))?;
    emit(format, &json!({ "wants": wants }), || {
        if wants.is_empty() {
            println!("{} Nothing missing.", "✓".green().bold());
        }
        for reference in &wants {
            println!("{reference}");
        }
    })
}

/// Copy whatever `local` is missing below `root` out of `source`.
fn pull(
    local: &Workspace,
    source: &Workspace,
    root: Dynamic,
    config: &ReplicatorConfig,
) -> anyhow::Result<FillReport> {
    let source = StoreSource::new(source.registry().clone());
    let replicator = Replicator::new(local.registry().clone(), config.clone());
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(replicator.fill(root, &source))?;
    local.save_names()?;
    Ok(report)
}

fn cmd_pull(
    dir: &Path,
    format: OutputFormat,
    args: PullArgs,
    config: &ReplicatorConfig,
) -> anyhow::Result<()> {
    let local = Workspace::open(dir)?;
    let source = Workspace::open(&args.from)?;
    let root = Dynamic::new(args.root.schema, args.root.object);
    let report = pull(&local, &source, root, config)?;
    let from: PathBuf = args.from;

    emit(format, &report, || {
        println!("Pulled from {}", from.display().to_string().bold());
        println!(
            "  Rounds: {}  Received: {}  Rejected: {}  Names bound: {}",
            report.rounds, report.received, report.rejected, report.names_bound
        );
        if report.complete {
            println!("{} Graph complete", "✓".green().bold());
        } else {
            println!(
                "{} {} objects still missing",
                "✗".red().bold(),
                report.missing.len()
            );
            for reference in &report.missing {
                println!("  {}", reference.to_string().dimmed());
            }
        }
    })
}

fn print_root(root: &Dynamic) {
    println!("  Schema: {}", root.schema.to_string().yellow());
    println!("  Object: {}", root.object.to_string().yellow());
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessera_store::ObjectStore;

    fn workspace(dir: &tempfile::TempDir, name: &str) -> Workspace {
        Workspace::init(&dir.path().join(name)).unwrap()
    }

    #[test]
    fn demo_root_wants_nothing_locally() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(&dir, "a");
        let root = write_demo(&ws).unwrap();
        assert!(want(&ws, root).unwrap().is_empty());
    }

    #[test]
    fn empty_store_wants_the_root_schema() {
        let dir = tempfile::tempdir().unwrap();
        let remote = workspace(&dir, "remote");
        let root = write_demo(&remote).unwrap();

        let local = workspace(&dir, "local");
        assert_eq!(want(&local, root).unwrap(), vec![root.schema]);
    }

    #[test]
    fn pull_completes_the_graph_and_saves_names() {
        let dir = tempfile::tempdir().unwrap();
        let remote = workspace(&dir, "remote");
        let root = write_demo(&remote).unwrap();

        let local = workspace(&dir, "local");
        let report = pull(&local, &remote, root, &ReplicatorConfig::default()).unwrap();
        assert!(report.complete, "{report:?}");
        assert!(want(&local, root).unwrap().is_empty());
        assert_eq!(local.store().stat().unwrap().0, remote.store().stat().unwrap().0);

        let reopened = Workspace::open(local.root()).unwrap();
        assert_eq!(reopened.registry().names(), remote.registry().names());
    }

    #[test]
    fn pull_reports_objects_the_source_lost() {
        let dir = tempfile::tempdir().unwrap();
        let remote = workspace(&dir, "remote");
        let root = write_demo(&remote).unwrap();
        assert!(remote.store().delete(&root.object).unwrap());

        let local = workspace(&dir, "local");
        let report = pull(&local, &remote, root, &ReplicatorConfig::default()).unwrap();
        assert!(!report.complete);
        assert_eq!(report.missing, vec![root.object]);
    }

    #[test]
    fn commands_run_against_a_fresh_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = dir.path().join("store");
        let store = store.to_str().unwrap();
        let run = |args: &[&str]| {
            let mut argv = vec!["tessera", "--store", store];
            argv.extend_from_slice(args);
            run_command(<Cli as clap::Parser>::try_parse_from(argv).unwrap())
        };

        assert!(run(&["stat"]).is_err());
        run(&["init"]).unwrap();
        run(&["demo"]).unwrap();
        run(&["--format", "json", "names"]).unwrap();
        run(&["stat"]).unwrap();
    }
}
