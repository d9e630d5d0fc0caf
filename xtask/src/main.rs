use agentready_assess::{CATALOG_VERSION, Registry};
use agentready_types::Tier;
use anyhow::Context;
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use std::process::Command as ProcessCommand;

#[derive(Debug, Parser)]
#[command(name = "xtask", about = "Workspace helper tasks")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print schema identifiers used by agentready.
    PrintSchemas,
    /// List the built-in attribute catalog.
    ListAttributes {
        /// Only this tier (1-4).
        #[arg(long)]
        tier: Option<u8>,
        #[arg(long)]
        json: bool,
    },
    /// Print the content fingerprint the mock benchmark keys on.
    Fingerprint {
        #[arg(default_value = ".")]
        dir: Utf8PathBuf,
    },
    /// Run the fixture-backed integration tests.
    CheckFixtures,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::PrintSchemas => {
            println!("{}", agentready_types::schema::AGENTREADY_ASSESSMENT_V1);
            println!("{}", agentready_types::schema::AGENTREADY_ALIGN_V1);
            println!("{}", agentready_types::schema::AGENTREADY_EVAL_V1);
        }
        Command::ListAttributes { tier, json } => {
            let registry = match tier {
                Some(n) => Registry::builtin().for_tier(Tier::from_number(n)?),
                None => Registry::builtin(),
            };
            let attributes = registry.attributes();
            if json {
                println!("{}", serde_json::to_string_pretty(&attributes)?);
            } else {
                println!("catalog version {CATALOG_VERSION}");
                for a in attributes {
                    println!("{:<26} tier {}  {:<16} {}", a.id, a.tier.number(), a.category, a.name);
                }
            }
        }
        Command::Fingerprint { dir } => {
            let fingerprint = agentready_hash::tree_fingerprint(&dir)
                .with_context(|| format!("fingerprint {dir}"))?;
            println!("{fingerprint}");
        }
        Command::CheckFixtures => {
            for (package, test) in [
                ("agentready-assess", "golden_fixtures"),
                ("agentready-align", "align_engine"),
                ("agentready-eval", "harness"),
            ] {
                let status = ProcessCommand::new("cargo")
                    .args(["test", "-p", package, "--test", test])
                    .status()
                    .with_context(|| format!("run {package} {test}"))?;
                if !status.success() {
                    anyhow::bail!("{package} {test} failed");
                }
            }
        }
    }
    Ok(())
}
