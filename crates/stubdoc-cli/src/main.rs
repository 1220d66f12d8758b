//! Stubdoc CLI - Command-line interface for the stubdoc documentation toolkit

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod check;
mod postprocess;
mod revert;
mod stage;

#[derive(Parser)]
#[command(name = "stubdoc")]
#[command(version = stubdoc_core::VERSION)]
#[command(about = "Documentation toolkit for MicroPython stub packages", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage stub modules from a micropython-lib checkout into the docs tree
    Stage {
        /// Library checkout to stage from
        #[arg(long)]
        library: Option<PathBuf>,

        /// Destination directory inside the documentation tree
        #[arg(long)]
        dest: Option<PathBuf>,

        /// Staged file extension, without the leading dot
        #[arg(long)]
        ext: Option<String>,
    },

    /// Revert stub-generator rewrites in a docstring read from stdin
    Revert {
        /// Module name the docstring belongs to
        #[arg(long)]
        name: String,

        /// Library checkout used to look up the module's origin
        #[arg(long)]
        library: Option<PathBuf>,
    },

    /// Compare built pages against the published reference documentation
    Check {
        /// Pages to check (e.g. "library/os"); discovered when omitted
        pages: Vec<String>,

        /// Build output directory holding the generated HTML
        #[arg(long)]
        build_dir: Option<PathBuf>,

        /// Base URL of the reference site
        #[arg(long)]
        base_url: Option<String>,

        /// Documentation version to compare against
        #[arg(long)]
        docs_version: Option<String>,

        /// Fail a page when it is missing this many reference lines or more
        #[arg(long)]
        max_missing: Option<usize>,
    },

    /// Replace placeholder type names across the generated HTML
    Postprocess {
        /// Build output directory (defaults to configuration)
        out_dir: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Stage { library, dest, ext } => {
            let options = stage::StageOptions {
                library,
                destination: dest,
                extension: ext,
            };
            stage::stage_stubs(options)?;
        }

        Commands::Revert { name, library } => {
            let options = revert::RevertOptions { name, library };
            revert::revert_docstring(options)?;
        }

        Commands::Check {
            pages,
            build_dir,
            base_url,
            docs_version,
            max_missing,
        } => {
            let options = check::CheckOptions {
                pages,
                build_dir,
                base_url,
                docs_version,
                max_missing,
            };
            check::check_pages(options)?;
        }

        Commands::Postprocess { out_dir } => {
            let options = postprocess::PostprocessOptions { out_dir };
            postprocess::scrub_output(options)?;
        }
    }

    Ok(())
}
