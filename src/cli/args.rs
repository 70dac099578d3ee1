//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

/// Inspect component pages: masters, variants, inherited attributes
#[derive(Parser, Debug)]
#[command(name = "variantree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the composition tree of a page
    Tree {
        /// Page file (default: default_page from config)
        #[arg(value_hint = ValueHint::FilePath)]
        page: Option<PathBuf>,
    },

    /// Show which variant derives from which master
    Masters {
        /// Page file (default: default_page from config)
        #[arg(value_hint = ValueHint::FilePath)]
        page: Option<PathBuf>,
    },

    /// Show resolved attributes of a component
    Attrs {
        /// Component name (root master names work too)
        name: String,
        /// Page file (default: default_page from config)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        page: Option<PathBuf>,
        /// Only local overrides, nothing inherited
        #[arg(short, long)]
        local: bool,
    },

    /// Show what the renderer receives for a component
    Render {
        /// Component name (root master names work too)
        name: String,
        /// Page file (default: default_page from config)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        page: Option<PathBuf>,
    },

    /// List attribute fields used by the editor
    Fields,

    /// Build a page and verify both trees
    Check {
        /// Page file (default: default_page from config)
        #[arg(value_hint = ValueHint::FilePath)]
        page: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show {
        /// Page file whose directory contributes a local config
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        page: Option<PathBuf>,
    },

    /// Show config paths
    Path,
}

impl Commands {
    /// Page file named on the command line, if the command takes one.
    pub fn page(&self) -> Option<&PathBuf> {
        match self {
            Commands::Tree { page }
            | Commands::Masters { page }
            | Commands::Check { page }
            | Commands::Attrs { page, .. }
            | Commands::Render { page, .. } => page.as_ref(),
            Commands::Config {
                command: ConfigCommands::Show { page },
            } => page.as_ref(),
            _ => None,
        }
    }
}
