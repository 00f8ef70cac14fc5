//! CLI command definitions
//!
//! Defines the clap commands for the scenario CLI.

use clap::Subcommand;
use std::path::PathBuf;

use crate::model::{Category, Priority};

#[derive(Subcommand)]
pub enum Commands {
    /// List scenarios
    #[command(alias = "ls")]
    List {
        /// Only show scenarios in this category
        #[arg(long, value_enum)]
        category: Option<Category>,

        /// Case-insensitive search over name and description
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one scenario in full
    Show {
        /// Scenario id
        id: String,
    },

    /// Create a new scenario
    Create {
        /// Scenario name
        #[arg(long)]
        name: String,

        /// Free-form description
        #[arg(long, default_value = "")]
        description: String,

        /// Scenario category
        #[arg(long, value_enum)]
        category: Option<Category>,

        /// Scenario priority (default: medium)
        #[arg(long, value_enum)]
        priority: Option<Priority>,

        /// Test step, in order; repeat for each step
        #[arg(long = "step")]
        steps: Vec<String>,

        /// Expected results text
        #[arg(long)]
        expected: String,

        /// Test data as a JSON document
        #[arg(long)]
        data: Option<String>,
    },

    /// Edit an existing scenario; omitted fields are preserved
    Edit {
        /// Scenario id
        id: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, value_enum)]
        category: Option<Category>,

        #[arg(long, value_enum)]
        priority: Option<Priority>,

        /// Replacement steps, in order; repeat for each step
        #[arg(long = "step")]
        steps: Vec<String>,

        #[arg(long)]
        expected: Option<String>,

        #[arg(long)]
        data: Option<String>,
    },

    /// Delete a scenario
    #[command(alias = "rm")]
    Delete {
        /// Scenario id
        id: String,
    },

    /// Toggle a scenario in the run selection, or show the selection
    Select {
        /// Scenario id to toggle; prints the current selection when
        /// omitted
        id: Option<String>,

        /// Clear the whole selection
        #[arg(long)]
        clear: bool,
    },

    /// Run the selected scenarios
    Run {
        /// Capture a simulated screenshot for each passing scenario
        #[arg(long)]
        screenshots: bool,
    },

    /// Show the saved run history
    Results {
        /// Show at most this many runs
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },

    /// Export all scenarios to a JSON file
    Export {
        /// Output file path
        output: PathBuf,
    },

    /// Import scenarios from a JSON file
    Import {
        /// Path to a JSON array of scenario records
        path: PathBuf,
    },

    /// Export a report of the most recent run
    Report {
        /// Output file path
        output: PathBuf,
    },
}
