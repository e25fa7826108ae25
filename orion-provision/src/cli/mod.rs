//! Command-line interface

pub mod commands;

use clap::Parser;

use commands::provision::ProvisionArgs;

/// Bulk-provision SolarWinds Orion nodes from a spreadsheet.
///
/// Each row creates a node with SNMPv3 credentials, assigns the standard
/// pollers, sets the remaining columns as custom properties, polls the node
/// and registers it with NCM.
///
/// Blank ConnectionProfile, DeviceTemplate or NodeGroup cells keep the NCM
/// node's current value; they do not clear it.
#[derive(Parser, Debug)]
#[command(name = "orion-provision", version, about, long_about)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(flatten)]
    pub provision: ProvisionArgs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FailurePolicy;
    use clap::CommandFactory;
    use std::path::PathBuf;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "orion-provision",
            "-vv",
            "--file",
            "nodes.xlsx",
            "--on-error",
            "skip",
            "--dry-run",
            "--report",
            "out.csv",
        ]);

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.provision.file, Some(PathBuf::from("nodes.xlsx")));
        assert_eq!(cli.provision.on_error, Some(FailurePolicy::Skip));
        assert!(cli.provision.dry_run);
        assert_eq!(cli.provision.report, Some(PathBuf::from("out.csv")));
        assert_eq!(cli.provision.sheet, None);
    }

    #[test]
    fn test_long_help_explains_blank_ncm_cells() {
        let help = Cli::command()
            .get_long_about()
            .map(|about| about.to_string())
            .unwrap_or_default();

        assert!(help.contains("keep the NCM"));
    }

    #[test]
    fn test_rejects_unknown_policy() {
        assert!(Cli::try_parse_from(["orion-provision", "--on-error", "retry"]).is_err());
    }
}
