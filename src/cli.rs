use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rpel")]
#[command(about = "Terminal editor for company records of the rpel training registry")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Open the interactive company editor
    Edit {
        /// Company id, 0 creates a new record
        #[arg(short, long, default_value = "0")]
        id: i64,
    },

    /// Print a company record
    Show {
        /// Company id
        #[arg(short, long)]
        id: i64,
    },

    /// Delete a company record
    Delete {
        /// Company id
        #[arg(short, long)]
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Commands {
    /// Whether the command takes over the terminal
    pub fn is_interactive(&self) -> bool {
        matches!(self, Commands::Edit { .. })
    }

    /// Record id the command works on, rejecting ids a stored record cannot have
    pub fn stored_id(id: i64) -> Result<i64, anyhow::Error> {
        if id > 0 {
            Ok(id)
        } else {
            Err(anyhow::anyhow!("Company id must be positive, got {}", id))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_defaults_to_new_record() {
        let cli = Cli::try_parse_from(["rpel", "edit"]).unwrap();
        assert_eq!(cli.command, Commands::Edit { id: 0 });
        assert!(cli.command.is_interactive());
    }

    #[test]
    fn test_delete_flags() {
        let cli = Cli::try_parse_from(["rpel", "delete", "--id", "12", "--yes"]).unwrap();
        assert_eq!(cli.command, Commands::Delete { id: 12, yes: true });
        assert!(!cli.command.is_interactive());
    }

    #[test]
    fn test_show_requires_id() {
        assert!(Cli::try_parse_from(["rpel", "show"]).is_err());
        assert!(Commands::stored_id(0).is_err());
        assert_eq!(Commands::stored_id(7).unwrap(), 7);
    }
}
