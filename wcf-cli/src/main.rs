//! WCF CLI - Command line tool for forecasting account water consumption.

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "wcf-cli",
    version,
    about = "Water consumption forecasting and bill estimation toolkit"
)]
struct Cli {
    #[command(subcommand)]
    command: wcf_cmd::Command,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    log::debug!("wcf-cli {}", env!("CARGO_PKG_VERSION"));
    wcf_cmd::run(cli.command)
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_report_arguments() {
        use clap::Parser;
        let cli = Cli::try_parse_from([
            "wcf-cli", "report", "--data", "data.csv", "--account", "1001", "--service-type", "D",
            "--horizon", "14", "--json",
        ])
        .unwrap();
        match cli.command {
            wcf_cmd::Command::Report { args, service_type, json, threshold } => {
                assert_eq!(args.account, "1001");
                assert_eq!(args.horizon, 14);
                assert_eq!(service_type, "D");
                assert!(json);
                assert_eq!(threshold, 2.0);
            }
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn test_parses_sections_arguments() {
        use clap::Parser;
        let cli = Cli::try_parse_from([
            "wcf-cli", "sections", "-d", "data.csv", "-s", "0801901", "--from", "2024-01-01",
        ])
        .unwrap();
        match cli.command {
            wcf_cmd::Command::Sections { args } => {
                assert_eq!(args.section, "0801901");
                assert_eq!(args.from.as_deref(), Some("2024-01-01"));
                assert_eq!(args.to, None);
                assert_eq!(args.price, 1.5);
            }
            _ => panic!("expected sections command"),
        }
    }
}
