use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["prospect-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["prospect-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["prospect-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn discover_defaults_to_new_campaign_against_database() {
    let cli = Cli::try_parse_from(["prospect-cli", "discover"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Discover {
            campaign: None,
            resume: None,
            dry_run: false
        })
    ));
}

#[test]
fn discover_accepts_campaign_resume_and_dry_run() {
    let cli = Cli::try_parse_from([
        "prospect-cli",
        "discover",
        "--campaign",
        "config/campaign.yaml",
        "--resume",
        "42",
        "--dry-run",
    ])
    .unwrap();

    let Some(Commands::Discover {
        campaign,
        resume,
        dry_run,
    }) = cli.command
    else {
        panic!("expected discover command");
    };
    assert_eq!(campaign, Some(PathBuf::from("config/campaign.yaml")));
    assert_eq!(resume, Some(42));
    assert!(dry_run);
}

#[test]
fn resume_id_must_be_numeric() {
    let err = Cli::try_parse_from(["prospect-cli", "discover", "--resume", "abc"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
}
