use super::*;

#[test]
fn parses_catalog_refresh_defaults() {
    let cli = Cli::try_parse_from(["pointtracker-cli", "catalog", "refresh"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Catalog {
            command: CatalogCommands::Refresh { ai: false }
        }
    ));
}

#[test]
fn parses_catalog_refresh_with_ai() {
    let cli = Cli::try_parse_from(["pointtracker-cli", "catalog", "refresh", "--ai"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Catalog {
            command: CatalogCommands::Refresh { ai: true }
        }
    ));
}

#[test]
fn parses_catalog_stats() {
    let cli = Cli::try_parse_from(["pointtracker-cli", "catalog", "stats"])
        .expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Commands::Catalog {
            command: CatalogCommands::Stats
        }
    ));
}

#[test]
fn parses_card_with_flags() {
    let cli = Cli::try_parse_from([
        "pointtracker-cli",
        "card",
        "https://milesopedia.com/cartes-de-credit/carte-td-aeroplan-visa-infinite/",
        "--ai",
        "--save",
    ])
    .expect("expected valid cli args");

    match cli.command {
        Commands::Card { url, ai, save } => {
            assert!(url.ends_with("/carte-td-aeroplan-visa-infinite/"));
            assert!(ai);
            assert!(save);
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn card_requires_a_url() {
    assert!(Cli::try_parse_from(["pointtracker-cli", "card"]).is_err());
}

#[test]
fn missing_subcommand_is_an_error() {
    assert!(Cli::try_parse_from(["pointtracker-cli"]).is_err());
}
