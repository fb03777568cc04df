use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_are_usable() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert_eq!(settings.server.addr.to_string(), "127.0.0.1:3000");
    assert_eq!(settings.server.graceful_shutdown, Duration::from_secs(30));
    assert_eq!(settings.database.max_connections.get(), 8);
    assert!(settings.database.url.is_none());
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert_eq!(settings.site.title, "pressroom");
    assert_eq!(settings.site.public_url.as_str(), "http://localhost:3000/");
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn public_url_gains_trailing_slash() {
    let mut raw = RawSettings::default();
    raw.site.public_url = Some("https://example.com/blog".to_string());

    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(settings.site.public_url.as_str(), "https://example.com/blog/");
}

#[test]
fn public_url_rejects_other_schemes() {
    let mut raw = RawSettings::default();
    raw.site.public_url = Some("ftp://example.com/".to_string());

    let err = Settings::from_raw(raw).expect_err("ftp is not served");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "site.public_url",
            ..
        }
    ));
}

#[test]
fn zero_pool_size_is_rejected() {
    let mut raw = RawSettings::default();
    raw.database.max_connections = Some(0);

    let err = Settings::from_raw(raw).expect_err("zero connections");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "database.max_connections",
            ..
        }
    ));
}

#[test]
fn blank_database_url_is_treated_as_missing() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        database_url: Some("   ".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.database.url.is_none());
}

#[test]
fn invalid_log_level_names_the_key() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());

    let err = Settings::from_raw(raw).expect_err("unknown level");
    assert!(err.to_string().contains("logging.level"));
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["pressroom"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_create_user_arguments() {
    let args = CliArgs::parse_from([
        "pressroom",
        "create-user",
        "alice",
        "--staff",
        "--database-url",
        "postgres://example",
    ]);

    match args.command.expect("create-user command") {
        Command::CreateUser(create) => {
            assert_eq!(create.username, "alice");
            assert!(create.staff);
            assert_eq!(
                create.database.database_url.as_deref(),
                Some("postgres://example")
            );
        }
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn parse_issue_token_arguments() {
    let args = CliArgs::parse_from(["pressroom", "issue-token", "bob"]);

    match args.command.expect("issue-token command") {
        Command::IssueToken(issue) => assert_eq!(issue.username, "bob"),
        other => panic!("unexpected command: {other:?}"),
    }
}

#[test]
fn serve_overrides_parse_from_flags() {
    let args = CliArgs::parse_from([
        "pressroom",
        "serve",
        "--server-port",
        "8080",
        "--log-json",
        "true",
        "--site-public-url",
        "https://blog.example.org",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_port, Some(8080));
            assert_eq!(serve.overrides.log_json, Some(true));
            assert_eq!(
                serve.overrides.site_public_url.as_deref(),
                Some("https://blog.example.org")
            );
        }
        other => panic!("unexpected command: {other:?}"),
    }
}
