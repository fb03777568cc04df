use std::{process, sync::Arc};

use pressroom::{
    application::{
        context::{ApplicationContext, Repositories},
        error::AppError,
        seed::SeedError,
        syndication::FeedChannel,
        users::UserError,
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, AppState},
        telemetry,
    },
};
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(error.exit_code());
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    let app = build_application_context(&settings).await?;

    match command {
        config::Command::Serve(_) => serve_http(&settings, app).await,
        config::Command::CreateUser(args) => run_create_user(&app, args).await,
        config::Command::IssueToken(args) => run_issue_token(&app, args).await,
        config::Command::InitData(_) => run_init_data(&app).await,
    }
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::database(err.to_string())))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

async fn build_application_context(
    settings: &config::Settings,
) -> Result<ApplicationContext, AppError> {
    let repositories = init_repositories(settings).await?;
    let channel = FeedChannel {
        title: settings.site.title.clone(),
        description: settings.site.description.clone(),
        public_url: settings.site.public_url.clone(),
    };
    Ok(ApplicationContext::new(
        Repositories::from_store(repositories),
        channel,
    ))
}

async fn run_create_user(
    app: &ApplicationContext,
    args: config::CreateUserArgs,
) -> Result<(), AppError> {
    let user = app
        .users
        .register(&args.username, args.staff)
        .await
        .map_err(user_error)?;
    let issued = app
        .users
        .issue_token(&user.username)
        .await
        .map_err(user_error)?;

    info!(
        target = "pressroom::cli",
        username = %user.username,
        is_staff = user.is_staff,
        "user created"
    );
    println!("{}", issued.token);
    Ok(())
}

async fn run_issue_token(
    app: &ApplicationContext,
    args: config::IssueTokenArgs,
) -> Result<(), AppError> {
    let issued = app
        .users
        .issue_token(&args.username)
        .await
        .map_err(user_error)?;

    info!(
        target = "pressroom::cli",
        username = %issued.user.username,
        "token issued"
    );
    println!("{}", issued.token);
    Ok(())
}

async fn run_init_data(app: &ApplicationContext) -> Result<(), AppError> {
    let report = app.seed.run().await.map_err(|err| match err {
        SeedError::Users(err) => user_error(err),
        other => AppError::unexpected(other.to_string()),
    })?;

    if report.created_posts.is_empty() {
        println!("sample data already present");
    } else {
        for title in &report.created_posts {
            println!("created post: {title}");
        }
    }
    Ok(())
}

fn user_error(err: UserError) -> AppError {
    match err {
        UserError::Validation(err) => AppError::Domain(err),
        UserError::UsernameTaken(_) | UserError::NotFound => AppError::validation(err.to_string()),
        other => AppError::unexpected(other.to_string()),
    }
}

async fn serve_http(settings: &config::Settings, app: ApplicationContext) -> Result<(), AppError> {
    let router = http::build_router(AppState::from(app));

    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;
    info!(
        target = "pressroom::http",
        addr = %settings.server.addr,
        "listening"
    );

    let shutdown = Arc::new(Notify::new());
    let server = axum::serve(listener, router.into_make_service()).with_graceful_shutdown({
        let shutdown = shutdown.clone();
        async move { shutdown.notified().await }
    });
    let mut server = std::pin::pin!(server.into_future());

    let signal = tokio::select! {
        result = &mut server => {
            return result.map_err(|err| AppError::unexpected(format!("server error: {err}")));
        }
        signal = tokio::signal::ctrl_c() => signal,
    };

    if let Err(err) = signal {
        warn!(
            target = "pressroom::http",
            error = %err,
            "failed to listen for shutdown signal"
        );
        return server
            .await
            .map_err(|err| AppError::unexpected(format!("server error: {err}")));
    }

    info!(target = "pressroom::http", "shutdown requested");
    shutdown.notify_one();

    match tokio::time::timeout(settings.server.graceful_shutdown, server).await {
        Ok(result) => {
            result.map_err(|err| AppError::unexpected(format!("server error: {err}")))
        }
        Err(_) => {
            warn!(
                target = "pressroom::http",
                timeout_secs = settings.server.graceful_shutdown.as_secs(),
                "graceful shutdown timed out"
            );
            Ok(())
        }
    }
}
