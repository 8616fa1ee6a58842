use discover_haiti::app::App;
use discover_haiti::application_port::*;
use discover_haiti::domain_model::*;
use discover_haiti::logger::*;
use discover_haiti::settings::*;
use reqwest::Method;
use serde::Serialize;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    debug!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let app = App::try_new(&project_settings)?;

    match run(&app, cli.command).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if let Some(client_error) = client_error_of(&e) {
                if client_error.is_pending_approval() {
                    eprintln!("Your partner account is still awaiting approval.");
                    std::process::exit(3);
                }
                if client_error.is_terminal_auth() {
                    eprintln!("Session expired. Run `discover-haiti login` again.");
                    std::process::exit(2);
                }
            }
            Err(e)
        }
    }
}

fn client_error_of(error: &anyhow::Error) -> Option<&ClientError> {
    error.downcast_ref::<ClientError>().or_else(|| {
        error.downcast_ref::<AuthError>().and_then(|e| match e {
            AuthError::Client(client_error) => Some(client_error),
            _ => None,
        })
    })
}

async fn run(app: &App, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let result = app
                .auth_service
                .login(LoginInput { email, password })
                .await?;
            print_json(&result.user)?;
        }
        Command::Register {
            email,
            password,
            display_name,
            role,
        } => {
            let role: Role = serde_json::from_value(serde_json::Value::String(role.to_uppercase()))
                .map_err(|_| anyhow::anyhow!("Unknown role: {}", role))?;
            let result = app
                .auth_service
                .register(RegisterInput {
                    email,
                    password,
                    display_name,
                    role,
                })
                .await?;
            print_json(&result.user)?;
        }
        Command::Logout => {
            app.auth_service.logout().await?;
            eprintln!("Logged out.");
        }
        Command::Whoami => {
            let user = app.auth_service.current_user().await?;
            print_json(&user)?;
        }
        Command::Get { path } => {
            let response = app
                .api
                .request(Method::GET, &path, None, RequestOptions::default())
                .await?;
            print_json(&response.json::<serde_json::Value>()?)?;
        }
        Command::Post { path, data } => {
            let body: serde_json::Value = serde_json::from_str(&data)?;
            let response = app
                .api
                .request(Method::POST, &path, Some(body), RequestOptions::default())
                .await?;
            print_json(&response.json::<serde_json::Value>()?)?;
        }
        Command::Delete { path } => {
            let response = app
                .api
                .request(Method::DELETE, &path, None, RequestOptions::default())
                .await?;
            print_json(&response.json::<serde_json::Value>()?)?;
        }
        Command::Favorites(FavoritesCommand::List) => {
            let favorites = app.favorite_service.list().await?;
            print_json(&favorites)?;
        }
        Command::Favorites(FavoritesCommand::Add { kind, id }) => {
            let target = favorite_target(&kind, id)?;
            let favorite = app.favorite_service.add(&target).await?;
            print_json(&favorite)?;
        }
        Command::Favorites(FavoritesCommand::Remove { kind, id }) => {
            let target = favorite_target(&kind, id)?;
            app.favorite_service.remove(&target).await?;
            eprintln!("Removed.");
        }
    }
    Ok(())
}

fn favorite_target(kind: &str, id: String) -> anyhow::Result<FavoriteTarget> {
    let kind: FavoriteKind = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    Ok(FavoriteTarget::new(kind, id))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
