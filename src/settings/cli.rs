use super::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "discover-haiti", about = "Client for the Discover Haiti API")]
pub struct Cli {
    #[arg(long)]
    pub settings: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Log in and store the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create an account and store the session
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        display_name: String,
        /// USER or PARTNER
        #[arg(long, default_value = "USER")]
        role: String,
    },
    /// Revoke the session and forget stored credentials
    Logout,
    /// Show the logged-in account
    Whoami,
    /// GET an arbitrary API path
    Get { path: String },
    /// POST a JSON body to an arbitrary API path
    Post {
        path: String,
        #[arg(long, default_value = "{}")]
        data: String,
    },
    /// DELETE an arbitrary API path
    Delete { path: String },
    #[command(subcommand)]
    Favorites(FavoritesCommand),
}

#[derive(Subcommand, Debug)]
pub enum FavoritesCommand {
    List,
    Add { kind: String, id: String },
    Remove { kind: String, id: String },
}
