use clap::Parser;
use log::debug;
use trello_core::{ApiError, Client, List, DEFAULT_BASE_URL};

/// Fetch a Trello board's lists and pretty-print them.
#[derive(Parser, Debug)]
#[command(name = "trello-lists")]
#[command(version)]
struct Cli {
    /// Application key
    #[arg(short = 'k', long = "key", env = "TRELLO_KEY", default_value = "")]
    key: String,

    /// User authentication token
    #[arg(short = 't', long = "token", env = "TRELLO_TOKEN", default_value = "")]
    token: String,

    /// Board to retrieve
    #[arg(short = 'b', long = "board", env = "TRELLO_BOARD", default_value = "")]
    board: String,

    /// API host, e.g. a local mock server
    #[arg(long, env = "TRELLO_BASE_URL", default_value = DEFAULT_BASE_URL, hide = true)]
    base_url: String,
}

fn fetch_lists(cli: &Cli) -> Result<Vec<Box<dyn List>>, ApiError> {
    let client = Client::builder(cli.key.as_str(), cli.token.as_str())
        .base_url(cli.base_url.as_str())
        .build();
    debug!("fetching board {} via {}", cli.board, client.base_url());

    let board = client.board_service().get_board(&cli.board)?;
    board.lists()
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    // Errors are reported on stdout and the process still exits 0.
    match fetch_lists(&cli) {
        Ok(lists) => println!("{lists:#?}"),
        Err(err) => println!("err: {err}"),
    }
}
