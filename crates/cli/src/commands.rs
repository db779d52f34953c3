use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Connect with the settings file and print the server version
    TestConn {
        #[arg(long, help = "Settings file path")]
        config: String,
    },
    /// Run a write session over a JSON array of data events
    Load {
        #[arg(long, help = "Settings file path")]
        config: String,

        #[arg(long, help = "JSON file holding the ordered data events")]
        events: String,

        #[arg(
            long,
            help = "If specified, writes committed offsets to this file instead of stdout"
        )]
        output: Option<String>,
    },
    /// Print the incremental read query for the destination table
    ReadQuery {
        #[arg(long, help = "Settings file path")]
        config: String,

        #[arg(long, help = "JSON file holding the offset to resume from")]
        offset: Option<String>,

        #[arg(long, help = "Run the query and print the fetched batches")]
        execute: bool,
    },
}
