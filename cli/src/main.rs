mod commands;
mod util;

use clap::{Parser, Subcommand};

use commands::tools::object_input;

#[derive(Parser)]
#[command(
    name = "inboxcal",
    version,
    about = "Command-line client for the inbox & calendar tool server"
)]
struct Cli {
    /// Tool server base URL
    #[arg(long, env = "INBOXCAL_API_URL", default_value = "http://localhost:3000")]
    api_url: String,

    /// Print compact JSON instead of pretty-printed
    #[arg(long, global = true)]
    raw: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server health (`--ping` hits the plain-text liveness route)
    Health {
        #[arg(long)]
        ping: bool,
    },
    /// List the tools advertised on the discovery feed
    Discover {
        /// Print only tool names
        #[arg(long)]
        names: bool,
    },
    /// Contact directory
    Contact {
        #[command(subcommand)]
        command: ContactCommands,
    },
    /// Meeting extraction
    Meeting {
        #[command(subcommand)]
        command: MeetingCommands,
    },
    /// Email actions
    Email {
        #[command(subcommand)]
        command: EmailCommands,
    },
    /// Dispatch any tool through the A2A envelope
    Task {
        /// Tool name, e.g. sendEmail
        task: String,
        /// Tool input as JSON (object, or a JSON string for scheduleMeeting)
        #[arg(long)]
        input: String,
    },
}

#[derive(Subcommand)]
enum ContactCommands {
    /// Resolve a contact name to an email address
    Resolve { name: String },
}

#[derive(Subcommand)]
enum MeetingCommands {
    /// Extract a meeting from free text
    Schedule {
        /// e.g. "Dinner with Alina tomorrow at 6pm"
        text: String,
    },
}

#[derive(Subcommand)]
enum EmailCommands {
    /// Send an email
    Send {
        #[arg(long)]
        to: String,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        body: Option<String>,
    },
    /// Reply to a message
    Reply {
        #[arg(long)]
        message_id: String,
        #[arg(long)]
        body: String,
    },
    /// Apply a label to a message
    Label {
        #[arg(long)]
        message_id: String,
        #[arg(long)]
        label: String,
    },
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let api_url = cli.api_url.trim_end_matches('/').to_string();
    let raw = cli.raw;

    let code = match cli.command {
        Commands::Health { ping: true } => commands::health::ping(&api_url).await,
        Commands::Health { ping: false } => commands::health::run(&api_url, raw).await,
        Commands::Discover { names } => commands::discover::run(&api_url, names, raw).await,
        Commands::Contact {
            command: ContactCommands::Resolve { name },
        } => {
            let input = object_input(&[("name", Some(name.as_str()))]);
            commands::tools::call(&api_url, "resolveContact", input, raw).await
        }
        Commands::Meeting {
            command: MeetingCommands::Schedule { text },
        } => {
            let input = serde_json::Value::String(text);
            commands::tools::call(&api_url, "scheduleMeeting", input, raw).await
        }
        Commands::Email { command } => {
            let (tool, input) = match &command {
                EmailCommands::Send { to, subject, body } => (
                    "sendEmail",
                    object_input(&[
                        ("to", Some(to.as_str())),
                        ("subject", subject.as_deref()),
                        ("body", body.as_deref()),
                    ]),
                ),
                EmailCommands::Reply { message_id, body } => (
                    "replyToEmail",
                    object_input(&[
                        ("messageId", Some(message_id.as_str())),
                        ("body", Some(body.as_str())),
                    ]),
                ),
                EmailCommands::Label { message_id, label } => (
                    "labelEmail",
                    object_input(&[
                        ("messageId", Some(message_id.as_str())),
                        ("labelName", Some(label.as_str())),
                    ]),
                ),
            };
            commands::tools::call(&api_url, tool, input, raw).await
        }
        Commands::Task { task, input } => {
            let input = util::parse_json_arg("--input", &input);
            commands::tools::perform_task(&api_url, &task, input, raw).await
        }
    };

    std::process::exit(code);
}
