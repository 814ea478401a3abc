// Chatline terminal client

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use chatline_client::{ApiClient, ChatMessage, ChatSession, ClientConfig, Sender};

const HELP: &str = "Commands: /save  /list  /load <id>  /new  /help  /quit";

fn print_messages(messages: &[ChatMessage]) {
    for message in messages {
        let prefix = match message.sender {
            Sender::User => "you",
            Sender::Ai => "ai",
            Sender::System => "note",
        };
        println!("[{}] {}", prefix, message.text);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = ClientConfig::from_env();
    let client = ApiClient::new(&config);
    let mut session = ChatSession::new();
    let mut saved_id: Option<String> = None;

    println!("Connected to {}", config.api_url);
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();

        match input.split_once(' ').unwrap_or((input, "")) {
            ("/quit", _) => break,
            ("/help", _) => println!("{}", HELP),
            ("/new", _) => {
                session.clear();
                saved_id = None;
                println!("Started a new conversation");
            }
            ("/save", _) => {
                if session.messages().is_empty() {
                    println!("Nothing to save yet");
                    continue;
                }
                let result = match &saved_id {
                    Some(id) => client.update(id, session.messages()).await,
                    None => client.save(session.messages()).await,
                };
                match result {
                    Ok(saved) => {
                        println!("Saved as {}", saved.id);
                        saved_id = Some(saved.id);
                    }
                    Err(e) => println!("Save failed: {}", e),
                }
            }
            ("/list", _) => match client.list().await {
                Ok(conversations) if conversations.is_empty() => {
                    println!("No saved conversations")
                }
                Ok(conversations) => {
                    for conversation in conversations {
                        let preview = conversation
                            .messages
                            .first()
                            .map(|m| m.text.chars().take(40).collect::<String>())
                            .unwrap_or_default();
                        println!(
                            "{}  {}  {}",
                            conversation.id,
                            conversation.updated_at.format("%Y-%m-%d %H:%M"),
                            preview
                        );
                    }
                }
                Err(e) => println!("List failed: {}", e),
            },
            ("/load", id) if !id.trim().is_empty() => match client.get(id.trim()).await {
                Ok(conversation) => {
                    saved_id = Some(conversation.id);
                    session = ChatSession::with_messages(conversation.messages);
                    print_messages(session.take_unseen());
                }
                Err(e) => println!("Load failed: {}", e),
            },
            ("/load", _) => println!("Usage: /load <id>"),
            _ => {
                if session.submit(&client, input).await {
                    // The user's own line is already on screen
                    let unseen = session.take_unseen();
                    print_messages(unseen.get(1..).unwrap_or_default());
                }
            }
        }
    }

    Ok(())
}
