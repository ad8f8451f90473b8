//! Line-based interactive chat.

use std::error::Error;
use std::io::Write;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::cli::render::print_entries;
use crate::core::client::ChatClient;
use crate::core::dispatcher::DispatchOutcome;
use crate::core::timeline::TimelineEntry;

const PROMPT: &str = "> ";

/// What a single input line asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum LineCommand<'a> {
    Quit,
    History,
    Resume,
    Help,
    Send(&'a str),
    Empty,
}

pub fn parse_line(line: &str) -> LineCommand<'_> {
    let trimmed = line.trim();
    match trimmed {
        "" => LineCommand::Empty,
        "/quit" | "/exit" => LineCommand::Quit,
        "/history" => LineCommand::History,
        "/resume" => LineCommand::Resume,
        "/help" => LineCommand::Help,
        _ => LineCommand::Send(trimmed),
    }
}

fn prompt() -> std::io::Result<()> {
    print!("{PROMPT}");
    std::io::stdout().flush()
}

fn emit_fresh<F>(client: &ChatClient, last_seen: &mut Option<u64>, emit: &mut F)
where
    F: FnMut(&[TimelineEntry]),
{
    let fresh = client.entries_after(*last_seen);
    if let Some(entry) = fresh.last() {
        *last_seen = Some(entry.seq);
        emit(&fresh);
    }
}

/// Sends `text`, handing the optimistic entry to `emit` while the request is
/// in flight and the reply (or notice) once it settles.
pub async fn send_with_echo<F>(
    client: &ChatClient,
    text: &str,
    last_seen: &mut Option<u64>,
    mut emit: F,
) -> DispatchOutcome
where
    F: FnMut(&[TimelineEntry]),
{
    let send = client.send(text);
    tokio::pin!(send);
    let outcome = tokio::select! {
        biased;
        outcome = &mut send => outcome,
        _ = tokio::task::yield_now() => {
            emit_fresh(client, last_seen, &mut emit);
            send.await
        }
    };
    emit_fresh(client, last_seen, &mut emit);
    outcome
}

pub async fn run_chat(client: &ChatClient) -> Result<(), Box<dyn Error>> {
    if !client.is_authenticated() {
        eprintln!("⚠️  Not signed in. Run 'lilith login' first; messages will not be sent.");
    }

    client.start().await;
    let session = client.session();
    match (&session.name, session.id) {
        (Some(name), _) => println!("💬 {name}"),
        (None, Some(id)) => println!("💬 Session {id}"),
        (None, None) => println!("💬 New conversation"),
    }
    let entries = client.snapshot();
    print_entries(&entries);
    let mut last_seen = entries.last().map(|entry| entry.seq);
    println!("Type /help for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match parse_line(&line) {
            LineCommand::Empty => continue,
            LineCommand::Quit => break,
            LineCommand::Help => {
                println!("/history  reprint the conversation");
                println!("/resume   reload the conversation from the server");
                println!("/quit     leave");
                continue;
            }
            LineCommand::History => {
                let entries = client.snapshot();
                print_entries(&entries);
                last_seen = entries.last().map(|entry| entry.seq);
                continue;
            }
            LineCommand::Resume => {
                if client.resume().await.is_none() {
                    eprintln!("⚠️  Could not reload the conversation");
                }
                let entries = client.snapshot();
                print_entries(&entries);
                last_seen = entries.last().map(|entry| entry.seq);
                continue;
            }
            LineCommand::Send(text) => {
                let outcome = send_with_echo(client, text, &mut last_seen, print_entries).await;
                if outcome == DispatchOutcome::Unauthenticated {
                    eprintln!("⚠️  Run 'lilith login' to sign in.");
                }
            }
        }
    }
    Ok(())
}
