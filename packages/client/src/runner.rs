//! Line-oriented terminal front end.
//!
//! Input is read by rustyline on a dedicated thread and forwarded to the
//! async loop, which also prints session events as they arrive.

use std::sync::Arc;

use chrono::Local;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use crate::config::ClientArgs;
use crate::error::ClientError;
use crate::event::{ChannelNotifier, SessionEvent};
use crate::session::ChatSession;

const QUIT_COMMAND: &str = "/quit";

/// Render one event as a terminal line.
pub fn format_event(event: &SessionEvent, time: &str) -> String {
    match event {
        SessionEvent::Joined { display_name } => format!("[{time}] * {display_name} joined"),
        SessionEvent::Left { display_name } => format!("[{time}] * {display_name} left"),
        SessionEvent::Message { sender, text } => format!("[{time}] {sender}: {text}"),
        SessionEvent::Disconnected(cause) => format!("[{time}] * disconnected ({cause})"),
        SessionEvent::Failure(error) => format!("[{time}] ! {error}"),
    }
}

fn print_event(event: &SessionEvent) {
    let time = Local::now().format("%H:%M:%S").to_string();
    let line = format_event(event, &time);
    if matches!(event, SessionEvent::Failure(_)) {
        eprintln!("{line}");
    } else {
        println!("{line}");
    }
}

fn spawn_input_reader(mut editor: DefaultEditor) -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    // A plain thread: rustyline blocks, and the process must be able to exit
    // while it is still waiting for input.
    std::thread::spawn(move || {
        loop {
            match editor.readline("") {
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => {
                    tracing::error!("Failed to read input: {}", e);
                    break;
                }
            }
        }
    });
    rx
}

/// Log in, relay input lines as messages until `/quit` or end of input,
/// then log out.
pub async fn run_client(args: ClientArgs) -> Result<(), ClientError> {
    let (notifier, mut events) = ChannelNotifier::new();
    let mut session = ChatSession::new(args.session_config(), Arc::new(notifier));
    let editor = DefaultEditor::new()?;

    if let Err(e) = session.login(&args.host, args.port, &args.name).await {
        while let Ok(event) = events.try_recv() {
            print_event(&event);
        }
        return Err(e);
    }
    println!(
        "Connected to {}:{} as '{}'. Type {} to leave.",
        args.host, args.port, args.name, QUIT_COMMAND
    );

    let mut lines = spawn_input_reader(editor);
    loop {
        tokio::select! {
            line = lines.recv() => match line {
                Some(line) if line.trim() == QUIT_COMMAND => break,
                Some(line) if line.trim().is_empty() => {}
                Some(line) => {
                    if let Err(e) = session.send(&line) {
                        eprintln!("{e}");
                    }
                }
                None => break,
            },
            event = events.recv() => match event {
                Some(event) => {
                    print_event(&event);
                    if matches!(event, SessionEvent::Disconnected(_)) {
                        return Ok(());
                    }
                }
                None => return Ok(()),
            },
        }
    }

    if let Err(e) = session.logout().await {
        tracing::warn!("Logout incomplete: {}", e);
    }
    while let Ok(event) = events.try_recv() {
        print_event(&event);
    }
    Ok(())
}
