//! WebSocket client session management.

use std::sync::{Arc, Mutex};

use futures_util::{SinkExt, StreamExt};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

use crate::client::command::parse_command;
use crate::client::error::ClientError;
use crate::client::formatter::{EventFormatter, redisplay_prompt};
use crate::infrastructure::dto::websocket::ServerEvent;

/// Run the WebSocket client session
pub async fn run_client_session(
    url: &str,
    client_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    // Construct URL with client_id as query parameter
    let url = format!("{}?client_id={}", url, client_id);

    let (ws_stream, response) = match connect_async(&url).await {
        Ok(result) => result,
        Err(e) => {
            // Check if it's an HTTP error response
            let error_msg = e.to_string();

            // Check for HTTP 409 Conflict
            if error_msg.contains("409") || error_msg.contains("Conflict") {
                return Err(Box::new(ClientError::DuplicateClientId(
                    client_id.to_string(),
                )));
            }

            return Err(Box::new(ClientError::ConnectionError(error_msg)));
        }
    };

    // Check HTTP status code from response
    if response.status().as_u16() == 409 {
        return Err(Box::new(ClientError::DuplicateClientId(
            client_id.to_string(),
        )));
    }

    tracing::info!("Connected to session server!");
    println!(
        "\nYou are '{}'. Type /help for the command list. Press Ctrl+C to exit.\n",
        client_id
    );

    let (mut write, mut read) = ws_stream.split();

    // Room currently joined, shared between the read task (which learns the
    // id from roomCreated/roomJoined) and the command mapper
    let joined_room: Arc<Mutex<Option<String>>> = Arc::new(Mutex::new(None));

    // Clone for the read task
    let client_id_for_read = client_id.to_string();
    let joined_room_for_read = joined_room.clone();

    // Spawn a task to handle incoming events
    let mut read_task = tokio::spawn(async move {
        let mut connection_error = false;

        while let Some(message) = read.next().await {
            match message {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<ServerEvent>(&text) {
                        Ok(event) => {
                            // Track the joined room for outgoing commands
                            match &event {
                                ServerEvent::RoomCreated { room }
                                | ServerEvent::RoomJoined { room } => {
                                    if let Ok(mut joined) = joined_room_for_read.lock() {
                                        *joined = Some(room.id.clone());
                                    }
                                }
                                _ => {}
                            }

                            let formatted =
                                EventFormatter::format_event(&event, &client_id_for_read);
                            print!("{}", formatted);
                            redisplay_prompt(&client_id_for_read);
                        }
                        Err(_) => {
                            print!("{}", EventFormatter::format_raw_message(&text));
                            redisplay_prompt(&client_id_for_read);
                        }
                    }
                }
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    connection_error = true;
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    connection_error = true;
                    break;
                }
                _ => {}
            }
        }

        connection_error
    });

    // Clone for the input loop
    let client_id = client_id.to_string();
    let client_id_for_prompt = client_id.clone();

    // Create channel for rustyline input
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<String>();

    // Spawn a blocking thread for rustyline (synchronous readline)
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", client_id_for_prompt);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        rl.add_history_entry(line).ok();
                        if input_tx.send(line.to_string()).is_err() {
                            // Channel closed, exit thread
                            break;
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    // Ctrl+C
                    tracing::info!("Interrupted");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    // Ctrl+D
                    tracing::info!("EOF");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {}", err);
                    break;
                }
            }
        }
    });

    // Spawn a task to map input lines to protocol events and send them
    let joined_room_for_write = joined_room.clone();
    let mut write_task = tokio::spawn(async move {
        let mut write_error = false;

        while let Some(line) = input_rx.recv().await {
            if !line.starts_with('/') {
                println!("commands start with '/', try /help");
                continue;
            }

            let command = match parse_command(&line) {
                Ok(command) => command,
                Err(message) => {
                    println!("{}", message);
                    continue;
                }
            };

            let room_id = joined_room_for_write
                .lock()
                .ok()
                .and_then(|joined| joined.clone());
            let event = match command.to_event(room_id.as_deref()) {
                Ok(event) => event,
                Err(message) => {
                    // /help lands here as well: the message is the help text
                    println!("{}", message);
                    continue;
                }
            };

            let json = match serde_json::to_string(&event) {
                Ok(json) => json,
                Err(e) => {
                    tracing::error!("Failed to serialize event: {}", e);
                    continue;
                }
            };

            if let Err(e) = write.send(Message::Text(json.into())).await {
                tracing::warn!("Failed to send event: {}", e);
                write_error = true;
                break;
            }
        }

        write_error
    });

    // If any one of the tasks completes, abort the other
    tokio::select! {
        read_result = &mut read_task => {
            write_task.abort();
            let connection_error = read_result.unwrap_or(false);
            if connection_error {
                return Err(Box::new(ClientError::ConnectionError(
                    "Connection lost".to_string(),
                )));
            }
        }
        write_result = &mut write_task => {
            read_task.abort();
            let write_error = write_result.unwrap_or(false);
            if write_error {
                return Err(Box::new(ClientError::ConnectionError(
                    "Connection lost".to_string(),
                )));
            }
        }
    }

    Ok(())
}
