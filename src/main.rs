mod app;
mod config;
mod irc;
mod logging;

use crate::app::action::Action;
use crate::app::event::AppEvent;
use crate::app::handler;
use crate::app::state::AppState;
use crate::irc::session::Session;
use crate::irc::transport::TcpTransport;
use crate::logging::ChatLogger;
use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

#[tokio::main]
async fn main() -> Result<()> {
    let cfg = config::load_config()?;
    logging::init_diagnostics(&cfg.log_level);

    if let Err(e) = run_app(cfg).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

async fn run_app(cfg: config::AppConfig) -> Result<()> {
    let (transport_tx, mut transport_rx) = mpsc::unbounded_channel();
    let (session_tx, mut session_rx) = mpsc::unbounded_channel();
    let (input_tx, mut input_rx) = mpsc::unbounded_channel::<AppEvent>();

    let transport = TcpTransport::new(cfg.server.endpoint(), transport_tx);
    let mut session = Session::new(transport, session_tx);
    let mut state = AppState::new(cfg.account.nickname.clone(), cfg.channels.clone());
    let mut chat_logger = ChatLogger::new(&cfg.logging);

    // Spawn stdin reader task
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if input_tx.send(AppEvent::Input(line)).is_err() {
                        break;
                    }
                }
                Ok(None) | Err(_) => {
                    let _ = input_tx.send(AppEvent::InputClosed);
                    break;
                }
            }
        }
    });

    let credentials = cfg.account.credentials();
    info!(
        nickname = %credentials.nickname,
        user = %credentials.user,
        real_name = %credentials.real_name,
        "registering"
    );
    println!(
        "Connecting to {}:{} as {}...",
        session.host(),
        session.port(),
        credentials.nickname
    );
    session.register(credentials);

    // Main event loop: one notification at a time
    loop {
        let event = tokio::select! {
            Some((connection, event)) = transport_rx.recv() => AppEvent::Transport(connection, event),
            Some(event) = session_rx.recv() => AppEvent::Session(event),
            Some(event) = input_rx.recv() => event,
            else => break,
        };

        let actions = match event {
            AppEvent::Transport(connection, event) => {
                session.dispatch(connection, event);
                continue;
            }
            other => handler::handle_event(&mut state, other),
        };

        for action in actions {
            match action {
                Action::Join { channel } => session.join(&channel),
                Action::SendMessage { target, text } => {
                    if target.starts_with('#') {
                        session.send_to_channel(&text, &target);
                    } else {
                        session.send_to_nickname(&text, &target);
                    }
                }
                Action::SendRaw { command } => session.send_command(&command),
                Action::Print { line } => println!("{}", line),
                Action::Transcribe { message } => chat_logger.log_message(&message),
                Action::Quit => {}
            }
        }

        if state.should_quit {
            debug!(state = ?session.state(), "quitting");
            session.close();
            break;
        }
    }

    Ok(())
}
