use crate::app::action::Action;
use crate::app::event::AppEvent;
use crate::app::state::AppState;
use crate::irc::commands::{self, ParsedCommand, HELP_TEXT};
use crate::irc::message::IrcMessage;
use crate::irc::session::SessionEvent;

/// Turn one application event into the actions the main loop should run.
/// Transport events never reach this function; they go to the session.
pub fn handle_event(state: &mut AppState, event: AppEvent) -> Vec<Action> {
    let actions = match event {
        AppEvent::Transport(..) => vec![],
        AppEvent::Session(event) => handle_session_event(state, event),
        AppEvent::Input(line) => handle_input(state, &line),
        AppEvent::InputClosed => vec![Action::Quit],
    };

    if actions.contains(&Action::Quit) {
        state.should_quit = true;
    }
    actions
}

fn handle_session_event(state: &mut AppState, event: SessionEvent) -> Vec<Action> {
    match event {
        SessionEvent::HandshakeCompleted => {
            let mut actions = vec![print("Registered with server.")];
            for channel in &state.autojoin {
                actions.push(Action::Join {
                    channel: channel.clone(),
                });
            }
            if state.current_channel.is_none() {
                state.current_channel = state.autojoin.first().cloned();
            }
            actions
        }
        SessionEvent::MessageReceived(message) => {
            let line = describe(&message);
            vec![Action::Print { line }, Action::Transcribe { message }]
        }
        SessionEvent::SessionClosed => vec![print("Session closed."), Action::Quit],
        SessionEvent::TransportError(error) => vec![print(format!("Connection error: {}", error))],
    }
}

fn handle_input(state: &mut AppState, line: &str) -> Vec<Action> {
    let line = line.trim_end();
    if line.trim().is_empty() {
        return vec![];
    }

    if !line.starts_with('/') {
        return match state.current_channel.clone() {
            Some(target) => say(state, target, line.to_string()),
            None => vec![print("No channel joined. Use /join <#channel>.")],
        };
    }

    match commands::parse_command(line) {
        Some(ParsedCommand::Join { channel }) => {
            state.current_channel = Some(channel.clone());
            vec![Action::Join { channel }]
        }
        Some(ParsedCommand::Msg { target, text }) => say(state, target, text),
        Some(ParsedCommand::Raw { command }) => vec![Action::SendRaw { command }],
        Some(ParsedCommand::Quit) => vec![Action::Quit],
        Some(ParsedCommand::Help) => HELP_TEXT.iter().map(|l| print(*l)).collect(),
        None => vec![print(format!("Unknown command: {}", line))],
    }
}

fn say(state: &AppState, target: String, text: String) -> Vec<Action> {
    let echo = format!("[{}] <{}> {}", target, state.nickname, text);
    vec![Action::SendMessage { target, text }, print(echo)]
}

fn print(line: impl Into<String>) -> Action {
    Action::Print { line: line.into() }
}

/// Render an inbound message for the terminal.
pub fn describe(message: &IrcMessage) -> String {
    let nick = message.nick().unwrap_or("*");
    match message.command.as_str() {
        "PRIVMSG" => format!(
            "[{}] <{}> {}",
            message.target().unwrap_or("?"),
            nick,
            message.trailing().unwrap_or_default()
        ),
        "NOTICE" => format!("-{}- {}", nick, message.trailing().unwrap_or_default()),
        "JOIN" => format!("* {} joined {}", nick, message.parameters.trim_start_matches(':')),
        "PART" => format!("* {} left {}", nick, message.target().unwrap_or("?")),
        _ if message.is_numeric() => format!(
            "[{}] {}",
            message.command,
            message.trailing().unwrap_or(message.parameters.as_str())
        ),
        _ => message.to_string(),
    }
}
