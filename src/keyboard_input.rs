use crate::app::UserCommand;
use crate::error::{DojoError, Result};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::{self, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Map a key to the command it triggers
pub fn command_for_key(code: KeyCode) -> Option<UserCommand> {
    match code {
        KeyCode::Char(' ') => Some(UserCommand::Record),
        KeyCode::Char('b') | KeyCode::Backspace => Some(UserCommand::Back),
        KeyCode::Char('p') => Some(UserCommand::PlayPause),
        KeyCode::Char('f') | KeyCode::Right => Some(UserCommand::Faster),
        KeyCode::Char('r') | KeyCode::Left => Some(UserCommand::Slower),
        KeyCode::Char('s') => Some(UserCommand::SwapCamera),
        KeyCode::Char('q') | KeyCode::Esc => Some(UserCommand::Quit),
        _ => None,
    }
}

/// Raw-mode terminal reader that turns key presses into [`UserCommand`]s
pub struct KeyboardInputHandler {
    commands: mpsc::UnboundedSender<UserCommand>,
    cancellation_token: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl KeyboardInputHandler {
    pub fn new(commands: mpsc::UnboundedSender<UserCommand>) -> Self {
        Self {
            commands,
            cancellation_token: CancellationToken::new(),
            task: None,
        }
    }

    /// Start listening for keyboard input
    pub fn start(&mut self) -> Result<()> {
        if self.task.is_some() {
            return Err(DojoError::component(
                "keyboard",
                "keyboard input handler already started",
            ));
        }

        info!("Keyboard driver active: SPACE record, b back, p play/pause, f/r speed, s swap camera, q quit");

        let commands = self.commands.clone();
        let cancellation_token = self.cancellation_token.clone();

        self.task = Some(task::spawn_blocking(move || {
            if let Err(e) = enable_raw_mode() {
                error!("Failed to enable raw mode for keyboard input: {}", e);
                return;
            }

            while !cancellation_token.is_cancelled() {
                match event::poll(Duration::from_millis(100)) {
                    Ok(true) => {
                        let Ok(Event::Key(key_event)) = event::read() else {
                            continue;
                        };
                        if key_event.kind != KeyEventKind::Press {
                            continue;
                        }
                        let Some(command) = command_for_key(key_event.code) else {
                            debug!("Unmapped key: {:?}", key_event.code);
                            continue;
                        };

                        debug!("Key {:?} -> {:?}", key_event.code, command);
                        if commands.send(command).is_err() {
                            debug!("Command receiver dropped; keyboard driver exiting");
                            break;
                        }
                        if command == UserCommand::Quit {
                            break;
                        }
                    }
                    Ok(false) => {}
                    Err(e) => warn!("Error polling for keyboard events: {}", e),
                }
            }

            if let Err(e) = disable_raw_mode() {
                error!("Failed to disable raw mode: {}", e);
            }
            debug!("Keyboard input handler task exited");
        }));

        Ok(())
    }

    /// Stop the reader and restore the terminal
    pub async fn stop(&mut self) -> Result<()> {
        info!("Stopping keyboard input handler");
        self.cancellation_token.cancel();

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Keyboard task ended abnormally: {}", e);
            }
        }

        // Covers a reader that never got to clean up
        let _ = disable_raw_mode();
        Ok(())
    }

    pub fn is_stopped(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }
}
