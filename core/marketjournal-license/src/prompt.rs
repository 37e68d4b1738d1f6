//! User interaction during activation.

use crate::error::{LicenseError, LicenseResult};
use dialoguer::Input;

/// Something the activation flow wants the user to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The liveness check or a validation call failed.
    ServerUnreachable(String),
    /// The entered key was accepted and stored.
    Activated(String),
    /// The service rejected the entered key.
    Rejected { message: String, will_retry: bool },
    /// The last attempt was left blank.
    NoKeyProvided,
    /// Any other fatal failure.
    Failed(String),
}

/// Interactive channel to the user.
pub trait Prompt {
    /// Asks for a license key. Blank input is `None`.
    fn ask_license_key(&mut self, attempt: u32, max_attempts: u32)
        -> LicenseResult<Option<String>>;

    fn notify(&mut self, notice: Notice);
}

/// Prompt on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask_license_key(
        &mut self,
        attempt: u32,
        max_attempts: u32,
    ) -> LicenseResult<Option<String>> {
        let entered: String = Input::new()
            .with_prompt(format!(
                "Please enter your license key (Attempt {attempt}/{max_attempts})"
            ))
            .allow_empty(true)
            .interact_text()
            .map_err(|e| LicenseError::Prompt(e.to_string()))?;

        let entered = entered.trim();
        Ok((!entered.is_empty()).then(|| entered.to_string()))
    }

    fn notify(&mut self, notice: Notice) {
        match notice {
            Notice::ServerUnreachable(detail) => eprintln!(
                "Unable to communicate with the license server. Please try again later. ({detail})"
            ),
            Notice::Activated(message) => {
                eprintln!("{message}. License key validated and registered successfully.")
            }
            Notice::Rejected {
                message,
                will_retry: true,
            } => eprintln!("License validation failed: {message}. Please try again."),
            Notice::Rejected {
                message,
                will_retry: false,
            } => eprintln!("License validation failed: {message}. Exiting application."),
            Notice::NoKeyProvided => eprintln!("No license key provided. Exiting application."),
            Notice::Failed(detail) => eprintln!("Error: {detail}"),
        }
    }
}
