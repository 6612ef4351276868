//! View state derived from the scan context.
//!
//! [`render`] is a pure function of [`ScanState`]; [`UiStateMachine::attach`]
//! wires it to a [`Presenter`] so every transition is re-rendered.

use serde::Serialize;

use crate::context::ScanContext;
use crate::types::{ScanOutcome, ScanState};

/// Instructions shown before the first scan.
pub const IDLE_MESSAGE: &str = "📱 Select an image containing a QR code to scan";

/// Indicator shown while a scan is in flight.
pub const LOADING_MESSAGE: &str = "🔄 Scanning QR Code...";

/// Heading above a decoded link.
pub const LINK_HEADING: &str = "✅ QR Code Detected!";

/// Heading above decoded plain text.
pub const TEXT_HEADING: &str = "✅ QR Code Content:";

/// Prefix for one-line failure messages.
pub const FAILURE_INDICATOR: &str = "❌";

/// Browsing context links are opened in.
pub const LINK_TARGET: &str = "_blank";

/// Link relation: no `window.opener` handle and no referrer for the opened page.
pub const LINK_REL: &str = "noopener noreferrer";

/// What the presentation layer should show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderInstruction {
    /// Initial instructions.
    Idle { message: String },
    /// Scan in progress.
    Loading { message: String },
    /// Decoded payload, already sanitized.
    #[serde(rename_all = "camelCase")]
    Success {
        heading: String,
        text: String,
        is_link: bool,
    },
    /// Failure reason, verbatim.
    Error { message: String },
}

impl RenderInstruction {
    /// Single-line text for hosts that only display a status line.
    pub fn display_text(&self) -> String {
        match self {
            RenderInstruction::Idle { message } | RenderInstruction::Loading { message } => {
                message.clone()
            }
            RenderInstruction::Success { heading, text, .. } => format!("{} {}", heading, text),
            RenderInstruction::Error { message } => format!("{} {}", FAILURE_INDICATOR, message),
        }
    }
}

/// A rendered state plus the input-enabled flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct View {
    pub instruction: RenderInstruction,
    pub input_enabled: bool,
}

/// Receives every rendered view.
pub trait Presenter {
    fn present(&self, view: &View);
}

impl<F> Presenter for F
where
    F: Fn(&View),
{
    fn present(&self, view: &View) {
        self(view)
    }
}

/// Strip angle brackets so a payload can never open a tag.
pub fn sanitize(payload: &str) -> String {
    payload.chars().filter(|c| !matches!(c, '<' | '>')).collect()
}

/// Whether sanitized text should be rendered as an external link.
pub fn is_external_link(text: &str) -> bool {
    text.starts_with("http://") || text.starts_with("https://")
}

/// Map a state to its view.
pub fn render(state: &ScanState) -> View {
    let instruction = match state {
        ScanState::Idle => RenderInstruction::Idle {
            message: IDLE_MESSAGE.to_string(),
        },
        ScanState::Loading => RenderInstruction::Loading {
            message: LOADING_MESSAGE.to_string(),
        },
        ScanState::Settled(outcome) => render_outcome(outcome),
    };

    View {
        instruction,
        input_enabled: state.input_enabled(),
    }
}

fn render_outcome(outcome: &ScanOutcome) -> RenderInstruction {
    match outcome {
        ScanOutcome::Success { payload } => {
            let text = sanitize(payload);
            let is_link = is_external_link(&text);
            let heading = if is_link { LINK_HEADING } else { TEXT_HEADING };
            RenderInstruction::Success {
                heading: heading.to_string(),
                text,
                is_link,
            }
        }
        ScanOutcome::NotFound | ScanOutcome::ProcessingError { .. } | ScanOutcome::LoadError => {
            RenderInstruction::Error {
                message: outcome.failure_message().unwrap_or_default().to_string(),
            }
        }
    }
}

/// Binds a presenter to a scan context.
pub struct UiStateMachine;

impl UiStateMachine {
    /// Present the current state now and after every transition.
    pub fn attach<P>(context: &ScanContext, presenter: P)
    where
        P: Presenter + 'static,
    {
        presenter.present(&render(&context.state()));
        context.subscribe(move |state| presenter.present(&render(state)));
    }
}
