//! SCPI message framing and identity replies.

/// IEEE-488.2 common identity query.
pub const IDN_QUERY: &str = "*IDN?";

pub const LINE_TERMINATOR: char = '\n';

/// Frames a command for the wire: surrounding whitespace is stripped and
/// exactly one newline terminator is appended.
pub fn frame_command(command: &str) -> String {
    let mut framed = String::with_capacity(command.len() + 1);
    framed.push_str(command.trim());
    framed.push(LINE_TERMINATOR);
    framed
}

/// Parsed `*IDN?` reply: `manufacturer,model,serial,firmware`.
///
/// Only the first two fields are required; many instruments pad or omit the
/// rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub manufacturer: String,
    pub model: String,
    pub serial: Option<String>,
    pub firmware: Option<String>,
}

impl Identity {
    /// Returns `None` unless the reply has at least two comma-separated
    /// fields and a non-empty model.
    pub fn parse(reply: &str) -> Option<Self> {
        let mut fields = reply.trim().split(',').map(str::trim);

        let manufacturer = fields.next()?.to_string();
        let model = fields.next().filter(|m| !m.is_empty())?.to_string();
        let serial = fields.next().filter(|s| !s.is_empty()).map(String::from);
        let firmware = fields.next().filter(|f| !f.is_empty()).map(String::from);

        Some(Self {
            manufacturer,
            model,
            serial,
            firmware,
        })
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
