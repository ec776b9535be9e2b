use crate::scanner::Cursor;

/// The operation a line requests, decided by its first word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    ReadMat,
    PrintMat,
    AddMat,
    SubMat,
    MulMat,
    MulScalar,
    TransMat,
    Stop,
}

/// Command names in classification order.
const COMMAND_TABLE: [(&str, CommandKind); 8] = [
    ("read_mat", CommandKind::ReadMat),
    ("print_mat", CommandKind::PrintMat),
    ("add_mat", CommandKind::AddMat),
    ("sub_mat", CommandKind::SubMat),
    ("mul_mat", CommandKind::MulMat),
    ("mul_scalar", CommandKind::MulScalar),
    ("trans_mat", CommandKind::TransMat),
    ("stop", CommandKind::Stop),
];

impl CommandKind {
    /// Canonical name of the command, e.g. "read_mat" or "stop".
    pub fn name(self) -> &'static str {
        match self {
            CommandKind::ReadMat => "read_mat",
            CommandKind::PrintMat => "print_mat",
            CommandKind::AddMat => "add_mat",
            CommandKind::SubMat => "sub_mat",
            CommandKind::MulMat => "mul_mat",
            CommandKind::MulScalar => "mul_scalar",
            CommandKind::TransMat => "trans_mat",
            CommandKind::Stop => "stop",
        }
    }
}

/// Classify the word under the cursor.
///
/// The whole whitespace-delimited token must equal a command name exactly;
/// prefixes and case variants never match. Returns `None` for an undefined command.
pub fn classify(cursor: &Cursor<'_>) -> Option<CommandKind> {
    let len = cursor.token_len();
    let token = &cursor.rest()[..len];
    COMMAND_TABLE
        .iter()
        .find(|(name, _)| name.len() == len && name.as_bytes() == token)
        .map(|(_, kind)| *kind)
}
