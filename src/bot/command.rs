/// Slash commands the bot understands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Summon,
    Shop,
    SimulateDrop,
    Backup,
    Balance,
    Collection,
    Grant,
}

impl Command {
    fn from_name(name: &str) -> Option<Self> {
        let cmd = match name {
            "start" => Command::Start,
            "help" => Command::Help,
            "summon" => Command::Summon,
            "shop" => Command::Shop,
            "simulate_drop" => Command::SimulateDrop,
            "backup" => Command::Backup,
            "balance" => Command::Balance,
            "collection" => Command::Collection,
            "grant" => Command::Grant,
            _ => return None,
        };
        Some(cmd)
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::Start => "start",
            Command::Help => "help",
            Command::Summon => "summon",
            Command::Shop => "shop",
            Command::SimulateDrop => "simulate_drop",
            Command::Backup => "backup",
            Command::Balance => "balance",
            Command::Collection => "collection",
            Command::Grant => "grant",
        }
    }

    /// Commands restricted to the configured admins
    pub fn is_admin_only(self) -> bool {
        matches!(self, Command::Backup | Command::Grant)
    }
}

/// A command together with whatever followed it on the line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub command: Command,
    pub args: &'a str,
}

/// Parse `/name[@bot] args`.
///
/// Returns `None` for plain text, unknown commands, and commands addressed to
/// a different bot. Without a known `bot_username` every `@` suffix is
/// accepted.
pub fn parse_command<'a>(text: &'a str, bot_username: Option<&str>) -> Option<Invocation<'a>> {
    let rest = text.trim_start().strip_prefix('/')?;
    let (head, args) = match rest.find(char::is_whitespace) {
        Some(idx) => (&rest[..idx], rest[idx..].trim()),
        None => (rest, ""),
    };

    let name = match head.split_once('@') {
        Some((name, target)) => {
            if let Some(me) = bot_username {
                if !target.eq_ignore_ascii_case(me) {
                    return None;
                }
            }
            name
        }
        None => head,
    };

    let command = Command::from_name(&name.to_ascii_lowercase())?;
    Some(Invocation { command, args })
}
