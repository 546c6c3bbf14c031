//! Command registry
//!
//! One const table drives the whole session: name lookup, arity
//! validation, usage strings, and the `help` listing all come from the
//! same rows, and dispatch is a match on the command identifier.

/// Identifier for each built-in command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandId {
    /// `wp <key> <value>`
    WriteParam,
    /// `rp <key>`
    ReadParam,
    /// `dump`
    Dump,
    /// `format`
    Format,
    /// `ip`
    IpAddr,
    /// `mac`
    MacAddr,
    /// `keys`
    Keys,
    /// `help`
    Help,
    /// `reset`
    Reset,
}

/// One registry row
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    /// Command name as typed by the operator
    pub name: &'static str,
    /// Dispatch identifier
    pub id: CommandId,
    /// Minimum argument count
    pub min_args: usize,
    /// Maximum argument count
    pub max_args: usize,
    /// Argument synopsis, empty for argument-less commands
    pub usage: &'static str,
    /// One-line description for `help`
    pub help: &'static str,
}

const fn spec(
    name: &'static str,
    id: CommandId,
    min_args: usize,
    max_args: usize,
    usage: &'static str,
    help: &'static str,
) -> CommandSpec {
    CommandSpec {
        name,
        id,
        min_args,
        max_args,
        usage,
        help,
    }
}

/// The built-in command table
pub const COMMANDS: &[CommandSpec] = &[
    spec(
        "wp",
        CommandId::WriteParam,
        2,
        2,
        "<key> <value>",
        "write parameter",
    ),
    spec("rp", CommandId::ReadParam, 1, 1, "<key>", "read parameter"),
    spec("dump", CommandId::Dump, 0, 0, "", "dump all parameters"),
    spec(
        "format",
        CommandId::Format,
        0,
        0,
        "",
        "create and clear the parameter store",
    ),
    spec("ip", CommandId::IpAddr, 0, 0, "", "print ip address"),
    spec("mac", CommandId::MacAddr, 0, 0, "", "print mac address"),
    spec("keys", CommandId::Keys, 0, 0, "", "list known parameter keys"),
    spec("help", CommandId::Help, 0, 0, "", "list commands"),
    spec("reset", CommandId::Reset, 0, 0, "", "reboot"),
];

/// Look up a command by name
pub fn lookup(name: &str) -> Option<&'static CommandSpec> {
    COMMANDS.iter().find(|spec| spec.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup() {
        assert_eq!(lookup("wp").unwrap().id, CommandId::WriteParam);
        assert_eq!(lookup("reset").unwrap().id, CommandId::Reset);
        assert!(lookup("wq").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn test_arity_bounds_consistent() {
        for spec in COMMANDS {
            assert!(spec.min_args <= spec.max_args, "bad arity for {}", spec.name);
            assert_eq!(
                spec.usage.is_empty(),
                spec.max_args == 0,
                "usage mismatch for {}",
                spec.name
            );
        }
    }

    #[test]
    fn test_no_duplicate_names() {
        for (i, spec) in COMMANDS.iter().enumerate() {
            assert!(
                COMMANDS[i + 1..].iter().all(|other| other.name != spec.name),
                "duplicate command: {}",
                spec.name
            );
        }
    }
}
