//! Interactive command session
//!
//! Entered only through the boot override gate or when no alternate image
//! exists. Line-oriented: one command per line, one or more response
//! lines, every response starting `ok` or `error:`. Malformed input never
//! ends the session; only the `reset` command or a dead console does.

use crate::cli::commands::{lookup, CommandId, COMMANDS};
use crate::log_warn;
use crate::params::keys;
use crate::params::store::ParamStore;
use crate::params::value::{ParamKind, ParamValue};
use crate::platform::traits::{ConsoleInterface, FlashInterface, NetInfoInterface};
use crate::platform::Result;
use core::fmt;
use core::fmt::Write as _;
use heapless::{String, Vec};

/// Longest accepted input line in bytes
const LINE_MAX: usize = 128;

/// Response formatting buffer size
const RESP_MAX: usize = 192;

/// Maximum tokens per command line
const MAX_TOKENS: usize = 8;

/// Why the session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The `reset` command ran; the arbiter should reboot now
    ResetRequested,
    /// The console failed fatally; no operator is reachable
    InputClosed,
}

enum DispatchOutcome {
    Continue,
    Reset,
}

enum LineStatus {
    Line(Vec<u8, LINE_MAX>),
    Overlong,
}

/// Interactive session over a parameter store and identity collaborators
pub struct CommandSession<'a, F, C, N>
where
    F: FlashInterface,
    C: ConsoleInterface,
    N: NetInfoInterface,
{
    store: &'a mut ParamStore<F>,
    console: &'a mut C,
    net_info: &'a mut N,
}

impl<'a, F, C, N> CommandSession<'a, F, C, N>
where
    F: FlashInterface,
    C: ConsoleInterface,
    N: NetInfoInterface,
{
    /// Create a session over borrowed collaborators
    pub fn new(store: &'a mut ParamStore<F>, console: &'a mut C, net_info: &'a mut N) -> Self {
        Self {
            store,
            console,
            net_info,
        }
    }

    /// Run the dispatch loop until reset is requested or input closes
    pub fn run(mut self) -> SessionEnd {
        // Handshake line so the operator knows the gate was taken
        if emit(&mut *self.console, format_args!("cli ok")).is_err() {
            return SessionEnd::InputClosed;
        }

        loop {
            match self.read_line() {
                Err(_) => return SessionEnd::InputClosed,
                Ok(LineStatus::Overlong) => {
                    if emit(&mut *self.console, format_args!("error:line too long")).is_err() {
                        return SessionEnd::InputClosed;
                    }
                }
                Ok(LineStatus::Line(raw)) => match self.dispatch_line(&raw) {
                    Err(_) => return SessionEnd::InputClosed,
                    Ok(DispatchOutcome::Reset) => return SessionEnd::ResetRequested,
                    Ok(DispatchOutcome::Continue) => {}
                },
            }
        }
    }

    /// Read one line, handling backspace editing and the length cap
    ///
    /// An overlong line is drained to its terminator so the next read
    /// starts clean. Returns `Err` only on a fatal console error.
    fn read_line(&mut self) -> Result<LineStatus> {
        let mut line: Vec<u8, LINE_MAX> = Vec::new();
        loop {
            let byte = self.console.read_byte()?;
            match byte {
                b'\r' | b'\n' => return Ok(LineStatus::Line(line)),
                0x08 | 0x7F => {
                    line.pop();
                }
                _ => {
                    if line.push(byte).is_err() {
                        loop {
                            let b = self.console.read_byte()?;
                            if b == b'\r' || b == b'\n' {
                                break;
                            }
                        }
                        return Ok(LineStatus::Overlong);
                    }
                }
            }
        }
    }

    /// Tokenize and dispatch one input line
    ///
    /// Malformed input (bad encoding, unknown name, wrong arity) produces
    /// one `error:` response and keeps the session alive. `Err` means the
    /// console transport failed.
    fn dispatch_line(&mut self, raw: &[u8]) -> Result<DispatchOutcome> {
        let Ok(text) = core::str::from_utf8(raw) else {
            emit(&mut *self.console, format_args!("error:invalid utf-8"))?;
            return Ok(DispatchOutcome::Continue);
        };

        let mut tokens: Vec<&str, MAX_TOKENS> = Vec::new();
        for token in text.split_whitespace() {
            if tokens.push(token).is_err() {
                emit(&mut *self.console, format_args!("error:too many arguments"))?;
                return Ok(DispatchOutcome::Continue);
            }
        }
        let Some((&name, args)) = tokens.split_first() else {
            // Blank line, nothing to do
            return Ok(DispatchOutcome::Continue);
        };

        let Some(spec) = lookup(name) else {
            emit(
                &mut *self.console,
                format_args!("error:unknown command:{}", name),
            )?;
            return Ok(DispatchOutcome::Continue);
        };
        if args.len() < spec.min_args || args.len() > spec.max_args {
            if spec.usage.is_empty() {
                emit(&mut *self.console, format_args!("error:usage:{}", spec.name))?;
            } else {
                emit(
                    &mut *self.console,
                    format_args!("error:usage:{} {}", spec.name, spec.usage),
                )?;
            }
            return Ok(DispatchOutcome::Continue);
        }

        match spec.id {
            CommandId::WriteParam => self.cmd_write(args[0], args[1])?,
            CommandId::ReadParam => self.cmd_read(args[0])?,
            CommandId::Dump => self.cmd_dump()?,
            CommandId::Format => self.cmd_format()?,
            CommandId::IpAddr => self.cmd_ip()?,
            CommandId::MacAddr => self.cmd_mac()?,
            CommandId::Keys => self.cmd_keys()?,
            CommandId::Help => self.cmd_help()?,
            CommandId::Reset => {
                emit(&mut *self.console, format_args!("ok"))?;
                return Ok(DispatchOutcome::Reset);
            }
        }
        Ok(DispatchOutcome::Continue)
    }

    /// `wp <key> <value>`: kind comes from the schema, unknown keys are text
    fn cmd_write(&mut self, key: &str, value_text: &str) -> Result<()> {
        let store = &mut *self.store;
        let console = &mut *self.console;

        let kind = keys::kind_for(key).unwrap_or(ParamKind::Text);
        let Some(value) = ParamValue::parse(kind, value_text) else {
            return emit(console, format_args!("error:write failed:invalid value"));
        };
        match store.set(key, &value) {
            Ok(()) => emit(console, format_args!("ok")),
            Err(e) => emit(console, format_args!("error:write failed:{}", e)),
        }
    }

    /// `rp <key>`
    fn cmd_read(&mut self, key: &str) -> Result<()> {
        let store = &mut *self.store;
        let console = &mut *self.console;

        let kind = keys::kind_for(key).unwrap_or(ParamKind::Text);
        match store.get(key, kind) {
            Ok(value) => emit(console, format_args!("ok:{}:{}", key, value)),
            Err(e) => emit(console, format_args!("error:read failed:{}", e)),
        }
    }

    /// `dump`: one line per printable parameter, hex block per binary one
    fn cmd_dump(&mut self) -> Result<()> {
        let store = &mut *self.store;
        let console = &mut *self.console;

        for item in store.iter() {
            match item {
                Ok(param) => match &param.value {
                    ParamValue::Binary(bytes) => {
                        emit_raw(console, format_args!("{}:", param.key))?;
                        for chunk in bytes.chunks(16) {
                            let mut row = String::<64>::new();
                            let _ = row.push_str("\n   ");
                            for byte in chunk {
                                let _ = write!(row, " {:02x}", byte);
                            }
                            console.write_all(row.as_bytes())?;
                        }
                        console.write_all(b"\n")?;
                    }
                    value => emit(console, format_args!("{}:{}", param.key, value))?,
                },
                Err(e) => {
                    return emit(console, format_args!("error:dump failed:{}", e));
                }
            }
        }
        emit(console, format_args!("ok"))
    }

    /// `format`: reuse the live region, fall back to the default placement
    fn cmd_format(&mut self) -> Result<()> {
        let store = &mut *self.store;
        let console = &mut *self.console;

        let region = match store.region_info() {
            Ok(region) => region,
            Err(_) => {
                let fallback = store.default_region();
                log_warn!(
                    "no parameter area found, formatting default region at 0x{:08x}",
                    fallback.base
                );
                fallback
            }
        };
        match store.format(region) {
            Ok(()) => emit(console, format_args!("ok")),
            Err(e) => emit(console, format_args!("error:format failed:{}", e)),
        }
    }

    /// `ip`
    fn cmd_ip(&mut self) -> Result<()> {
        let console = &mut *self.console;
        match self.net_info.ip_address() {
            Ok(ip) => emit(
                console,
                format_args!("ok:{}.{}.{}.{}", ip[0], ip[1], ip[2], ip[3]),
            ),
            Err(_) => emit(console, format_args!("error:failed to read ip address")),
        }
    }

    /// `mac`
    fn cmd_mac(&mut self) -> Result<()> {
        let console = &mut *self.console;
        match self.net_info.mac_address() {
            Ok(mac) => emit(
                console,
                format_args!(
                    "ok:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
                    mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
                ),
            ),
            Err(_) => emit(console, format_args!("error:failed to read mac address")),
        }
    }

    /// `keys`: the canonical schema, kind and ownership per line
    fn cmd_keys(&mut self) -> Result<()> {
        let console = &mut *self.console;
        for def in keys::KEYS {
            if def.flags.contains(keys::KeyFlags::SYSTEM) {
                emit(console, format_args!("{}:{}:system", def.name, def.kind))?;
            } else {
                emit(console, format_args!("{}:{}", def.name, def.kind))?;
            }
        }
        emit(console, format_args!("ok"))
    }

    /// `help`: the registry, one command per line
    fn cmd_help(&mut self) -> Result<()> {
        let console = &mut *self.console;
        for spec in COMMANDS {
            if spec.usage.is_empty() {
                emit(console, format_args!("{} - {}", spec.name, spec.help))?;
            } else {
                emit(
                    console,
                    format_args!("{} {} - {}", spec.name, spec.usage, spec.help),
                )?;
            }
        }
        emit(console, format_args!("ok"))
    }
}

/// Write one formatted response line, newline appended
pub(crate) fn emit<C: ConsoleInterface>(console: &mut C, args: fmt::Arguments<'_>) -> Result<()> {
    emit_raw(console, args)?;
    console.write_all(b"\n")
}

/// Write a formatted fragment without a newline
fn emit_raw<C: ConsoleInterface>(console: &mut C, args: fmt::Arguments<'_>) -> Result<()> {
    let mut buf = String::<RESP_MAX>::new();
    // All response lines are sized under RESP_MAX; anything longer truncates
    let _ = buf.write_fmt(args);
    console.write_all(buf.as_bytes())
}
