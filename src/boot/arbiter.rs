//! Boot arbitration
//!
//! One pass per power-up: enumerate the image directory, print the boot
//! banner, hold the override gate open, optionally run the command
//! session, then persist the next boot target. The pass always ends in a
//! terminal value; the hosting runtime maps it onto the hardware reset or
//! halt primitive exactly once.

use crate::boot::config::BootConfig;
use crate::boot::error::BootError;
use crate::boot::gate::{GateDecision, OverrideGate};
use crate::boot::ready::ReadySignal;
use crate::cli::session::{emit, CommandSession, SessionEnd};
use crate::params::keys;
use crate::params::store::ParamStore;
use crate::platform::traits::{
    ConsoleInterface, FlashInterface, ImageDirInterface, NetInfoInterface, TimerInterface,
};
use crate::{log_error, log_info, log_warn};

/// Terminal outcome of one arbitration pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// Reboot now; any chosen slot is already persisted
    Reset,
    /// No safe boot action remains; stop here
    Halt(BootError),
}

/// The boot arbitration state machine
///
/// Owns the parameter store and its platform collaborators for the
/// duration of the pass; borrows the readiness signal from the hosting
/// coordinator so external recovery services can wait on it.
pub struct BootArbiter<'a, F, C, T, D, N>
where
    F: FlashInterface,
    C: ConsoleInterface,
    T: TimerInterface,
    D: ImageDirInterface,
    N: NetInfoInterface,
{
    store: ParamStore<F>,
    console: C,
    timer: T,
    image_dir: D,
    net_info: N,
    gate: OverrideGate,
    ready: &'a ReadySignal,
}

impl<'a, F, C, T, D, N> BootArbiter<'a, F, C, T, D, N>
where
    F: FlashInterface,
    C: ConsoleInterface,
    T: TimerInterface,
    D: ImageDirInterface,
    N: NetInfoInterface,
{
    /// Create an arbiter with the standard override gate
    pub fn new(
        store: ParamStore<F>,
        console: C,
        timer: T,
        image_dir: D,
        net_info: N,
        ready: &'a ReadySignal,
    ) -> Self {
        Self {
            store,
            console,
            timer,
            image_dir,
            net_info,
            gate: OverrideGate::new(),
            ready,
        }
    }

    /// Replace the override gate, e.g. to tune the window
    pub fn with_gate(mut self, gate: OverrideGate) -> Self {
        self.gate = gate;
        self
    }

    /// Run one arbitration pass to its terminal state
    pub fn run(mut self) -> Terminal {
        let directory = match self.image_dir.enumerate() {
            Ok(directory) => directory,
            Err(e) => {
                log_error!("image directory unreadable: {}", e);
                return Terminal::Halt(BootError::Platform(e));
            }
        };
        let mut config = match BootConfig::from_directory(&directory) {
            Ok(config) => config,
            Err(e) => {
                log_error!("image directory rejected: {}", e);
                return Terminal::Halt(e);
            }
        };

        self.print_banner(&config);

        if let Err(_e) = keys::seed_station_credentials(&mut self.store) {
            log_warn!("credential seeding skipped: {}", _e);
        }

        let interactive = if config.slot_count() == 1 {
            // With no alternate image the session is the only useful
            // action, trigger or not
            log_warn!("single image in flash, forcing command session");
            true
        } else {
            self.gate.await_trigger(&mut self.console, &mut self.timer)
                == GateDecision::Triggered
        };

        if interactive {
            self.ready.raise();
            let end =
                CommandSession::new(&mut self.store, &mut self.console, &mut self.net_info)
                    .run();
            match end {
                SessionEnd::ResetRequested => {
                    let _ = self.console.flush();
                    return Terminal::Reset;
                }
                SessionEnd::InputClosed => {
                    log_info!("console closed, resuming boot");
                }
            }
        }

        match self.select_target(&mut config) {
            Ok(()) => {
                let _ = self.console.flush();
                Terminal::Reset
            }
            Err(e) => {
                log_error!("no boot target: {}", e);
                Terminal::Halt(e)
            }
        }
    }

    /// Choose the alternate slot and persist it as the one-shot target
    fn select_target(&mut self, config: &mut BootConfig) -> Result<(), BootError> {
        let next = config.next_slot().ok_or(BootError::TargetOutOfRange)?;
        config.set_temp_override(next)?;
        self.image_dir.set_next_boot(next)?;
        log_info!("booting slot {} next", next);
        Ok(())
    }

    /// Boot banner: version, image table, network identity when known
    ///
    /// Banner output is best effort; a dead console must not block boot.
    fn print_banner(&mut self, config: &BootConfig) {
        let _ = emit(
            &mut self.console,
            format_args!("slotboot {}", env!("CARGO_PKG_VERSION")),
        );
        let _ = emit(&mut self.console, format_args!("images in flash:"));
        for slot in config.slots() {
            let marker = if slot.is_current { '*' } else { ' ' };
            let _ = emit(
                &mut self.console,
                format_args!("{}{}: offset 0x{:08x}", marker, slot.index, slot.flash_offset),
            );
        }

        let ip = self.net_info.ip_address();
        let mac = self.net_info.mac_address();
        if let (Ok(ip), Ok(mac)) = (ip, mac) {
            let _ = emit(
                &mut self.console,
                format_args!(
                    "ip {}.{}.{}.{} [{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}]",
                    ip[0], ip[1], ip[2], ip[3], mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::mock::{
        MockConsole, MockFlash, MockImageDir, MockNetInfo, MockTimer, SimClock,
    };
    use crate::platform::PlatformError;

    struct Rig {
        console: MockConsole,
        timer: MockTimer,
        image_dir: MockImageDir,
        net_info: MockNetInfo,
        store: ParamStore<MockFlash>,
    }

    fn rig(current: u8, offsets: &[u32]) -> Rig {
        let clock = SimClock::new();
        let console = MockConsole::new(clock.clone());
        let timer = MockTimer::with_clock(clock);
        let mut store = ParamStore::new(MockFlash::new());
        let region = store.default_region();
        store.format(region).unwrap();
        Rig {
            console,
            timer,
            image_dir: MockImageDir::new(current, offsets),
            net_info: MockNetInfo::new(),
            store,
        }
    }

    fn run(rig: Rig, ready: &ReadySignal) -> Terminal {
        BootArbiter::new(
            rig.store,
            rig.console,
            rig.timer,
            rig.image_dir,
            rig.net_info,
            ready,
        )
        .run()
    }

    #[test]
    fn test_direct_boot_selects_alternate_slot() {
        let ready = ReadySignal::new();
        let rig = rig(0, &[0x2000, 0x102000]);
        let dir_probe = rig.image_dir.clone();

        assert_eq!(run(rig, &ready), Terminal::Reset);
        assert_eq!(dir_probe.next_boot(), Some(1));
        assert!(!ready.is_raised());
    }

    #[test]
    fn test_direct_boot_wraps_from_last_slot() {
        let ready = ReadySignal::new();
        let rig = rig(1, &[0x2000, 0x102000]);
        let dir_probe = rig.image_dir.clone();

        assert_eq!(run(rig, &ready), Terminal::Reset);
        assert_eq!(dir_probe.next_boot(), Some(0));
    }

    #[test]
    fn test_banner_lists_images_and_identity() {
        let ready = ReadySignal::new();
        let rig = rig(0, &[0x2000, 0x102000]);
        let console_probe = rig.console.clone();

        run(rig, &ready);
        let out = console_probe.tx_string();
        assert!(out.starts_with(&std::format!("slotboot {}\n", env!("CARGO_PKG_VERSION"))));
        assert!(out.contains("images in flash:\n"));
        assert!(out.contains("*0: offset 0x00002000\n"));
        assert!(out.contains(" 1: offset 0x00102000\n"));
        assert!(out.contains("ip 192.168.1.42 [5c:cf:7f:01:02:03]\n"));
    }

    #[test]
    fn test_banner_skips_identity_when_unavailable() {
        let ready = ReadySignal::new();
        let mut rig = rig(0, &[0x2000, 0x102000]);
        rig.net_info.set_unavailable();
        let console_probe = rig.console.clone();

        assert_eq!(run(rig, &ready), Terminal::Reset);
        assert!(!console_probe.tx_string().contains("ip "));
    }

    #[test]
    fn test_trigger_enters_session_and_reset_command_reboots() {
        let ready = ReadySignal::new();
        let mut rig = rig(0, &[0x2000, 0x102000]);
        rig.console.push_byte_at(10, b':');
        rig.console.push_line_at(10, "wp node.name garage");
        rig.console.push_line_at(10, "reset");
        let console_probe = rig.console.clone();
        let dir_probe = rig.image_dir.clone();

        assert_eq!(run(rig, &ready), Terminal::Reset);
        // The reset command reboots without re-aiming the loader
        assert_eq!(dir_probe.next_boot(), None);
        assert!(ready.is_raised());
        assert!(console_probe.tx_string().contains("cli ok\nok\nok\n"));
    }

    #[test]
    fn test_session_input_closed_falls_through_to_selection() {
        let ready = ReadySignal::new();
        let mut rig = rig(1, &[0x2000, 0x102000]);
        rig.console.push_byte_at(0, b':');
        rig.console.push_line_at(0, "wp node.id 3");
        // Script ends here; the console reads as closed
        let dir_probe = rig.image_dir.clone();

        assert_eq!(run(rig, &ready), Terminal::Reset);
        assert_eq!(dir_probe.next_boot(), Some(0));
        assert!(ready.is_raised());
    }

    #[test]
    fn test_single_slot_forces_session_without_trigger() {
        let ready = ReadySignal::new();
        let mut rig = rig(0, &[0x2000]);
        rig.console.push_line("reset");
        let console_probe = rig.console.clone();

        assert_eq!(run(rig, &ready), Terminal::Reset);
        assert!(ready.is_raised());
        assert!(console_probe.tx_string().contains("cli ok\n"));
    }

    #[test]
    fn test_single_slot_session_end_halts() {
        let ready = ReadySignal::new();
        let rig = rig(0, &[0x2000]);

        // No script at all: the forced session sees a closed console and
        // falls through, but a single image leaves no target to select
        assert_eq!(
            run(rig, &ready),
            Terminal::Halt(BootError::TargetOutOfRange)
        );
        assert!(ready.is_raised());
    }

    #[test]
    fn test_set_next_boot_failure_halts() {
        let ready = ReadySignal::new();
        let mut rig = rig(0, &[0x2000, 0x102000]);
        rig.image_dir.fail_set_next();

        assert!(matches!(
            run(rig, &ready),
            Terminal::Halt(BootError::Platform(PlatformError::ImageDir(_)))
        ));
        assert!(!ready.is_raised());
    }

    #[test]
    fn test_empty_directory_halts() {
        let ready = ReadySignal::new();
        let rig = rig(0, &[]);
        assert_eq!(run(rig, &ready), Terminal::Halt(BootError::NoImages));
    }

    #[test]
    fn test_current_out_of_range_halts() {
        let ready = ReadySignal::new();
        let rig = rig(5, &[0x2000, 0x102000]);
        assert_eq!(
            run(rig, &ready),
            Terminal::Halt(BootError::CurrentOutOfRange)
        );
    }

    #[test]
    fn test_enumerate_failure_halts() {
        let ready = ReadySignal::new();
        let mut rig = rig(0, &[0x2000, 0x102000]);
        rig.image_dir.fail_enumerate();

        assert!(matches!(
            run(rig, &ready),
            Terminal::Halt(BootError::Platform(_))
        ));
    }

    #[test]
    fn test_full_recovery_flow_transcript() {
        let ready = ReadySignal::new();
        let mut rig = rig(0, &[0x2000, 0x102000]);
        rig.console.push_byte_at(100, b':');
        rig.console.push_line_at(100, "wp node.name garage");
        rig.console.push_line_at(100, "rp node.name");
        rig.console.push_line_at(100, "dump");
        rig.console.push_line_at(100, "reset");
        let console_probe = rig.console.clone();

        assert_eq!(run(rig, &ready), Terminal::Reset);
        let expected = std::format!(
            "slotboot {}\n\
             images in flash:\n\
             *0: offset 0x00002000\n\
             \x201: offset 0x00102000\n\
             ip 192.168.1.42 [5c:cf:7f:01:02:03]\n\
             cli ok\n\
             ok\n\
             ok:node.name:garage\n\
             node.name:garage\n\
             ok\n\
             ok\n",
            env!("CARGO_PKG_VERSION")
        );
        assert_eq!(console_probe.tx_string(), expected);
    }

    #[test]
    fn test_custom_gate_window() {
        let ready = ReadySignal::new();
        let mut rig = rig(0, &[0x2000, 0x102000]);
        // Arrives after the shortened window closes
        rig.console.push_byte_at(80, b':');
        let dir_probe = rig.image_dir.clone();

        let terminal = BootArbiter::new(
            rig.store,
            rig.console,
            rig.timer,
            rig.image_dir,
            rig.net_info,
            &ready,
        )
        .with_gate(OverrideGate::with_window(50))
        .run();

        assert_eq!(terminal, Terminal::Reset);
        assert_eq!(dir_probe.next_boot(), Some(1));
        assert!(!ready.is_raised());
    }
}
