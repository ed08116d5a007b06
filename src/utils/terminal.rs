use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::style::ResetColor;
use crossterm::terminal::{disable_raw_mode, LeaveAlternateScreen};
use std::io::IsTerminal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Put the terminal back into a sane state: raw mode off, cursor visible,
/// attributes reset, alternate screen left.
///
/// Escape sequences are only written when stdout is a terminal so piped
/// output (e.g. `--list` JSON) stays clean. Errors are ignored.
pub fn reset_terminal() {
    let _ = disable_raw_mode();

    let mut stdout = std::io::stdout();
    if stdout.is_terminal() {
        let _ = execute!(stdout, Show, ResetColor, LeaveAlternateScreen);
    }
}

/// Reset the terminal before the default panic output is printed.
pub fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        reset_terminal();
        previous(info);
    }));
}

/// RAII guard that resets the terminal exactly once, on drop or on an
/// explicit [`TerminalGuard::restore`].
pub struct TerminalGuard {
    restored: Arc<AtomicBool>,
}

impl TerminalGuard {
    pub fn new() -> Self {
        Self {
            restored: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn restore(&self) {
        if !self.restored.swap(true, Ordering::SeqCst) {
            reset_terminal();
        }
    }

    pub fn is_restored(&self) -> bool {
        self.restored.load(Ordering::SeqCst)
    }
}

impl Default for TerminalGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        self.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_restores_once() {
        let guard = TerminalGuard::new();
        assert!(!guard.is_restored());
        guard.restore();
        assert!(guard.is_restored());
        // Second call is a no-op
        guard.restore();
        assert!(guard.is_restored());
    }

    #[test]
    fn test_guard_restores_on_drop() {
        let flag = {
            let guard = TerminalGuard::new();
            Arc::clone(&guard.restored)
        };
        assert!(flag.load(Ordering::SeqCst));
    }
}
