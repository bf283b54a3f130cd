use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Kernel boot lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum KernelState {
    NotBooted = 0,
    BootingTools = 1,
    BootingPlugins = 2,
    Ready = 3,
    ShuttingDown = 4,
    Stopped = 5,
}

impl From<u8> for KernelState {
    fn from(v: u8) -> Self {
        match v {
            0 => KernelState::NotBooted,
            1 => KernelState::BootingTools,
            2 => KernelState::BootingPlugins,
            3 => KernelState::Ready,
            4 => KernelState::ShuttingDown,
            _ => KernelState::Stopped,
        }
    }
}

impl fmt::Display for KernelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Atomically readable [`KernelState`].
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub fn new() -> Self {
        Self(AtomicU8::new(KernelState::NotBooted as u8))
    }

    pub fn get(&self) -> KernelState {
        KernelState::from(self.0.load(Ordering::SeqCst))
    }

    pub fn set(&self, state: KernelState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    /// Move from `from` to `to`; on failure returns the state actually observed.
    pub fn transition(&self, from: KernelState, to: KernelState) -> Result<(), KernelState> {
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(KernelState::from)
    }
}

impl Default for StateCell {
    fn default() -> Self {
        Self::new()
    }
}
