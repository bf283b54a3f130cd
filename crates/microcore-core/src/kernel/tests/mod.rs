
#[cfg(test)]
mod tests {
    use crate::kernel::lifecycle::{KernelState, StateCell};

    #[test]
    fn test_state_round_trips_through_u8() {
        for state in [
            KernelState::NotBooted,
            KernelState::BootingTools,
            KernelState::BootingPlugins,
            KernelState::Ready,
            KernelState::ShuttingDown,
            KernelState::Stopped,
        ] {
            assert_eq!(KernelState::from(state as u8), state);
        }
    }

    #[test]
    fn test_state_cell_transition() {
        let cell = StateCell::new();
        assert_eq!(cell.get(), KernelState::NotBooted);
        assert!(cell.transition(KernelState::NotBooted, KernelState::BootingTools).is_ok());
        assert_eq!(
            cell.transition(KernelState::NotBooted, KernelState::BootingTools),
            Err(KernelState::BootingTools)
        );
        cell.set(KernelState::Ready);
        assert_eq!(cell.get().to_string(), "Ready");
    }
}
