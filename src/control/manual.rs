//! Manual gate control: the commanded state is whatever the operator (or a
//! test harness) last wrote, with no commutation logic in between.

use crate::board::{Commanded, GateState};

/// Write `commanded` directly into `gate`, phase by phase.
pub fn drive(gate: &mut GateState, commanded: [Commanded; 3]) {
    for phase in 0..3 {
        gate.set_commanded(phase, commanded[phase]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_through_to_commanded_state() {
        let mut gate = GateState::new(0.0);
        drive(&mut gate, [Commanded::High, Commanded::Low, Commanded::High]);
        assert_eq!(
            gate.commanded,
            [Commanded::High, Commanded::Low, Commanded::High]
        );
    }
}
