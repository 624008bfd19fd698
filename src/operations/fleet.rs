// Fleet readiness analysis
use crate::models::{FleetReadiness, NavActivity, ShipStatusView, StateSnapshot};

/// Pure: counts idle and busy ships from their navigation status. An empty or
/// missing fleet is never ready.
pub fn analyze_fleet_readiness(snapshot: &StateSnapshot) -> FleetReadiness {
    let ships = snapshot.ships.as_deref().unwrap_or(&[]);

    let mut idle_ships = 0;
    let mut busy_ships = 0;
    for ship in ships {
        match ShipStatusView::from_value(ship).activity() {
            NavActivity::Idle => idle_ships += 1,
            NavActivity::Busy => busy_ships += 1,
        }
    }

    FleetReadiness {
        total_ships: ships.len(),
        idle_ships,
        busy_ships,
        ready_for_action: idle_ships > 0,
    }
}
