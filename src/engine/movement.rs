//! Ship staffing and range checks, and the atomic group relocation.

use super::game_state::{GameState, Group};
use super::requirements::RosterMember;
use crate::error::EngineError;
use crate::library::types::{Icon, MissionDef, ShipDef};

fn count_icons<'a, I>(icons: I, icon: Icon) -> u32
where
    I: IntoIterator<Item = &'a Icon>,
{
    icons.into_iter().filter(|i| **i == icon).count() as u32
}

/// Is the ship crewed well enough to move?
///
/// Surplus Command icons cover missing Staff; a Command shortfall is always
/// fatal. At least one crew member must share the ship's affiliation.
pub fn check_staffed(ship: &ShipDef, crew: &[RosterMember]) -> Result<(), EngineError> {
    let staff_needed = count_icons(&ship.staffing, Icon::Staff);
    let command_needed = count_icons(&ship.staffing, Icon::Command);
    let staff_have = count_icons(crew.iter().flat_map(|m| &m.stats.icons), Icon::Staff);
    let command_have = count_icons(crew.iter().flat_map(|m| &m.stats.icons), Icon::Command);

    if command_have < command_needed {
        return Err(EngineError::NotStaffed(format!(
            "needs {} Command, crew provides {}",
            command_needed, command_have
        )));
    }
    let surplus = command_have - command_needed;
    if staff_have + surplus < staff_needed {
        return Err(EngineError::NotStaffed(format!(
            "needs {} Staff, crew provides {} plus {} spare Command",
            staff_needed, staff_have, surplus
        )));
    }
    if !crew.iter().any(|m| m.stats.affiliation == ship.affiliation) {
        return Err(EngineError::NotStaffed(format!(
            "no crew member is {:?}",
            ship.affiliation
        )));
    }
    Ok(())
}

/// Span of both missions, plus 2 when crossing quadrants.
pub fn calculate_range_cost(from: &MissionDef, to: &MissionDef) -> u32 {
    let crossing = if from.quadrant != to.quadrant { 2 } else { 0 };
    from.range + to.range + crossing
}

/// Full movement check; returns the range the move will consume.
pub fn validate_move(
    range_remaining: u32,
    ship: &ShipDef,
    crew: &[RosterMember],
    from: &MissionDef,
    to: &MissionDef,
) -> Result<u32, EngineError> {
    check_staffed(ship, crew)?;
    let cost = calculate_range_cost(from, to);
    if range_remaining < cost {
        return Err(EngineError::InsufficientRange {
            needed: cost,
            remaining: range_remaining,
        });
    }
    Ok(cost)
}

/// Move a whole ship group between missions and charge its range.
/// Callers validate first; indices must already be known to be valid.
/// Returns the group's index at the destination.
pub fn commit_move(
    state: &mut GameState,
    source: usize,
    group_index: usize,
    destination: usize,
    cost: u32,
) -> Result<usize, EngineError> {
    state.group(source, group_index)?;
    state.mission(destination)?;
    let mut group: Group = state.mission_mut(source)?.groups.remove(group_index);
    if let Some(ship) = group.ship.as_mut() {
        ship.range_remaining = ship.range_remaining.saturating_sub(cost);
    }
    let dest = state.mission_mut(destination)?;
    dest.groups.push(group);
    Ok(dest.groups.len() - 1)
}
