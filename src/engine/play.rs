//! Handlers for the non-encounter actions: setup, drawing, deployment,
//! movement, beaming and discarding.
//!
//! Every handler checks legality before its first mutation.

use super::action_log::LogPayload;
use super::game_state::{
    mission_def, CardInstance, DilemmaInstance, GameState, Group, MissionDeployment,
    MissionInstance, PersonnelInstance, PersonnelStatus, ShipInstance, UniqueId,
};
use super::movement::{commit_move, validate_move};
use super::turn::{require_phase, TurnPhase};
use super::ActionContext;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::library::types::{CardDefId, CardKind, MissionType};

/// `SETUP_GAME`: replace the state with a fresh game built from `deck`.
pub fn setup_game(
    state: &mut GameState,
    deck: &[CardDefId],
    config: &EngineConfig,
    ctx: &mut ActionContext<'_>,
) -> Result<(), EngineError> {
    if state.is_set_up() && state.game_over.is_none() {
        return Err(EngineError::GameInProgress);
    }

    let mut missions = Vec::new();
    let mut dilemmas = Vec::new();
    let mut draw = Vec::new();
    let mut headquarters = 0;
    for id in deck {
        let card = ctx.library.lookup(*id)?;
        match &card.kind {
            CardKind::Mission(m) => {
                if m.headquarters {
                    headquarters += 1;
                }
                missions.push(*id);
            }
            CardKind::Dilemma(_) => dilemmas.push(*id),
            _ => draw.push(*id),
        }
    }
    if missions.len() != config.mission_count {
        return Err(EngineError::InvalidSetup(format!(
            "deck has {} missions, {} required",
            missions.len(),
            config.mission_count
        )));
    }
    if headquarters != 1 {
        return Err(EngineError::InvalidSetup(format!(
            "deck has {} headquarters missions, exactly one required",
            headquarters
        )));
    }
    if draw.len() < config.starting_hand {
        return Err(EngineError::InvalidSetup(format!(
            "draw deck has {} cards, starting hand needs {}",
            draw.len(),
            config.starting_hand
        )));
    }

    let mut fresh = GameState {
        next_unique_id: state.next_unique_id,
        ..GameState::default()
    };
    for def_id in &missions {
        let unique_id = fresh.mint_id();
        fresh.missions.push(MissionDeployment::new(MissionInstance {
            unique_id,
            def_id: *def_id,
            completed: false,
        }));
    }
    for def_id in dilemmas {
        let unique_id = fresh.mint_id();
        fresh.dilemma_pool.push(DilemmaInstance {
            unique_id,
            def_id,
            overcome: false,
            faceup: false,
        });
    }
    for def_id in draw {
        let unique_id = fresh.mint_id();
        fresh.deck.push(CardInstance { unique_id, def_id });
    }
    ctx.shuffle.shuffle(&mut fresh.dilemma_pool);
    ctx.shuffle.shuffle(&mut fresh.deck);
    fresh.hand = fresh.deck.drain(..config.starting_hand).collect();
    fresh.turn = 1;
    fresh.phase = TurnPhase::PlayAndDraw;
    fresh.counters = config.counters_per_turn;

    tracing::info!(
        "game set up: {} missions, {} dilemmas, {} cards in deck",
        fresh.missions.len(),
        fresh.dilemma_pool.len(),
        fresh.deck.len()
    );
    ctx.log.push(LogPayload::GameSetUp {
        missions,
        pool_size: fresh.dilemma_pool.len(),
        deck_size: fresh.deck.len(),
        hand: fresh.hand.iter().map(|c| c.unique_id).collect(),
    });
    *state = fresh;
    Ok(())
}

/// `DRAW`: one counter per card, top of the deck first.
pub fn draw(
    state: &mut GameState,
    count: u32,
    log: &mut Vec<LogPayload>,
) -> Result<(), EngineError> {
    require_phase(state, TurnPhase::PlayAndDraw, "DRAW")?;
    if count == 0 {
        return Err(EngineError::InvalidDrawCount);
    }
    if state.counters < count {
        return Err(EngineError::InsufficientCounters {
            needed: count,
            available: state.counters,
        });
    }
    if state.deck.len() < count as usize {
        return Err(EngineError::DeckTooSmall {
            requested: count,
            available: state.deck.len(),
        });
    }
    let drawn: Vec<CardInstance> = state.deck.drain(..count as usize).collect();
    state.counters -= count;
    log.push(LogPayload::CardsDrawn {
        unique_ids: drawn.iter().map(|c| c.unique_id).collect(),
        counters_left: state.counters,
    });
    state.hand.extend(drawn);
    Ok(())
}

/// `DEPLOY`: pay the card's cost and put it into play.
pub fn deploy(
    state: &mut GameState,
    card_id: UniqueId,
    mission_index: Option<usize>,
    ctx: &mut ActionContext<'_>,
) -> Result<(), EngineError> {
    require_phase(state, TurnPhase::PlayAndDraw, "DEPLOY")?;
    let position = state.hand_position(card_id)?;
    let instance = state.hand[position].clone();
    let card = ctx.library.lookup(instance.def_id)?;
    let destination = match mission_index {
        Some(index) => index,
        None => state
            .headquarters_index(ctx.library)
            .ok_or(EngineError::InvalidSetup("no headquarters in play".to_string()))?,
    };
    let target = mission_def(ctx.library, state.mission(destination)?)?;

    let affiliation = match &card.kind {
        CardKind::Mission(_) => return Err(EngineError::NotDeployable("mission")),
        CardKind::Dilemma(_) => return Err(EngineError::NotDeployable("dilemma")),
        CardKind::Personnel(p) => Some(p.affiliation),
        CardKind::Ship(s) => Some(s.affiliation),
        CardKind::Interrupt(_) | CardKind::Event(_) => None,
    };
    if let Some(affiliation) = affiliation {
        if !target.headquarters && !target.affiliations.contains(&affiliation) {
            return Err(EngineError::AffiliationMismatch {
                mission: destination,
                affiliation,
            });
        }
    }
    if matches!(card.kind, CardKind::Personnel(_))
        && !target.headquarters
        && target.mission_type == MissionType::Space
    {
        return Err(EngineError::NoPlanetSurface(destination));
    }
    let cost = ctx.resolver.deploy_cost(card, target);
    if state.counters < cost {
        return Err(EngineError::InsufficientCounters {
            needed: cost,
            available: state.counters,
        });
    }

    state.hand.remove(position);
    state.counters -= cost;
    let group_index = match &card.kind {
        CardKind::Personnel(_) => {
            state.group_mut(destination, 0)?.personnel.push(PersonnelInstance {
                unique_id: instance.unique_id,
                def_id: instance.def_id,
                status: PersonnelStatus::Unstopped,
            });
            Some(0)
        }
        CardKind::Ship(s) => {
            let groups = &mut state.mission_mut(destination)?.groups;
            groups.push(Group::aboard(ShipInstance {
                unique_id: instance.unique_id,
                def_id: instance.def_id,
                range_remaining: s.range,
            }));
            Some(groups.len() - 1)
        }
        _ => {
            state.discard.push(instance.clone());
            None
        }
    };
    tracing::info!(
        "deployed {} ({}) to mission {} for {} counters",
        card.name,
        instance.unique_id,
        destination,
        cost
    );
    ctx.log.push(LogPayload::CardDeployed {
        unique_id: instance.unique_id,
        def_id: instance.def_id,
        mission_index: destination,
        group_index,
        cost,
    });
    Ok(())
}

/// `MOVE_SHIP`: relocate a staffed ship group between missions.
pub fn move_ship(
    state: &mut GameState,
    source: usize,
    group_index: usize,
    destination: usize,
    ctx: &mut ActionContext<'_>,
) -> Result<(), EngineError> {
    require_phase(state, TurnPhase::ExecuteOrders, "MOVE_SHIP")?;
    if source == destination {
        return Err(EngineError::SameMission);
    }
    let group = state.group(source, group_index)?;
    let ship = group
        .ship
        .as_ref()
        .ok_or(EngineError::NotAShipGroup(group_index))?;
    let ship_def = ctx
        .library
        .lookup(ship.def_id)?
        .as_ship()
        .ok_or(EngineError::UnknownCardDefinition(ship.def_id))?;
    let crew = group.roster(ctx.library, ctx.resolver);
    let from = mission_def(ctx.library, state.mission(source)?)?;
    let to = mission_def(ctx.library, state.mission(destination)?)?;
    let cost = validate_move(ship.range_remaining, ship_def, &crew, from, to)?;

    let new_group_index = commit_move(state, source, group_index, destination, cost)?;
    tracing::info!(
        "ship group moved from mission {} to {} (range cost {})",
        source,
        destination,
        cost
    );
    ctx.log.push(LogPayload::ShipMoved {
        source,
        group_index,
        destination,
        new_group_index,
        cost,
    });
    Ok(())
}

fn ship_group_index(
    state: &GameState,
    mission_index: usize,
    group_index: usize,
) -> Result<usize, EngineError> {
    let group = state.group(mission_index, group_index)?;
    if group.ship.is_none() {
        return Err(EngineError::NotAShipGroup(group_index));
    }
    Ok(group_index)
}

/// Move one unstopped personnel between two groups at the same mission.
fn beam(
    state: &mut GameState,
    mission_index: usize,
    from_group: usize,
    to_group: usize,
    personnel_id: UniqueId,
    log: &mut Vec<LogPayload>,
) -> Result<(), EngineError> {
    let position = state
        .group(mission_index, from_group)?
        .position_of(personnel_id)
        .ok_or(EngineError::UnknownPersonnel(personnel_id))?;
    if !state.group(mission_index, from_group)?.personnel[position].is_unstopped() {
        return Err(EngineError::PersonnelStopped(personnel_id));
    }
    state.group(mission_index, to_group)?;

    let person = state
        .group_mut(mission_index, from_group)?
        .personnel
        .remove(position);
    state.group_mut(mission_index, to_group)?.personnel.push(person);
    tracing::debug!(
        "personnel {} beamed from group {} to {} at mission {}",
        personnel_id,
        from_group,
        to_group,
        mission_index
    );
    log.push(LogPayload::Beamed {
        mission_index,
        personnel_id,
        from_group,
        to_group,
    });
    Ok(())
}

/// `BEAM_TO_SHIP`: planetside personnel boards a ship at the same mission.
pub fn beam_to_ship(
    state: &mut GameState,
    mission_index: usize,
    personnel_id: UniqueId,
    group_index: usize,
    log: &mut Vec<LogPayload>,
) -> Result<(), EngineError> {
    require_phase(state, TurnPhase::ExecuteOrders, "BEAM_TO_SHIP")?;
    let to_group = ship_group_index(state, mission_index, group_index)?;
    beam(state, mission_index, 0, to_group, personnel_id, log)
}

/// `BEAM_TO_PLANET`: ship crew goes down to the mission's surface.
pub fn beam_to_planet(
    state: &mut GameState,
    mission_index: usize,
    group_index: usize,
    personnel_id: UniqueId,
    ctx: &mut ActionContext<'_>,
) -> Result<(), EngineError> {
    require_phase(state, TurnPhase::ExecuteOrders, "BEAM_TO_PLANET")?;
    let from_group = ship_group_index(state, mission_index, group_index)?;
    let def = mission_def(ctx.library, state.mission(mission_index)?)?;
    if !def.headquarters && def.mission_type == MissionType::Space {
        return Err(EngineError::NoPlanetSurface(mission_index));
    }
    beam(state, mission_index, from_group, 0, personnel_id, ctx.log)
}

/// `DISCARD_CARD`: only while trimming the hand at the end of the turn.
pub fn discard(
    state: &mut GameState,
    card_id: UniqueId,
    log: &mut Vec<LogPayload>,
) -> Result<(), EngineError> {
    require_phase(state, TurnPhase::DiscardExcess, "DISCARD_CARD")?;
    let position = state.hand_position(card_id)?;
    let card = state.hand.remove(position);
    log.push(LogPayload::CardDiscarded {
        unique_id: card.unique_id,
        def_id: card.def_id,
    });
    state.discard.push(card);
    Ok(())
}
