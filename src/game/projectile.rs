//! Projectiles
//!
//! A projectile attack swings no hitbox of its own. On the first active
//! frame the attacker releases a projectile shaped like the attack's hitbox,
//! which then travels horizontally at the attack's speed. It is tested
//! against the opponent's hurtbox every frame, is spent by its first hit or
//! block, and despawns once it is fully past a stage wall. Invincible
//! targets let it pass.

use serde::{Serialize, Deserialize};
use tracing::debug;

use crate::core::fixed::to_float;
use crate::core::hash::StateHasher;
use crate::core::rect::FixedRect;
use crate::game::character::{Character, Facing};
use crate::game::combat::{self, HitOutcome};
use crate::game::events::GameEvent;
use crate::game::hitbox;
use crate::game::moveset::AttackDefinition;
use crate::game::physics::Stage;
use crate::game::state::Side;

/// A projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Projectile {
    /// Side that fired it
    pub owner: Side,
    /// Direction of travel
    pub direction: Facing,
    /// World-space hitbox
    pub bounds: FixedRect,
    /// Attack it carries
    pub definition: AttackDefinition,
}

impl Projectile {
    /// Release a projectile from the attacker's hitbox position.
    pub fn launch(owner: Side, attacker: &Character, definition: AttackDefinition) -> Self {
        Self {
            owner,
            direction: attacker.facing,
            bounds: hitbox::world_hitbox(attacker, &definition),
            definition,
        }
    }

    /// Move one frame along the direction of travel.
    #[inline]
    pub fn advance(&mut self) {
        let step = self.definition.projectile_speed.wrapping_mul(self.direction.sign());
        self.bounds.x = self.bounds.x.wrapping_add(step);
    }

    /// Entirely outside the walls.
    #[inline]
    pub fn off_stage(&self, stage: &Stage) -> bool {
        self.bounds.right() <= stage.left_wall || self.bounds.x >= stage.right_wall
    }

    /// Overlaps a hittable defender.
    #[inline]
    pub fn touches(&self, defender: &Character) -> bool {
        !defender.invincible && self.bounds.overlaps(&hitbox::hurtbox(defender))
    }

    /// Feed into the match state hash.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u8(self.owner as u8);
        hasher.update_u8(self.direction as u8);
        hasher.update_fixed(self.bounds.x);
        hasher.update_fixed(self.bounds.y);
        hasher.update_u8(self.definition.kind as u8);
    }
}

/// Renderer view of a projectile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileSnapshot {
    /// Side that fired it
    pub owner: Side,
    /// Top-left, in pixels
    pub position: (f32, f32),
    /// Direction of travel
    pub direction: Facing,
}

impl From<&Projectile> for ProjectileSnapshot {
    fn from(p: &Projectile) -> Self {
        Self {
            owner: p.owner,
            position: (to_float(p.bounds.x), to_float(p.bounds.y)),
            direction: p.direction,
        }
    }
}

/// Release the projectile of every attack that just became active.
///
/// The swing is marked as landed so it can fire only once.
pub fn launch_ready(
    characters: &mut [Character; 2],
    projectiles: &mut Vec<Projectile>,
    frame: u32,
    events: &mut Vec<GameEvent>,
) {
    for side in Side::ALL {
        let ch = &mut characters[side.index()];
        if !ch.attack_active() {
            continue;
        }
        let definition = match ch.active_attack.as_mut() {
            Some(attack) if attack.definition.is_projectile() && !attack.has_landed => {
                attack.has_landed = true;
                attack.definition
            }
            _ => continue,
        };

        let projectile = Projectile::launch(side, ch, definition);
        debug!(?side, kind = ?definition.kind, x = projectile.bounds.x >> 16, "projectile launched");
        projectiles.push(projectile);
        events.push(GameEvent::projectile_launched(frame, side));
    }
}

/// Hit-test every projectile in flight, then move the survivors and drop
/// the ones that left the stage. Projectiles are processed in launch order.
pub fn update_projectiles(
    characters: &mut [Character; 2],
    projectiles: &mut Vec<Projectile>,
    stage: &Stage,
    frame: u32,
    events: &mut Vec<GameEvent>,
) {
    projectiles.retain_mut(|projectile| {
        let target = &characters[projectile.owner.opponent().index()];
        if projectile.touches(target) {
            let outcome = combat::resolve_projectile(characters, projectile, frame, events);
            if outcome != HitOutcome::Ignored {
                return false;
            }
        }

        projectile.advance();
        if projectile.off_stage(stage) {
            debug!(owner = ?projectile.owner, "projectile left the stage");
            return false;
        }
        true
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::from_int;
    use crate::core::vec2::FixedVec2;
    use crate::game::action::ActionState;
    use crate::game::character::{ActiveAttack, CharacterId};
    use crate::game::moveset::{AttackKind, Moveset};

    fn fighters(bowser_x: i32) -> [Character; 2] {
        [
            Character::new(CharacterId::Mario, FixedVec2::from_ints(100, 726), Facing::Right),
            Character::new(CharacterId::Bowser, FixedVec2::from_ints(bowser_x, 678), Facing::Left),
        ]
    }

    fn fireball() -> AttackDefinition {
        *Moveset::builtin().unwrap().attack(CharacterId::Mario, AttackKind::Special)
    }

    fn start_special(mario: &mut Character) {
        let def = fireball();
        mario.active_attack = Some(ActiveAttack::new(def));
        mario.set_state(ActionState::AttackSpecial, Some(def.total_frames()));
    }

    #[test]
    fn test_launch_once_when_active() {
        let mut chars = fighters(1200);
        let mut projectiles = Vec::new();
        let mut events = Vec::new();
        start_special(&mut chars[0]);

        chars[0].state_timer = fireball().startup_frames - 1;
        launch_ready(&mut chars, &mut projectiles, 1, &mut events);
        assert!(projectiles.is_empty());

        chars[0].state_timer += 1;
        launch_ready(&mut chars, &mut projectiles, 2, &mut events);
        chars[0].state_timer += 1;
        launch_ready(&mut chars, &mut projectiles, 3, &mut events);

        assert_eq!(projectiles.len(), 1);
        assert_eq!(events.len(), 1);
        assert_eq!(projectiles[0].owner, Side::P1);
        assert_eq!(projectiles[0].bounds, hitbox::world_hitbox(&chars[0], &fireball()));
    }

    #[test]
    fn test_travels_and_despawns() {
        let stage = Stage::default();
        let mut chars = fighters(1200);
        chars[1].invincible = true;
        let mut projectiles = vec![Projectile::launch(Side::P1, &chars[0], fireball())];
        let start = projectiles[0].bounds.x;
        let mut events = Vec::new();

        update_projectiles(&mut chars, &mut projectiles, &stage, 1, &mut events);
        assert_eq!(projectiles[0].bounds.x, start + fireball().projectile_speed);

        // Passes through the invincible Bowser and leaves on the right.
        let mut frames = 1;
        while !projectiles.is_empty() {
            update_projectiles(&mut chars, &mut projectiles, &stage, frames, &mut events);
            frames += 1;
            assert!(frames < 400);
        }
        assert!(events.is_empty());
        assert_eq!(chars[1].hp, 100);
    }

    #[test]
    fn test_left_travel_mirrors() {
        let [mut mario, _] = fighters(1200);
        mario.facing = Facing::Left;
        let mut p = Projectile::launch(Side::P1, &mario, fireball());
        let start = p.bounds.x;
        p.advance();
        assert_eq!(p.bounds.x, start - from_int(5));
    }

    #[test]
    fn test_hit_spends_projectile() {
        let stage = Stage::default();
        let mut chars = fighters(170);
        let mut projectiles = vec![Projectile::launch(Side::P1, &chars[0], fireball())];
        let mut events = Vec::new();

        update_projectiles(&mut chars, &mut projectiles, &stage, 1, &mut events);
        assert!(projectiles.is_empty());
        assert_eq!(chars[1].hp, 100 - fireball().damage);
        assert_eq!(chars[0].ultimate_meter, fireball().meter_gain_attacker);
        assert_eq!(chars[1].velocity.x, fireball().knockback.x);
    }

    #[test]
    fn test_guard_break_through_block() {
        let stage = Stage::default();
        let mut chars = fighters(170);
        chars[1].state = ActionState::Block;
        let mut projectiles = vec![Projectile::launch(Side::P1, &chars[0], fireball())];
        let mut events = Vec::new();

        update_projectiles(&mut chars, &mut projectiles, &stage, 1, &mut events);
        assert_eq!(chars[1].hp, 100 - fireball().damage);
    }

    #[test]
    fn test_blockable_projectile_is_spent_on_block() {
        let stage = Stage::default();
        let mut chars = fighters(170);
        chars[1].state = ActionState::Block;
        let mut def = fireball();
        def.guard_break = false;
        let mut projectiles = vec![Projectile::launch(Side::P1, &chars[0], def)];
        let mut events = Vec::new();

        update_projectiles(&mut chars, &mut projectiles, &stage, 1, &mut events);
        assert!(projectiles.is_empty());
        assert_eq!(chars[1].hp, 100);
        assert!(chars[1].blockstun_frames_remaining > 0);
    }
}
