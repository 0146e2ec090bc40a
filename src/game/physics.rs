//! Physics
//!
//! Per-frame integration for one character body: input-driven horizontal
//! velocity, gravity, ground contact and wall clamping. Runs after the
//! action state machine has picked this frame's state.

use serde::{Serialize, Deserialize};

use crate::core::fixed::{
    Fixed,
    GRAVITY, GROUND_FRICTION,
    STAGE_GROUND_Y, STAGE_LEFT_WALL, STAGE_RIGHT_WALL,
    fixed_clamp, fixed_mul,
};
use crate::game::action::{self, ActionState};
use crate::game::character::Character;
use crate::game::input::InputFrame;

// =============================================================================
// STAGE
// =============================================================================

/// Stage bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stage {
    /// Y coordinate of the floor
    pub ground_y: Fixed,
    /// Leftmost x a body may occupy
    pub left_wall: Fixed,
    /// Rightmost x a body may occupy
    pub right_wall: Fixed,
    /// Spawn body centres for P1 and P2
    pub spawn_center_x: [Fixed; 2],
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            ground_y: STAGE_GROUND_Y,
            left_wall: STAGE_LEFT_WALL,
            right_wall: STAGE_RIGHT_WALL,
            spawn_center_x: [29491200, 55705600], // 450.0, 850.0
        }
    }
}

// =============================================================================
// INTEGRATION
// =============================================================================

/// Tunables for the integrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhysicsParams {
    /// Downward acceleration per frame
    pub gravity: Fixed,
    /// Per-frame horizontal velocity multiplier on the ground when not moving
    pub ground_friction: Fixed,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            ground_friction: GROUND_FRICTION,
        }
    }
}

/// What happened during integration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PhysicsOutcome {
    /// Character touched the ground after being airborne this frame,
    /// whatever state it was in
    pub landed: bool,
}

/// Advance one body by one frame.
pub fn integrate(
    ch: &mut Character,
    input: &InputFrame,
    stage: &Stage,
    params: &PhysicsParams,
) -> PhysicsOutcome {
    let mut outcome = PhysicsOutcome::default();

    if ch.state.is_terminal() && ch.grounded {
        ch.velocity.x = 0;
        ch.velocity.y = 0;
        return outcome;
    }

    let stats = ch.stats();

    // Horizontal: input sets velocity directly when the state allows it,
    // otherwise grounded bodies slide to a stop.
    if ch.hitstun_frames_remaining == 0 && ch.state.permits_movement() {
        let speed = if input.running() { stats.run_speed } else { stats.walk_speed };
        ch.velocity.x = speed.wrapping_mul(input.horizontal());
    } else if ch.grounded {
        ch.velocity.x = fixed_mul(ch.velocity.x, params.ground_friction);
    }

    // Vertical: no gravity while crouching or resting on the ground.
    let resting = ch.grounded && ch.velocity.y == 0;
    if ch.state != ActionState::Crouch && !resting {
        ch.velocity.y = ch.velocity.y.wrapping_add(params.gravity);
    }

    ch.position = ch.position.add(ch.velocity);

    // Ground contact
    let was_airborne = !ch.grounded;
    if ch.position.y.wrapping_add(stats.height) >= stage.ground_y {
        ch.position.y = stage.ground_y - stats.height;
        ch.velocity.y = 0;
        ch.grounded = true;
        if was_airborne {
            action::on_landed(ch);
            outcome.landed = true;
        }
    } else {
        ch.grounded = false;
    }

    // Walls
    ch.position.x = fixed_clamp(ch.position.x, stage.left_wall, stage.right_wall - stats.width);

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixed::{from_int, to_fixed};
    use crate::core::vec2::FixedVec2;
    use crate::game::character::{CharacterId, Facing};
    use crate::game::input::Command;

    fn grounded(id: CharacterId, x: i32) -> Character {
        let stage = Stage::default();
        let mut ch = Character::new(id, FixedVec2::new(from_int(x), 0), Facing::Right);
        ch.position.y = stage.ground_y - ch.stats().height;
        ch
    }

    #[test]
    fn test_walk_moves_by_walk_speed() {
        let mut ch = grounded(CharacterId::Mario, 100);
        ch.state = ActionState::Walk;
        let x0 = ch.position.x;
        integrate(&mut ch, &InputFrame::holding(&[Command::MoveRight]), &Stage::default(), &PhysicsParams::default());
        assert_eq!(ch.position.x - x0, to_fixed(3.0));
        assert!(ch.grounded);
        assert_eq!(ch.velocity.y, 0);
    }

    #[test]
    fn test_run_speed() {
        let mut ch = grounded(CharacterId::Mario, 100);
        ch.state = ActionState::Run;
        let input = InputFrame::holding(&[Command::MoveLeft, Command::RunModifier]);
        integrate(&mut ch, &input, &Stage::default(), &PhysicsParams::default());
        assert_eq!(ch.velocity.x, -to_fixed(5.0));
    }

    #[test]
    fn test_jump_arc_lands() {
        let stage = Stage::default();
        let params = PhysicsParams::default();
        let mut ch = grounded(CharacterId::Mario, 100);
        let floor = ch.position.y;

        ch.velocity.y = ch.stats().jump_velocity;
        ch.grounded = false;
        ch.state = ActionState::JumpFall;

        let mut landed_at = None;
        for frame in 0..120 {
            let out = integrate(&mut ch, &InputFrame::new(), &stage, &params);
            assert!(ch.position.y <= floor);
            if out.landed {
                landed_at = Some(frame);
                break;
            }
        }
        assert!(landed_at.is_some());
        assert_eq!(ch.state, ActionState::Land);
        assert_eq!(ch.position.y, floor);
        assert_eq!(ch.velocity.y, 0);
    }

    #[test]
    fn test_touchdown_reported_from_any_state() {
        let stage = Stage::default();
        let params = PhysicsParams::default();

        for state in [ActionState::AttackAir, ActionState::Hurt] {
            let mut ch = grounded(CharacterId::Mario, 300);
            let floor = ch.position.y;
            ch.position.y = floor - from_int(4);
            ch.velocity.y = from_int(6);
            ch.grounded = false;
            ch.state = state;
            if state == ActionState::Hurt {
                ch.hitstun_frames_remaining = 5;
            }

            let out = integrate(&mut ch, &InputFrame::new(), &stage, &params);
            assert!(out.landed, "{:?} touchdown not reported", state);
            assert!(ch.grounded);
            assert_eq!(ch.position.y, floor);
            // Only a plain fall enters landing recovery.
            assert_eq!(ch.state, state);
        }
    }

    #[test]
    fn test_wall_clamp() {
        let stage = Stage::default();
        let params = PhysicsParams::default();
        let mut ch = grounded(CharacterId::Bowser, 1400);
        ch.state = ActionState::Run;
        let input = InputFrame::holding(&[Command::MoveRight, Command::RunModifier]);
        for _ in 0..200 {
            integrate(&mut ch, &input, &stage, &params);
            assert!(ch.position.x + ch.stats().width <= stage.right_wall);
        }
        assert_eq!(ch.position.x, stage.right_wall - ch.stats().width);

        ch.position.x = stage.left_wall;
        let input = InputFrame::holding(&[Command::MoveLeft]);
        integrate(&mut ch, &input, &stage, &params);
        assert_eq!(ch.position.x, stage.left_wall);
    }

    #[test]
    fn test_friction_when_locked() {
        let mut ch = grounded(CharacterId::Mario, 300);
        ch.state = ActionState::Hurt;
        ch.hitstun_frames_remaining = 10;
        ch.velocity.x = from_int(10);
        integrate(&mut ch, &InputFrame::holding(&[Command::MoveLeft]), &Stage::default(), &PhysicsParams::default());
        assert!(ch.velocity.x > 0 && ch.velocity.x < from_int(10));
    }

    #[test]
    fn test_knockback_launch_leaves_ground() {
        let mut ch = grounded(CharacterId::Mario, 300);
        ch.state = ActionState::Hurt;
        ch.hitstun_frames_remaining = 10;
        ch.velocity.y = -from_int(5);
        integrate(&mut ch, &InputFrame::new(), &Stage::default(), &PhysicsParams::default());
        assert!(!ch.grounded);
    }

    #[test]
    fn test_crouch_has_no_gravity() {
        let mut ch = grounded(CharacterId::Mario, 300);
        ch.state = ActionState::Crouch;
        integrate(&mut ch, &InputFrame::holding(&[Command::Crouch]), &Stage::default(), &PhysicsParams::default());
        assert_eq!(ch.velocity.y, 0);
        assert!(ch.grounded);
    }
}
