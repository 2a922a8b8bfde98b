//! Wandering NPC on a 1D track.
//!
//! ```text
//! Mind
//! ├── Chase     (player within sight, leaves past LOSE_SIGHT)
//! └── Wander
//!     ├── Stroll (stamina full, leaves when exhausted)
//!     └── Rest
//! ```
//!
//! `Stroll` outranks `Rest`, so a rested goblin always gets up on the next tick.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use state_tree::{Children, Node, NodeCtx, NodeView};

const SIGHT: f32 = 3.0;
const LOSE_SIGHT: f32 = 5.0;
const STROLL_SPEED: f32 = 1.5;
const CHASE_SPEED: f32 = 3.5;
const ROAM: f32 = 4.0;
const STROLL_COST: f32 = 0.25;
const REST_GAIN: f32 = 0.5;

/// Shared context of the goblin tree.
#[derive(Debug, Clone)]
pub struct Goblin {
    pub position: f32,
    pub home: f32,
    pub target: f32,
    pub stamina: f32,
    /// Player position, written by the driver each tick.
    pub player: f32,
    rng: ChaCha8Rng,
}

impl Goblin {
    pub fn new(home: f32, seed: u64) -> Self {
        Self {
            position: home,
            home,
            target: home,
            stamina: 1.0,
            player: f32::INFINITY,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn distance_to_player(&self) -> f32 {
        (self.player - self.position).abs()
    }

    /// Picks the next stroll target within `ROAM` of home.
    fn pick_target(&mut self) {
        self.target = self.home + self.rng.gen_range(-ROAM..=ROAM);
    }

    /// Moves toward `goal` without overshooting; returns whether it arrived.
    fn approach(&mut self, goal: f32, speed: f32, delta: f32) -> bool {
        let step = speed * delta;
        let gap = goal - self.position;
        if gap.abs() <= step {
            self.position = goal;
            true
        } else {
            self.position += step * gap.signum();
            false
        }
    }
}

#[derive(Default)]
pub struct Mind;

impl Node<Goblin> for Mind {
    fn on_init(&mut self, children: &mut Children<Goblin>) {
        children.push(Chase).push(Wander);
    }
}

pub struct Chase;

impl Node<Goblin> for Chase {
    fn entry_condition(&self, view: &NodeView<'_, Goblin>) -> bool {
        view.data().distance_to_player() < SIGHT
    }

    fn exit_condition(&self, view: &NodeView<'_, Goblin>) -> bool {
        view.data().distance_to_player() > LOSE_SIGHT
    }

    fn on_enter(&mut self, ctx: &mut NodeCtx<'_, Goblin>) {
        tracing::info!("goblin spotted the player at {:.1}", ctx.data().player);
    }

    fn on_update(&mut self, ctx: &mut NodeCtx<'_, Goblin>, delta: f32) {
        let goblin = ctx.data_mut();
        let player = goblin.player;
        goblin.approach(player, CHASE_SPEED, delta);
    }

    fn on_exit(&mut self, ctx: &mut NodeCtx<'_, Goblin>) {
        tracing::info!(
            "goblin lost the player after {:.2}s",
            ctx.state_time()
        );
    }
}

pub struct Wander;

impl Node<Goblin> for Wander {
    fn on_init(&mut self, children: &mut Children<Goblin>) {
        children.push(Stroll).push(Rest);
    }
}

pub struct Stroll;

impl Node<Goblin> for Stroll {
    fn entry_condition(&self, view: &NodeView<'_, Goblin>) -> bool {
        view.data().stamina >= 1.0
    }

    fn exit_condition(&self, view: &NodeView<'_, Goblin>) -> bool {
        view.data().stamina <= 0.0
    }

    fn on_enter(&mut self, ctx: &mut NodeCtx<'_, Goblin>) {
        ctx.data_mut().pick_target();
    }

    fn on_update(&mut self, ctx: &mut NodeCtx<'_, Goblin>, delta: f32) {
        let goblin = ctx.data_mut();
        goblin.stamina = (goblin.stamina - STROLL_COST * delta).max(0.0);
        let target = goblin.target;
        if goblin.approach(target, STROLL_SPEED, delta) {
            goblin.pick_target();
        }
    }
}

pub struct Rest;

impl Node<Goblin> for Rest {
    fn on_update(&mut self, ctx: &mut NodeCtx<'_, Goblin>, delta: f32) {
        let goblin = ctx.data_mut();
        goblin.stamina = (goblin.stamina + REST_GAIN * delta).min(1.0);
    }
}
