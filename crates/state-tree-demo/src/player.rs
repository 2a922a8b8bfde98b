//! Platformer character driven by a state tree.
//!
//! ```text
//! Player
//! ├── Airborne      (!grounded)
//! │   ├── Rising    (vy > 0)
//! │   └── Falling
//! └── Grounded      (grounded)
//!     ├── Jump      (jump pressed)
//!     ├── Walk      (|axis| > dead zone)
//!     └── Idle
//! ```
//!
//! Physics is a toy integrator standing in for the engine's rigid body; the
//! tree only writes velocities and animation names into [`Avatar`].

use state_tree::{Children, Node, NodeCtx, NodeView, Tree};

pub const GRAVITY: f32 = 30.0;
pub const MOVE_SPEED: f32 = 6.0;
pub const JUMP_STRENGTH: f32 = 12.0;
const AIR_CONTROL: f32 = 0.5;
const DEAD_ZONE: f32 = 0.3;

/// Shared context of the player tree.
#[derive(Debug, Clone)]
pub struct Avatar {
    pub move_axis: f32,
    pub jump_pressed: bool,
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    pub grounded: bool,
    pub animation: &'static str,
}

impl Default for Avatar {
    fn default() -> Self {
        Self {
            move_axis: 0.0,
            jump_pressed: false,
            position: [0.0, 0.0],
            velocity: [0.0, 0.0],
            grounded: true,
            animation: "",
        }
    }
}

impl Avatar {
    /// One explicit Euler step; the floor is at `y = 0`.
    pub fn integrate(&mut self, delta: f32) {
        self.velocity[1] -= GRAVITY * delta;
        self.position[0] += self.velocity[0] * delta;
        self.position[1] += self.velocity[1] * delta;

        if self.position[1] <= 0.0 {
            self.position[1] = 0.0;
            self.velocity[1] = 0.0;
            self.grounded = true;
        } else {
            self.grounded = false;
        }
    }

    fn play(&mut self, animation: &'static str) {
        if self.animation != animation {
            tracing::debug!("animation {} -> {}", self.animation, animation);
            self.animation = animation;
        }
    }
}

/// Input for `tick`: walk right, jump, walk left, jump again.
pub fn scripted_input(tick: u32, tick_rate: u32) -> (f32, bool) {
    let rate = tick_rate.max(1);
    let seconds = tick as f32 / rate as f32;

    let axis = if (0.5..1.5).contains(&seconds) {
        1.0
    } else if (3.0..3.5).contains(&seconds) {
        -1.0
    } else {
        0.0
    };
    let jump = tick == 2 * rate || tick == 4 * rate + rate / 2;

    (axis, jump)
}

/// Runs the tree for one tick, then integrates physics.
pub fn step(tree: &mut Tree<Avatar>, delta: f32) -> state_tree::Result<()> {
    tree.update(delta)?;
    if let Some(avatar) = tree.data_mut() {
        avatar.integrate(delta);
    }
    Ok(())
}

#[derive(Default)]
pub struct Player;

impl Node<Avatar> for Player {
    fn on_init(&mut self, children: &mut Children<Avatar>) {
        children.push(Airborne).push(Grounded);
    }
}

pub struct Airborne;

impl Node<Avatar> for Airborne {
    fn on_init(&mut self, children: &mut Children<Avatar>) {
        children.push(Rising).push(Falling);
    }

    fn entry_condition(&self, view: &NodeView<'_, Avatar>) -> bool {
        !view.data().grounded
    }

    fn exit_condition(&self, view: &NodeView<'_, Avatar>) -> bool {
        view.data().grounded
    }
}

pub struct Rising;

impl Node<Avatar> for Rising {
    fn entry_condition(&self, view: &NodeView<'_, Avatar>) -> bool {
        view.data().velocity[1] > 0.0
    }

    fn exit_condition(&self, view: &NodeView<'_, Avatar>) -> bool {
        view.data().velocity[1] <= 0.0
    }

    fn on_enter(&mut self, ctx: &mut NodeCtx<'_, Avatar>) {
        ctx.data_mut().play("Rise");
    }
}

pub struct Falling;

impl Node<Avatar> for Falling {
    fn on_enter(&mut self, ctx: &mut NodeCtx<'_, Avatar>) {
        ctx.data_mut().play("Fall");
    }

    fn on_update(&mut self, ctx: &mut NodeCtx<'_, Avatar>, _delta: f32) {
        let avatar = ctx.data_mut();
        avatar.velocity[0] = avatar.move_axis * MOVE_SPEED * AIR_CONTROL;
    }
}

pub struct Grounded;

impl Node<Avatar> for Grounded {
    fn on_init(&mut self, children: &mut Children<Avatar>) {
        children.push(Jump).push(Walk).push(Idle);
    }

    fn entry_condition(&self, view: &NodeView<'_, Avatar>) -> bool {
        view.data().grounded
    }

    fn exit_condition(&self, view: &NodeView<'_, Avatar>) -> bool {
        !view.data().grounded
    }
}

pub struct Jump;

impl Node<Avatar> for Jump {
    fn entry_condition(&self, view: &NodeView<'_, Avatar>) -> bool {
        view.data().jump_pressed
    }

    fn on_enter(&mut self, ctx: &mut NodeCtx<'_, Avatar>) {
        let avatar = ctx.data_mut();
        avatar.velocity[1] = JUMP_STRENGTH;
        avatar.play("Jump");
    }
}

pub struct Walk;

impl Node<Avatar> for Walk {
    fn entry_condition(&self, view: &NodeView<'_, Avatar>) -> bool {
        view.data().move_axis.abs() > DEAD_ZONE
    }

    fn exit_condition(&self, view: &NodeView<'_, Avatar>) -> bool {
        view.data().move_axis.abs() < DEAD_ZONE
    }

    fn on_enter(&mut self, ctx: &mut NodeCtx<'_, Avatar>) {
        ctx.data_mut().play("Walk");
    }

    fn on_update(&mut self, ctx: &mut NodeCtx<'_, Avatar>, _delta: f32) {
        let avatar = ctx.data_mut();
        avatar.velocity[0] = avatar.move_axis * MOVE_SPEED;
    }

    fn on_exit(&mut self, ctx: &mut NodeCtx<'_, Avatar>) {
        ctx.data_mut().velocity[0] = 0.0;
    }
}

pub struct Idle;

impl Node<Avatar> for Idle {
    fn on_enter(&mut self, ctx: &mut NodeCtx<'_, Avatar>) {
        let avatar = ctx.data_mut();
        avatar.velocity[0] = 0.0;
        avatar.play("Idle");
    }
}
