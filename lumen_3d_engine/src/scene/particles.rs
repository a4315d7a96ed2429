//! Particle emitters.
//!
//! An `Emitter` owns its live particles and a boxed `EmitterBehavior` that
//! decides how particles are born and how their channels evolve. The
//! emitter itself handles the timing that every behavior shares:
//!
//! 1. age the emitter (unless immortal)
//! 2. spawn `particles_per_spawn` particles once `spawn_period` has elapsed
//! 3. age every particle by the frame delta and let the behavior advance it
//! 4. drop every particle whose age reached its death age
//!
//! Drawing goes through `DrawContext::draw_particle`, one point per
//! particle expanded by the particle shader.

use std::f32::consts::TAU;
use glam::{Mat4, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use slotmap::new_key_type;
use crate::error::Result;
use crate::render::DrawContext;
use crate::resource::{Resource, ShaderKey, TextureKey};
use crate::scene::{Kinematics, VecKinematics};
use crate::timer::FrameTime;

new_key_type! {
    /// Key of an `Emitter` not yet attached to a node
    pub struct EmitterKey;
}

// ============================================================================
// PARTICLE
// ============================================================================

/// One live particle
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    /// Seconds since spawn
    pub age: f64,
    /// Removed once `age >= age_at_death`
    pub age_at_death: f64,
    pub shader: Option<ShaderKey>,
    pub texture: Option<TextureKey>,
    pub size: Kinematics,
    pub opacity: Kinematics,
    pub rotation: Kinematics,
    /// Offset from the spawn transform
    pub position: VecKinematics,
    /// World transform at spawn
    pub transform: Mat4,
}

impl Particle {
    pub fn new(age_at_death: f64, shader: Option<ShaderKey>, texture: Option<TextureKey>, transform: Mat4) -> Self {
        Self {
            age: 0.0,
            age_at_death,
            shader,
            texture,
            size: Kinematics::new(1.0, 0.0, 0.0),
            opacity: Kinematics::new(1.0, 0.0, 0.0),
            rotation: Kinematics::new(0.0, 0.0, 0.0),
            position: VecKinematics::new(Vec3::ZERO, 0.0, 0.0),
            transform,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.age >= self.age_at_death
    }

    /// Advance every channel by one frame
    pub fn compute_channels(&mut self, time: &FrameTime) {
        self.opacity.compute(time);
        self.size.compute(time);
        self.rotation.compute(time);
        self.position.compute(time);
    }
}

// ============================================================================
// BEHAVIOR
// ============================================================================

/// Spawn and update rules of one kind of emitter
pub trait EmitterBehavior: Send {
    /// Create one particle at `world`
    fn emit(&mut self, world: &Mat4, rng: &mut StdRng) -> Particle;

    /// Advance a particle whose age has already been updated
    fn respond_particle(&mut self, particle: &mut Particle, time: &FrameTime) {
        particle.compute_channels(time);
    }
}

// ============================================================================
// EMITTER
// ============================================================================

/// Spawns, updates and retires particles
pub struct Emitter {
    name: String,
    /// Seconds between spawns
    pub spawn_period: f64,
    /// Pausable time of the last spawn
    pub last_spawn_time: f64,
    pub particles_per_spawn: usize,
    /// Immortal emitters never age
    pub immortal: bool,
    /// Age after which a mortal emitter stops spawning (0 = never)
    pub lifetime: f64,
    pub age: f64,
    /// Placement relative to the owning node
    pub local_transform: Mat4,
    particles: Vec<Particle>,
    behavior: Box<dyn EmitterBehavior>,
    rng: StdRng,
}

impl Emitter {
    /// Immortal emitter spawning one particle per second
    pub fn new(name: &str, behavior: impl EmitterBehavior + 'static) -> Self {
        Self {
            name: name.to_string(),
            spawn_period: 1.0,
            last_spawn_time: 0.0,
            particles_per_spawn: 1,
            immortal: true,
            lifetime: 0.0,
            age: 0.0,
            local_transform: Mat4::IDENTITY,
            particles: Vec::new(),
            behavior: Box::new(behavior),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_spawn(mut self, period: f64, particles_per_spawn: usize) -> Self {
        self.spawn_period = period;
        self.particles_per_spawn = particles_per_spawn;
        self
    }

    /// Mortal emitter that stops spawning after `lifetime` seconds
    pub fn with_lifetime(mut self, lifetime: f64) -> Self {
        self.immortal = false;
        self.lifetime = lifetime;
        self
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.local_transform = transform;
        self
    }

    /// Reproducible spawning
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Whether a mortal emitter has outlived its lifetime
    pub fn is_expired(&self) -> bool {
        !self.immortal && self.lifetime > 0.0 && self.age >= self.lifetime
    }

    /// Spawn one batch at `world * local_transform`
    pub fn spawn(&mut self, world: &Mat4) {
        let at = *world * self.local_transform;
        for _ in 0..self.particles_per_spawn {
            let particle = self.behavior.emit(&at, &mut self.rng);
            self.particles.push(particle);
        }
    }

    /// Update for one frame with the owner's world transform
    pub fn respond(&mut self, world: &Mat4, time: &FrameTime) {
        if !self.immortal {
            self.age += time.delta;
        }

        if !self.is_expired() && time.time - self.last_spawn_time > self.spawn_period {
            self.last_spawn_time = time.time;
            self.spawn(world);
        }

        for particle in &mut self.particles {
            particle.age += time.delta;
            self.behavior.respond_particle(particle, time);
        }
        self.particles.retain(|p| !p.is_dead());
    }

    /// Draw every live particle
    pub fn draw(&self, ctx: &mut DrawContext<'_>) -> Result<()> {
        for particle in &self.particles {
            ctx.draw_particle(particle)?;
        }
        Ok(())
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }
}

impl Resource for Emitter {
    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// WATER DROPS
// ============================================================================

/// Tunables of `WaterDrop`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaterDropParams {
    /// Seconds a drop lives
    pub lifetime: f64,
    /// Horizontal launch speed
    pub launch_speed: f32,
    pub max_speed: f32,
    /// Downward acceleration
    pub gravity: f32,
    pub start_opacity: f32,
    pub fade: f32,
    pub start_size: f32,
    pub shrink: f32,
}

impl Default for WaterDropParams {
    fn default() -> Self {
        Self {
            lifetime: 3.0,
            launch_speed: 10.0,
            max_speed: 20.0,
            gravity: 9.8,
            start_opacity: 1.0,
            fade: 0.23,
            start_size: 0.5,
            shrink: 0.13,
        }
    }
}

/// Drops thrown in a random horizontal direction, falling, shrinking and fading
#[derive(Debug, Clone, PartialEq)]
pub struct WaterDrop {
    pub shader: Option<ShaderKey>,
    pub texture: Option<TextureKey>,
    pub params: WaterDropParams,
}

impl WaterDrop {
    pub fn new(shader: Option<ShaderKey>, texture: Option<TextureKey>) -> Self {
        Self { shader, texture, params: WaterDropParams::default() }
    }

    pub fn with_params(mut self, params: WaterDropParams) -> Self {
        self.params = params;
        self
    }
}

impl EmitterBehavior for WaterDrop {
    fn emit(&mut self, world: &Mat4, rng: &mut StdRng) -> Particle {
        let p = &self.params;
        let angle = rng.gen_range(0.0..TAU);
        let direction = Vec3::new(angle.cos(), 0.0, angle.sin());

        let mut particle = Particle::new(p.lifetime, self.shader, self.texture, *world);
        particle.opacity = Kinematics::new(p.start_opacity, -1.5, 0.0).with_accel(-p.fade);
        particle.size = Kinematics::new(p.start_size, -0.5, 0.0).with_accel(-p.shrink);
        particle.position = VecKinematics::new(Vec3::ZERO, 0.0, p.max_speed)
            .with_speed(direction * p.launch_speed)
            .with_accel(Vec3::new(0.0, -p.gravity, 0.0));
        particle
    }
}

#[cfg(test)]
#[path = "particles_tests.rs"]
mod tests;
