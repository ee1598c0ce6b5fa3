//! LunarLander-v3 environment
//!
//! A lander starts at the top of the screen with a random push and has to
//! touch down on the helipad between the two flags. The dynamics follow the
//! Gym Box2D version closely enough for the same hyperparameters to work,
//! but are integrated directly: a single rigid hull, two leg tips resolved
//! with sequential impulses against a piecewise-linear terrain.
//!
//! # Observation
//!
//! `[x, y, vx, vy, angle, angular_velocity, left_contact, right_contact]`,
//! positions relative to the helipad and velocities scaled the way Gym does.
//!
//! # Actions
//!
//! - Discrete: 0 (noop), 1 (fire left engine), 2 (fire main engine),
//!   3 (fire right engine)
//! - Continuous: `[main, lateral]` in `[-1, 1]`. Main fires above 0 with
//!   50%..100% power, lateral fires when `|lateral| > 0.5`.
//!
//! # Reward
//!
//! Potential-based shaping on distance, speed, tilt and leg contact, minus
//! fuel (0.3 per main-engine frame, 0.03 per side-engine frame). Crashing or
//! leaving the screen gives -100, coming to rest gives +100, both terminal.
//!
//! # Reference
//!
//! Based on Gymnasium LunarLander-v3:
//! <https://github.com/Farama-Foundation/Gymnasium/blob/main/gymnasium/envs/box2d/lunar_lander.py>

use anyhow::{Result, anyhow, bail};
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::env::{Action, Environment, SpaceInfo, SpaceType, StepResult};

mod render;

pub(crate) const FPS: f32 = 50.0;
pub(crate) const SCALE: f32 = 30.0;

const MAIN_ENGINE_POWER: f32 = 13.0;
const SIDE_ENGINE_POWER: f32 = 0.6;
const INITIAL_RANDOM: f32 = 1000.0;

const LANDER_POLY: [(f32, f32); 6] =
    [(-14.0, 17.0), (-17.0, 0.0), (-17.0, -10.0), (17.0, -10.0), (17.0, 0.0), (14.0, 17.0)];
const LANDER_DENSITY: f32 = 5.0;
const LEG_AWAY: f32 = 20.0;
const LEG_DOWN: f32 = 18.0;
const SIDE_ENGINE_HEIGHT: f32 = 14.0;
const SIDE_ENGINE_AWAY: f32 = 12.0;
const MAIN_ENGINE_Y_LOCATION: f32 = 4.0;

pub(crate) const VIEWPORT_W: f32 = 600.0;
pub(crate) const VIEWPORT_H: f32 = 400.0;
pub(crate) const W: f32 = VIEWPORT_W / SCALE;
pub(crate) const H: f32 = VIEWPORT_H / SCALE;

const CHUNKS: usize = 11;
const GRAVITY: f32 = -10.0;

// Contact model
const LEG_FRICTION: f32 = 0.2;
const CONTACT_ITERATIONS: usize = 10;
const CONTACT_SLOP: f32 = 0.01;
const LEG_CRASH_SPEED: f32 = 3.0;

// Box2D puts a body to sleep after 0.5s below these speeds
const SLEEP_STEPS: usize = 25;
const LINEAR_SLEEP_TOLERANCE: f32 = 0.05;
const ANGULAR_SLEEP_TOLERANCE: f32 = 0.05;

/// Configuration for [`LunarLander`]
#[derive(Debug, Clone)]
pub struct LanderConfig {
    /// Use the 2-dimensional continuous action space instead of 4 discrete actions
    pub continuous: bool,

    /// Steps before the episode is truncated
    pub max_steps: usize,

    /// Seed for terrain, initial push and engine dispersion
    pub seed: u64,
}

impl Default for LanderConfig {
    fn default() -> Self {
        Self { continuous: false, max_steps: 1000, seed: 0 }
    }
}

/// Terrain heights sampled at evenly spaced chunk boundaries
#[derive(Debug, Clone)]
pub(crate) struct Terrain {
    pub(crate) chunk_x: Vec<f32>,
    pub(crate) chunk_y: Vec<f32>,
    pub(crate) helipad_x1: f32,
    pub(crate) helipad_x2: f32,
    pub(crate) helipad_y: f32,
}

impl Terrain {
    /// Random chunky terrain with a flat helipad in the middle
    fn generate(rng: &mut StdRng) -> Self {
        let helipad_y = H / 4.0;
        let mut height: Vec<f32> = (0..=CHUNKS).map(|_| rng.gen_range(0.0..H / 2.0)).collect();
        let chunk_x: Vec<f32> =
            (0..CHUNKS).map(|i| W / (CHUNKS - 1) as f32 * i as f32).collect();
        let helipad_x1 = chunk_x[CHUNKS / 2 - 1];
        let helipad_x2 = chunk_x[CHUNKS / 2 + 1];
        for h in &mut height[CHUNKS / 2 - 2..=CHUNKS / 2 + 2] {
            *h = helipad_y;
        }

        // The first chunk wraps around to the spare last height
        let chunk_y = (0..CHUNKS)
            .map(|i| {
                let prev = if i == 0 { height[CHUNKS] } else { height[i - 1] };
                0.33 * (prev + height[i] + height[i + 1])
            })
            .collect();

        Self { chunk_x, chunk_y, helipad_x1, helipad_x2, helipad_y }
    }

    /// Ground height at horizontal position `x`, clamped at the edges
    pub(crate) fn height_at(&self, x: f32) -> f32 {
        let last = self.chunk_x.len() - 1;
        if x <= self.chunk_x[0] {
            return self.chunk_y[0];
        }
        if x >= self.chunk_x[last] {
            return self.chunk_y[last];
        }
        let spacing = self.chunk_x[1] - self.chunk_x[0];
        let i = ((x / spacing) as usize).min(last - 1);
        let t = (x - self.chunk_x[i]) / spacing;
        self.chunk_y[i] + t * (self.chunk_y[i + 1] - self.chunk_y[i])
    }
}

/// Engine power applied during the last step, kept for rendering flames
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Firing {
    pub(crate) main: f32,
    /// Signed side power: negative for the left engine, positive for the right
    pub(crate) side: f32,
}

/// LunarLander-v3 environment
#[derive(Debug)]
pub struct LunarLander {
    config: LanderConfig,
    rng: StdRng,

    // Hull state in world units
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    angle: f32,
    angular_velocity: f32,

    mass: f32,
    inertia: f32,

    legs_contact: [bool; 2],
    terrain: Terrain,
    firing: Firing,

    // Episode tracking
    prev_shaping: Option<f32>,
    steps: usize,
    rest_steps: usize,
    game_over: bool,
}

impl LunarLander {
    /// Create a discrete-action lander with default parameters
    pub fn new() -> Self {
        Self::with_config(LanderConfig::default())
    }

    /// Create a lander with custom configuration
    pub fn with_config(config: LanderConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let terrain = Terrain::generate(&mut rng);
        let (mass, inertia) = polygon_mass_inertia(&LANDER_POLY, LANDER_DENSITY);

        Self {
            config,
            rng,
            x: W / 2.0,
            y: H,
            vx: 0.0,
            vy: 0.0,
            angle: 0.0,
            angular_velocity: 0.0,
            mass,
            inertia,
            legs_contact: [false; 2],
            terrain,
            firing: Firing::default(),
            prev_shaping: None,
            steps: 0,
            rest_steps: 0,
            game_over: false,
        }
    }

    /// Whether the lander uses continuous actions
    pub fn is_continuous(&self) -> bool {
        self.config.continuous
    }

    /// Current observation
    pub fn observation(&self) -> Vec<f32> {
        vec![
            (self.x - W / 2.0) / (W / 2.0),
            (self.y - (self.terrain.helipad_y + LEG_DOWN / SCALE)) / (H / 2.0),
            self.vx * (W / 2.0) / FPS,
            self.vy * (H / 2.0) / FPS,
            self.angle,
            20.0 * self.angular_velocity / FPS,
            if self.legs_contact[0] { 1.0 } else { 0.0 },
            if self.legs_contact[1] { 1.0 } else { 0.0 },
        ]
    }

    /// Translate an action into `(main_power, Some((direction, side_power)))`
    fn engine_command(&self, action: &Action) -> Result<(f32, Option<(f32, f32)>)> {
        match (self.config.continuous, action) {
            (false, Action::Discrete(a)) => match a {
                0 => Ok((0.0, None)),
                1 => Ok((0.0, Some((-1.0, 1.0)))),
                2 => Ok((1.0, None)),
                3 => Ok((0.0, Some((1.0, 1.0)))),
                other => Err(anyhow!("invalid LunarLander action {}, expected 0..4", other)),
            },
            (true, Action::Continuous(a)) => {
                if a.len() != 2 {
                    bail!("continuous LunarLander expects 2 action components, got {}", a.len());
                }
                let main = a[0].clamp(-1.0, 1.0);
                let lateral = a[1].clamp(-1.0, 1.0);
                let m_power = if main > 0.0 { (main + 1.0) * 0.5 } else { 0.0 };
                let side = if lateral.abs() > 0.5 {
                    Some((lateral.signum(), lateral.abs().clamp(0.5, 1.0)))
                } else {
                    None
                };
                Ok((m_power, side))
            }
            (continuous, other) => Err(anyhow!(
                "action {:?} does not match LunarLander action space (continuous = {})",
                other,
                continuous
            )),
        }
    }

    /// Apply an impulse `j` at offset `r` from the centre of mass
    fn apply_impulse(&mut self, j: (f32, f32), r: (f32, f32)) {
        self.vx += j.0 / self.mass;
        self.vy += j.1 / self.mass;
        self.angular_velocity += (r.0 * j.1 - r.1 * j.0) / self.inertia;
    }

    /// Rotate a body-frame point (already in world units) into a world offset
    fn to_world_offset(&self, p: (f32, f32)) -> (f32, f32) {
        let (s, c) = self.angle.sin_cos();
        (p.0 * c - p.1 * s, p.0 * s + p.1 * c)
    }

    pub(crate) fn leg_tip_offsets(&self) -> [(f32, f32); 2] {
        [
            self.to_world_offset((LEG_AWAY / SCALE, -LEG_DOWN / SCALE)),
            self.to_world_offset((-LEG_AWAY / SCALE, -LEG_DOWN / SCALE)),
        ]
    }

    pub(crate) fn hull_points(&self) -> Vec<(f32, f32)> {
        LANDER_POLY
            .iter()
            .map(|&(px, py)| {
                let (ox, oy) = self.to_world_offset((px / SCALE, py / SCALE));
                (self.x + ox, self.y + oy)
            })
            .collect()
    }

    fn fire_engines(&mut self, m_power: f32, side: Option<(f32, f32)>) {
        let tip = (self.angle.sin(), self.angle.cos());
        let side_dir = (-tip.1, tip.0);
        let dispersion: [f32; 2] =
            [self.rng.gen_range(-1.0..1.0) / SCALE, self.rng.gen_range(-1.0..1.0) / SCALE];

        if m_power > 0.0 {
            let reach = MAIN_ENGINE_Y_LOCATION / SCALE + 2.0 * dispersion[0];
            let ox = tip.0 * reach + side_dir.0 * dispersion[1];
            let oy = -tip.1 * reach - side_dir.1 * dispersion[1];
            self.apply_impulse(
                (-ox * MAIN_ENGINE_POWER * m_power, -oy * MAIN_ENGINE_POWER * m_power),
                (ox, oy),
            );
        }

        if let Some((direction, s_power)) = side {
            let lateral = 3.0 * dispersion[1] + direction * SIDE_ENGINE_AWAY / SCALE;
            let ox = tip.0 * dispersion[0] + side_dir.0 * lateral;
            let oy = -tip.1 * dispersion[0] - side_dir.1 * lateral;
            let r = (ox - tip.0 * 17.0 / SCALE, oy + tip.1 * SIDE_ENGINE_HEIGHT / SCALE);
            self.apply_impulse(
                (-ox * SIDE_ENGINE_POWER * s_power, -oy * SIDE_ENGINE_POWER * s_power),
                r,
            );
        }

        self.firing = Firing {
            main: m_power,
            side: side.map(|(direction, power)| direction * power).unwrap_or(0.0),
        };
    }

    /// Semi-implicit Euler step under gravity
    fn integrate(&mut self) {
        let dt = 1.0 / FPS;
        self.vy += GRAVITY * dt;
        self.x += self.vx * dt;
        self.y += self.vy * dt;
        self.angle += self.angular_velocity * dt;
    }

    /// Push leg tips out of the ground and cancel approaching velocity
    ///
    /// Hull contact with the ground, or a leg hitting it faster than
    /// `LEG_CRASH_SPEED`, ends the episode as a crash.
    fn resolve_contacts(&mut self) {
        let tips = self.leg_tip_offsets();
        let penetration: Vec<f32> = tips
            .iter()
            .map(|&(ox, oy)| self.terrain.height_at(self.x + ox) - (self.y + oy))
            .collect();

        let deepest = penetration.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        if deepest > 0.0 {
            for (&(ox, _), &pen) in tips.iter().zip(&penetration) {
                let impact = self.vy + self.angular_velocity * ox;
                if pen > 0.0 && impact < -LEG_CRASH_SPEED {
                    self.game_over = true;
                }
            }
            self.y += deepest;
        }

        let mut contact = [false; 2];
        for (i, &(ox, oy)) in tips.iter().enumerate() {
            let gap = (self.y + oy) - self.terrain.height_at(self.x + ox);
            contact[i] = gap < CONTACT_SLOP;
        }

        let mut normal = [0.0_f32; 2];
        let mut tangent = [0.0_f32; 2];
        for _ in 0..CONTACT_ITERATIONS {
            for (i, &(rx, ry)) in tips.iter().enumerate() {
                if !contact[i] {
                    continue;
                }

                let vcy = self.vy + self.angular_velocity * rx;
                let kn = 1.0 / self.mass + rx * rx / self.inertia;
                let accumulated = (normal[i] - vcy / kn).max(0.0);
                let dj = accumulated - normal[i];
                normal[i] = accumulated;
                self.vy += dj / self.mass;
                self.angular_velocity += rx * dj / self.inertia;

                let vcx = self.vx - self.angular_velocity * ry;
                let kt = 1.0 / self.mass + ry * ry / self.inertia;
                let limit = LEG_FRICTION * normal[i];
                let accumulated = (tangent[i] - vcx / kt).clamp(-limit, limit);
                let dj = accumulated - tangent[i];
                tangent[i] = accumulated;
                self.vx += dj / self.mass;
                self.angular_velocity -= ry * dj / self.inertia;
            }
        }
        self.legs_contact = contact;

        if self
            .hull_points()
            .iter()
            .any(|&(px, py)| py < self.terrain.height_at(px))
        {
            self.game_over = true;
        }
    }

    /// Advance the simulation one frame and score it
    fn advance(&mut self, m_power: f32, side: Option<(f32, f32)>) -> StepResult<Vec<f32>> {
        self.fire_engines(m_power, side);
        self.integrate();
        self.resolve_contacts();
        self.steps += 1;

        let at_rest = self.legs_contact[0]
            && self.legs_contact[1]
            && (self.vx * self.vx + self.vy * self.vy).sqrt() < LINEAR_SLEEP_TOLERANCE
            && self.angular_velocity.abs() < ANGULAR_SLEEP_TOLERANCE;
        self.rest_steps = if at_rest { self.rest_steps + 1 } else { 0 };

        let state = self.observation();
        let shaping = -100.0 * (state[0] * state[0] + state[1] * state[1]).sqrt()
            - 100.0 * (state[2] * state[2] + state[3] * state[3]).sqrt()
            - 100.0 * state[4].abs()
            + 10.0 * state[6]
            + 10.0 * state[7];

        let mut reward = match self.prev_shaping {
            Some(prev) => shaping - prev,
            None => 0.0,
        };
        self.prev_shaping = Some(shaping);

        let s_power = side.map(|(_, p)| p).unwrap_or(0.0);
        reward -= m_power * 0.30;
        reward -= s_power * 0.03;

        let mut terminated = false;
        if self.game_over || state[0].abs() >= 1.0 {
            terminated = true;
            reward = -100.0;
        }
        if self.rest_steps >= SLEEP_STEPS {
            terminated = true;
            reward = 100.0;
        }
        let truncated = self.steps >= self.config.max_steps;

        StepResult { observation: state, reward, terminated, truncated }
    }
}

impl Default for LunarLander {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment for LunarLander {
    type Observation = Vec<f32>;
    type Action = Action;

    fn reset(&mut self) -> Result<Self::Observation> {
        self.terrain = Terrain::generate(&mut self.rng);
        self.x = W / 2.0;
        self.y = H;
        self.angle = 0.0;
        self.angular_velocity = 0.0;
        self.legs_contact = [false; 2];
        self.prev_shaping = None;
        self.steps = 0;
        self.rest_steps = 0;
        self.game_over = false;

        // Random push applied over the first frame
        let force_x = self.rng.gen_range(-INITIAL_RANDOM..INITIAL_RANDOM);
        let force_y = self.rng.gen_range(-INITIAL_RANDOM..INITIAL_RANDOM);
        self.vx = force_x / self.mass / FPS;
        self.vy = force_y / self.mass / FPS;

        // Gym returns the observation after one noop frame
        let first = self.advance(0.0, None);
        self.steps = 0;
        Ok(first.observation)
    }

    fn step(&mut self, action: Self::Action) -> Result<StepResult<Self::Observation>> {
        let (m_power, side) = self.engine_command(&action)?;
        Ok(self.advance(m_power, side))
    }

    fn observation_space(&self) -> SpaceInfo {
        SpaceInfo { shape: vec![8], dtype: SpaceType::Continuous { low: f32::MIN, high: f32::MAX } }
    }

    fn action_space(&self) -> SpaceInfo {
        if self.config.continuous {
            SpaceInfo { shape: vec![2], dtype: SpaceType::Continuous { low: -1.0, high: 1.0 } }
        } else {
            SpaceInfo { shape: vec![], dtype: SpaceType::Discrete(4) }
        }
    }
}

/// Mass and moment of inertia about the origin of a uniform polygon given in
/// pixel units
fn polygon_mass_inertia(poly: &[(f32, f32)], density: f32) -> (f32, f32) {
    let mut area2 = 0.0;
    let mut inertia = 0.0;
    for i in 0..poly.len() {
        let (x1, y1) = (poly[i].0 / SCALE, poly[i].1 / SCALE);
        let (x2, y2) = (poly[(i + 1) % poly.len()].0 / SCALE, poly[(i + 1) % poly.len()].1 / SCALE);
        let cross = x1 * y2 - x2 * y1;
        area2 += cross;
        inertia += cross * (x1 * x1 + x1 * x2 + x2 * x2 + y1 * y1 + y1 * y2 + y2 * y2);
    }
    let mass = density * (area2 / 2.0).abs();
    (mass, (density * inertia / 12.0).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lander(seed: u64) -> LunarLander {
        LunarLander::with_config(LanderConfig { seed, ..Default::default() })
    }

    /// Place the lander motionless just above the helipad centre
    fn hover_over_pad(env: &mut LunarLander) {
        env.x = W / 2.0;
        env.y = env.terrain.height_at(env.x) + LEG_DOWN / SCALE + 0.01;
        env.vx = 0.0;
        env.vy = 0.0;
        env.angle = 0.0;
        env.angular_velocity = 0.0;
    }

    #[test]
    fn test_lander_mass() {
        let env = LunarLander::new();
        // 867 px^2 hull area at density 5
        assert!((env.mass - 5.0 * 867.0 / 900.0).abs() < 1e-3, "mass = {}", env.mass);
        assert!(env.inertia > 0.0);
    }

    #[test]
    fn test_reset_observation() {
        let mut env = lander(3);
        let obs = env.reset().unwrap();

        assert_eq!(obs.len(), 8, "Observation should have 8 elements");
        assert_eq!(env.steps, 0, "Steps should be reset to 0");
        assert!(obs[1] > 1.0, "Lander should start high above the pad, got y = {}", obs[1]);
        assert_eq!(obs[6], 0.0);
        assert_eq!(obs[7], 0.0);
    }

    #[test]
    fn test_terrain_helipad_is_flat() {
        let env = lander(11);
        let t = &env.terrain;
        assert_eq!(t.helipad_x1, 8.0);
        assert_eq!(t.helipad_x2, 12.0);

        // Smoothing keeps the pad flat, slightly below the nominal flag height
        let pad = t.height_at(10.0);
        assert!((pad - t.helipad_y).abs() < 0.05);
        for x in [8.0, 9.5, 11.0, 12.0] {
            assert!((t.height_at(x) - pad).abs() < 1e-5, "pad height at {}", x);
        }
    }

    #[test]
    fn test_seeded_episodes_are_reproducible() {
        let mut a = lander(42);
        let mut b = lander(42);
        assert_eq!(a.reset().unwrap(), b.reset().unwrap());

        for step in 0..50 {
            let action = Action::Discrete((step % 4) as i64);
            let ra = a.step(action.clone()).unwrap();
            let rb = b.step(action).unwrap();
            assert_eq!(ra.observation, rb.observation);
            assert_eq!(ra.reward, rb.reward);
        }
    }

    #[test]
    fn test_main_engine_slows_descent() {
        let mut idle = lander(5);
        let mut burn = lander(5);
        idle.reset().unwrap();
        burn.reset().unwrap();

        let mut idle_obs = Vec::new();
        let mut burn_obs = Vec::new();
        for _ in 0..5 {
            idle_obs = idle.step(Action::Discrete(0)).unwrap().observation;
            burn_obs = burn.step(Action::Discrete(2)).unwrap().observation;
        }
        assert!(burn_obs[3] > idle_obs[3], "vy with engine {} vs idle {}", burn_obs[3], idle_obs[3]);
    }

    #[test]
    fn test_side_engines_spin_opposite_ways() {
        let mut left = lander(9);
        let mut right = lander(9);
        left.reset().unwrap();
        right.reset().unwrap();

        let l = left.step(Action::Discrete(1)).unwrap().observation;
        let r = right.step(Action::Discrete(3)).unwrap().observation;
        assert!(l[5] > 0.0, "left engine should spin counter-clockwise, got {}", l[5]);
        assert!(r[5] < 0.0, "right engine should spin clockwise, got {}", r[5]);
    }

    #[test]
    fn test_fuel_cost() {
        let mut env = lander(1);
        env.reset().unwrap();
        let idle = env.step(Action::Discrete(0)).unwrap();
        assert!(!idle.terminated);

        // Freeze the lander so shaping does not change, leaving only fuel cost
        let mut env = lander(1);
        env.reset().unwrap();
        hover_over_pad(&mut env);
        env.y += 3.0;
        env.prev_shaping = None;
        let first = env.step(Action::Discrete(2)).unwrap();
        assert!((first.reward + 0.3).abs() < 1e-5, "first step reward {}", first.reward);
    }

    #[test]
    fn test_invalid_actions() {
        let mut env = LunarLander::new();
        env.reset().unwrap();
        assert!(env.step(Action::Discrete(4)).is_err());
        assert!(env.step(Action::Continuous(vec![0.0, 0.0])).is_err());

        let mut env = LunarLander::with_config(LanderConfig { continuous: true, ..Default::default() });
        env.reset().unwrap();
        assert!(env.step(Action::Discrete(0)).is_err());
        assert!(env.step(Action::Continuous(vec![1.0])).is_err());
        assert!(env.step(Action::Continuous(vec![1.0, -1.0])).is_ok());
    }

    #[test]
    fn test_out_of_bounds_terminates() {
        let mut env = lander(2);
        env.reset().unwrap();
        env.x = W + 1.0;

        let result = env.step(Action::Discrete(0)).unwrap();
        assert!(result.terminated, "Leaving the screen should terminate");
        assert_eq!(result.reward, -100.0);
    }

    #[test]
    fn test_crash_terminates() {
        let mut env = lander(2);
        env.reset().unwrap();
        hover_over_pad(&mut env);
        env.vy = -8.0;

        let result = env.step(Action::Discrete(0)).unwrap();
        assert!(result.terminated, "Hard impact should be a crash");
        assert_eq!(result.reward, -100.0);
    }

    #[test]
    fn test_soft_landing_comes_to_rest() {
        let mut env = lander(4);
        env.reset().unwrap();
        hover_over_pad(&mut env);

        let mut last = None;
        for _ in 0..200 {
            let result = env.step(Action::Discrete(0)).unwrap();
            let done = result.terminated;
            last = Some(result);
            if done {
                break;
            }
        }

        let last = last.unwrap();
        assert!(last.terminated, "Lander should come to rest on the pad");
        assert_eq!(last.reward, 100.0);
        assert_eq!(last.observation[6], 1.0);
        assert_eq!(last.observation[7], 1.0);
    }

    #[test]
    fn test_truncation() {
        let mut env = lander(6);
        env.reset().unwrap();
        env.steps = env.config.max_steps - 1;

        let result = env.step(Action::Discrete(0)).unwrap();
        assert!(result.truncated, "Episode should truncate at max steps");
    }

    #[test]
    fn test_free_fall_episode_ends() {
        let mut env = lander(8);
        env.reset().unwrap();

        let mut steps = 0;
        for _ in 0..2000 {
            let result = env.step(Action::Discrete(0)).unwrap();
            steps += 1;
            if result.is_done() {
                break;
            }
        }
        assert!(steps < 1000, "Idle lander should hit the ground before truncation");
    }

    #[test]
    fn test_action_spaces() {
        let env = LunarLander::new();
        assert_eq!(env.action_space().dtype, SpaceType::Discrete(4));
        assert_eq!(env.observation_space().shape, vec![8]);

        let env = LunarLander::with_config(LanderConfig { continuous: true, ..Default::default() });
        let space = env.action_space();
        assert_eq!(space.shape, vec![2]);
        assert!(matches!(space.dtype, SpaceType::Continuous { .. }));
    }
}
