//! One gravitating body: mass, kinematic state, trail, leapfrog step
//!
//! `MassObject` is a shared handle (`Rc<RefCell<..>>`): clones refer to the
//! same body and identity is pointer identity, which is what `RemoveObject`
//! and script-side `==` compare. All stored quantities are normalized
//! (solar masses, AU, years); the setters are the conversion boundary and
//! accept physical CGS values.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use nalgebra::Vector3;

use crate::simulation::units::UNITS;

pub type Vec3 = Vector3<f64>;

/// RGBA color carried for the renderer. No physics semantics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Look up a color by its common English name, case-insensitively.
    /// `None` for names outside the table.
    pub fn from_name(name: &str) -> Option<Self> {
        NAMED_COLORS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, c)| *c)
    }
}

/// Named colors available to scripts, with their usual sRGB values.
const NAMED_COLORS: &[(&str, Color)] = &[
    ("White", Color::rgb(1.0, 1.0, 1.0)),
    ("Black", Color::rgb(0.0, 0.0, 0.0)),
    ("Red", Color::rgb(1.0, 0.0, 0.0)),
    ("Green", Color::rgb(0.0, 0.502, 0.0)),
    ("Lime", Color::rgb(0.0, 1.0, 0.0)),
    ("Blue", Color::rgb(0.0, 0.0, 1.0)),
    ("Yellow", Color::rgb(1.0, 1.0, 0.0)),
    ("LightYellow", Color::rgb(1.0, 1.0, 0.878)),
    ("Orange", Color::rgb(1.0, 0.647, 0.0)),
    ("OrangeRed", Color::rgb(1.0, 0.271, 0.0)),
    ("Gray", Color::rgb(0.502, 0.502, 0.502)),
    ("LightGray", Color::rgb(0.827, 0.827, 0.827)),
    ("SkyBlue", Color::rgb(0.529, 0.808, 0.922)),
    ("Brown", Color::rgb(0.647, 0.165, 0.165)),
];

/// Number of past positions kept in the trail.
pub const TRAIL_LENGTH: usize = 150;

/// Pairs closer than this (normalized distance) contribute no force.
/// Coincident bodies therefore produce zero acceleration instead of NaN;
/// everything farther apart is computed unconditionally in f64.
pub const MIN_SEPARATION: f64 = 1e-9;

#[derive(Debug)]
struct ObjectState {
    name: Option<String>,
    mass: f64, // normalized, immutable after construction
    size: f32,
    color: Color,
    emission: f32,
    location: Vec3,
    velocity: Vec3,
    acceleration: Vec3,
    trail: VecDeque<Vec3>, // most-recent-first
}

/// Shared handle to one gravitating body.
#[derive(Debug, Clone)]
pub struct MassObject {
    state: Rc<RefCell<ObjectState>>,
}

impl MassObject {
    /// Create a body from a mass in grams, a display size and an optional name.
    pub fn new(mass_grams: f64, size: f32, name: Option<&str>) -> Self {
        Self {
            state: Rc::new(RefCell::new(ObjectState {
                name: name.map(str::to_string),
                mass: UNITS.mass_to_internal(mass_grams),
                size,
                color: Color::WHITE,
                emission: 0.0,
                location: Vec3::zeros(),
                velocity: Vec3::zeros(),
                acceleration: Vec3::zeros(),
                trail: VecDeque::with_capacity(TRAIL_LENGTH),
            })),
        }
    }

    /// Whether two handles refer to the same body.
    pub fn same_object(&self, other: &MassObject) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    pub fn name(&self) -> Option<String> {
        self.state.borrow().name.clone()
    }

    /// Mass in normalized units (solar masses).
    pub fn mass(&self) -> f64 {
        self.state.borrow().mass
    }

    pub fn size(&self) -> f32 {
        self.state.borrow().size
    }

    pub fn color(&self) -> Color {
        self.state.borrow().color
    }

    pub fn set_color(&self, color: Color) {
        self.state.borrow_mut().color = color;
    }

    pub fn emission(&self) -> f32 {
        self.state.borrow().emission
    }

    pub fn set_emission(&self, emission: f32) {
        self.state.borrow_mut().emission = emission;
    }

    /// Position in normalized units (AU).
    pub fn location(&self) -> Vec3 {
        self.state.borrow().location
    }

    /// Set the position from a physical vector (cm).
    pub fn set_location(&self, physical: Vec3) {
        self.state.borrow_mut().location = physical / UNITS.dist_unit;
    }

    /// Velocity in normalized units (AU per year).
    pub fn velocity(&self) -> Vec3 {
        self.state.borrow().velocity
    }

    /// Set the velocity from a physical vector (cm per year).
    pub fn set_velocity(&self, physical: Vec3) {
        self.state.borrow_mut().velocity = physical / UNITS.dist_unit;
    }

    /// Acceleration in normalized units (AU per year²).
    pub fn acceleration(&self) -> Vec3 {
        self.state.borrow().acceleration
    }

    /// Set the acceleration from a physical vector (cm per year²).
    pub fn set_acceleration(&self, physical: Vec3) {
        self.state.borrow_mut().acceleration = physical / UNITS.dist_unit;
    }

    /// Past positions, most recent first.
    pub fn trail(&self) -> Vec<Vec3> {
        self.state.borrow().trail.iter().copied().collect()
    }

    /// Advance this body by one leapfrog step of `dt` (years) against the
    /// gravitational pull of `objects`, excluding itself:
    ///
    /// 1. half-step position drift,
    /// 2. recompute acceleration from pairwise attraction,
    /// 3. full-step velocity kick,
    /// 4. second half-step drift,
    /// 5. push the resulting position onto the trail.
    pub fn calculate_step(&self, dt: f64, objects: &[MassObject]) {
        let mut s = self.state.borrow_mut();
        let half_dt = 0.5 * dt;

        // Drift: x += (dt/2) v
        let v = s.velocity;
        s.location += v * half_dt;

        // a = Σ -G m_j (x_i - x_j) / |x_i - x_j|³ over all other bodies
        let mut accel = Vec3::zeros();
        for other in objects {
            if Rc::ptr_eq(&self.state, &other.state) {
                continue;
            }

            let o = other.state.borrow();
            let diff = s.location - o.location;
            let dist = diff.norm();
            if dist < MIN_SEPARATION {
                continue;
            }

            accel -= diff * (UNITS.g * o.mass / (dist * dist * dist));
        }
        s.acceleration = accel;

        // Kick: v += dt a
        s.velocity += accel * dt;

        // Second drift: x += (dt/2) v
        let v = s.velocity;
        s.location += v * half_dt;

        // Trail keeps the last TRAIL_LENGTH positions, newest first
        let loc = s.location;
        s.trail.push_front(loc);
        s.trail.truncate(TRAIL_LENGTH);
    }

    /// Read-only snapshot for the external renderer.
    pub fn render_state(&self) -> RenderState {
        let s = self.state.borrow();
        RenderState {
            name: s.name.clone(),
            mass: s.mass,
            size: s.size,
            color: s.color,
            emission: s.emission,
            location: s.location,
            trail: s.trail.iter().copied().collect(),
        }
    }
}

impl fmt::Display for MassObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.state.borrow();
        let name = s.name.as_deref().unwrap_or("<unnamed>");
        write!(
            f,
            "{name}: Mass {}, Location ({:.4}, {:.4}, {:.4}), Velocity ({:.4}, {:.4}, {:.4})",
            s.mass, s.location.x, s.location.y, s.location.z, s.velocity.x, s.velocity.y, s.velocity.z
        )
    }
}

/// Per-object state the external renderer reads each frame.
#[derive(Debug, Clone)]
pub struct RenderState {
    pub name: Option<String>,
    pub mass: f64,
    pub size: f32,
    pub color: Color,
    pub emission: f32,
    pub location: Vec3,
    pub trail: Vec<Vec3>,
}
