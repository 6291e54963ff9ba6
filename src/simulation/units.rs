//! Conversion between physical (CGS) units and the internal normalized system
//!
//! Internally everything is stored in solar masses, astronomical units and
//! years, which keeps stored magnitudes near unity and the derived
//! gravitational constant at about 4π². Conversion happens only at property
//! boundaries; the integration code never sees physical units.

/// Grams per normalized mass unit (one solar mass).
pub const MASS_UNIT: f64 = 1.989e33;
/// Centimeters per normalized distance unit (one astronomical unit).
pub const DIST_UNIT: f64 = 1.495978707e13;
/// Seconds per normalized time unit (one year).
pub const TIME_UNIT: f64 = 3.1556926e7;
/// Gravitational constant in CGS units (cm³ g⁻¹ s⁻²).
pub const G_CGS: f64 = 6.674e-8;

/// Process-wide unit system, immutable after startup.
#[derive(Debug, Clone, Copy)]
pub struct UnitSystem {
    pub mass_unit: f64, // grams per normalized mass unit
    pub dist_unit: f64, // cm per normalized distance unit
    pub time_unit: f64, // seconds per normalized time unit
    pub g: f64,         // gravitational constant, normalized
}

impl UnitSystem {
    /// Build the solar-mass/AU/year system used by the simulator.
    pub const fn cgs_solar() -> Self {
        Self {
            mass_unit: MASS_UNIT,
            dist_unit: DIST_UNIT,
            time_unit: TIME_UNIT,
            g: G_CGS * MASS_UNIT * TIME_UNIT * TIME_UNIT / (DIST_UNIT * DIST_UNIT * DIST_UNIT),
        }
    }

    /// Mass in grams to normalized mass.
    pub fn mass_to_internal(&self, grams: f64) -> f64 {
        grams / self.mass_unit
    }

    /// Distance in cm to normalized distance.
    pub fn dist_to_internal(&self, cm: f64) -> f64 {
        cm / self.dist_unit
    }

    /// Normalized distance back to cm.
    pub fn dist_to_physical(&self, dist: f64) -> f64 {
        dist * self.dist_unit
    }
}

/// The unit system every stored quantity is expressed in.
pub const UNITS: UnitSystem = UnitSystem::cgs_solar();
