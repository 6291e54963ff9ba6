use starsim::simulation::units::{DIST_UNIT, MASS_UNIT};
use starsim::{
    ConfigError, ConstantsTable, MassObject, PresetKind, PresetTable, ScriptEngine, ScriptError,
    ScriptValue, Settings, SimContext, Simulation, SimulationManager, Vec3, HostFn, TRAIL_LENGTH,
    UNITS,
};

use std::cell::RefCell;
use std::rc::Rc;

const DT: f64 = 1e-4; // years per tick in tests

/// Context with a small fixed step and not paused
fn test_context() -> SimContext {
    SimContext::new(Settings {
        paused: false,
        time_step: DT,
    })
}

/// Small constants set matching the shipped resource files
fn test_constants() -> ConstantsTable {
    ConstantsTable::from_tables(
        PresetTable::from_pairs(
            PresetKind::Mass,
            [("Sun", 1.989e33), ("Earth", 5.97219e27)],
        ),
        PresetTable::from_pairs(PresetKind::Distance, [("AU", 1.495978707e13)]),
        PresetTable::from_pairs(PresetKind::Time, [("Year", 1.0)]),
    )
}

/// Simulation over the given script source
fn test_sim(context: &SimContext, source: &str) -> Simulation {
    Simulation::from_source(context.clone(), &test_constants(), "test", source)
        .expect("simulation should load")
}

/// Central 1-solar-mass body at the origin plus an orbiter of negligible mass
/// at 1 AU with the given tangential speed (normalized AU/year)
fn two_body_sim(context: &SimContext, orbit_speed: f64) -> (Simulation, MassObject, MassObject) {
    let sim = test_sim(context, "");

    let central = sim.add_object(MASS_UNIT, 0.07, Some("Sun"));
    let orbiter = sim.add_object(1.0, 0.01, Some("Probe"));
    orbiter.set_location(Vec3::new(DIST_UNIT, 0.0, 0.0));
    orbiter.set_velocity(Vec3::new(0.0, orbit_speed * DIST_UNIT, 0.0));

    (sim, central, orbiter)
}

/// Specific mechanical energy of the orbiter around a central mass (normalized)
fn orbit_energy(central: &MassObject, orbiter: &MassObject) -> f64 {
    let r = (orbiter.location() - central.location()).norm();
    let v2 = orbiter.velocity().norm_squared();
    0.5 * v2 - UNITS.g * central.mass() / r
}

// ==================================================================================
// Units and constants
// ==================================================================================

#[test]
fn gravitational_constant_near_four_pi_squared() {
    let four_pi_sq = 4.0 * std::f64::consts::PI * std::f64::consts::PI;
    assert!(
        (UNITS.g - four_pi_sq).abs() < 0.05,
        "G = {} not near 4pi^2",
        UNITS.g
    );
}

#[test]
fn position_round_trips_through_normalization() {
    let obj = MassObject::new(MASS_UNIT, 0.1, Some("X"));
    let physical = Vec3::new(3.7e13, -1.2e12, 5.5e11);
    obj.set_location(physical);

    let recovered = obj.location() * UNITS.dist_unit;
    for i in 0..3 {
        let rel = (recovered[i] - physical[i]).abs() / physical[i].abs();
        assert!(rel < 1e-12, "component {i} off by {rel}");
    }
}

#[test]
fn preset_parser_skips_comments_and_blanks() {
    let table = PresetTable::parse(
        PresetKind::Mass,
        "# masses in g\n\nSun = 1.989e33\n  Earth = 5.97219e27  \n",
    )
    .unwrap();

    assert_eq!(table.get("Sun").unwrap(), 1.989e33);
    assert_eq!(table.get("Earth").unwrap(), 5.97219e27);
}

#[test]
fn preset_parser_rejects_malformed_lines() {
    let result = PresetTable::parse(PresetKind::Time, "Year 1.0\n");
    assert!(matches!(result, Err(ConfigError::MalformedEntry { .. })));

    let result = PresetTable::parse(PresetKind::Time, "Year = not_a_number\n");
    assert!(matches!(result, Err(ConfigError::MalformedEntry { .. })));
}

#[test]
fn preset_get_fails_on_unknown_key() {
    let table = PresetTable::from_pairs(PresetKind::Distance, [("AU", 1.0)]);
    assert!(matches!(
        table.get("Parsec"),
        Err(ConfigError::UnknownPreset { .. })
    ));
}

// ==================================================================================
// Integration
// ==================================================================================

#[test]
fn circular_orbit_period_matches_kepler() {
    let context = test_context();
    // Exact circular speed for r = 1: v = sqrt(G M / r)
    let speed = UNITS.g.sqrt();
    let (mut sim, _, orbiter) = two_body_sim(&context, speed);

    let start = orbiter.location();
    let period = 2.0 * std::f64::consts::PI / speed;
    let steps = (period / DT).round() as u64;

    for _ in 0..steps {
        sim.tick();
    }

    let distance = (orbiter.location() - start).norm();
    assert!(
        distance < 5e-3,
        "orbiter {distance} AU from start after one Keplerian period"
    );
}

#[test]
fn one_au_orbit_stays_at_one_au_after_one_year() {
    let context = test_context();
    // Earth-like case: v = 2 pi AU/year at 1 AU
    let (mut sim, _, orbiter) = two_body_sim(&context, 2.0 * std::f64::consts::PI);

    let steps = (1.0 / DT).round() as u64;
    for _ in 0..steps {
        sim.tick();
    }

    assert!((sim.current_time() - 1.0).abs() < 1e-9);
    let radius = orbiter.location().norm();
    assert!(
        (radius - 1.0).abs() < 1e-3,
        "radius {radius} AU after one year"
    );
}

#[test]
fn leapfrog_bounds_energy_drift() {
    let context = test_context();
    let speed = UNITS.g.sqrt();
    let (mut sim, central, orbiter) = two_body_sim(&context, speed);

    let e0 = orbit_energy(&central, &orbiter);
    let mut max_drift: f64 = 0.0;

    for _ in 0..10_000 {
        sim.tick();
        let drift = ((orbit_energy(&central, &orbiter) - e0) / e0).abs();
        max_drift = max_drift.max(drift);
    }

    assert!(
        max_drift < 1e-5,
        "relative energy drift {max_drift} over 10k steps"
    );
}

#[test]
fn coincident_bodies_stay_finite() {
    let context = test_context();
    let mut sim = test_sim(&context, "");
    let a = sim.add_object(MASS_UNIT, 0.1, Some("A"));
    let b = sim.add_object(MASS_UNIT, 0.1, Some("B"));

    sim.tick();

    for obj in [&a, &b] {
        let loc = obj.location();
        let acc = obj.acceleration();
        assert!(loc.iter().all(|c| c.is_finite()), "location not finite");
        assert!(acc.iter().all(|c| c.is_finite()), "acceleration not finite");
        // Closer than the separation floor: no force contribution at all
        assert_eq!(acc.norm(), 0.0);
    }
}

#[test]
fn trail_is_bounded_and_most_recent_first() {
    let obj = MassObject::new(MASS_UNIT, 0.1, Some("T"));
    obj.set_velocity(Vec3::new(DIST_UNIT, 0.0, 0.0)); // 1 AU/year
    let objects = vec![obj.clone()];

    for _ in 0..10 {
        obj.calculate_step(DT, &objects);
    }
    let trail = obj.trail();
    assert_eq!(trail.len(), 10);
    assert_eq!(trail[0], obj.location());
    assert!(trail[0].x > trail[9].x, "trail not most-recent-first");

    for _ in 0..(TRAIL_LENGTH + 50) {
        obj.calculate_step(DT, &objects);
    }
    assert_eq!(obj.trail().len(), TRAIL_LENGTH);
}

// ==================================================================================
// Simulation collection and lifecycle
// ==================================================================================

#[test]
fn add_then_find_returns_identical_handle() {
    let context = test_context();
    let sim = test_sim(&context, "");

    let added = sim.add_object(MASS_UNIT, 0.1, Some("Sun"));
    let found = sim.find_object("Sun").expect("should find added object");

    assert!(added.same_object(&found));
    assert!(sim.find_object("Nothing").is_none());
}

#[test]
fn remove_takes_exactly_one_and_absent_is_noop() {
    let context = test_context();
    let sim = test_sim(&context, "");

    let a = sim.add_object(MASS_UNIT, 0.1, Some("A"));
    let _b = sim.add_object(MASS_UNIT, 0.1, Some("B"));
    assert_eq!(sim.objects().len(), 2);

    sim.remove_object(&a);
    assert_eq!(sim.objects().len(), 1);

    // Same handle again, and a handle that was never added
    sim.remove_object(&a);
    let stranger = MassObject::new(MASS_UNIT, 0.1, Some("C"));
    sim.remove_object(&stranger);
    assert_eq!(sim.objects().len(), 1);
}

#[test]
fn paused_tick_changes_nothing() {
    let context = test_context();
    let (mut sim, _, orbiter) = two_body_sim(&context, 2.0 * std::f64::consts::PI);
    let before = orbiter.location();

    context.set_paused(true);
    sim.tick();

    assert_eq!(sim.current_time(), 0.0);
    assert_eq!(orbiter.location(), before);
    assert!(orbiter.trail().is_empty());
}

#[test]
fn dispose_is_idempotent_and_silences_tick_and_render() {
    let context = test_context();
    let (mut sim, _, orbiter) = two_body_sim(&context, 2.0 * std::f64::consts::PI);

    sim.dispose();
    sim.dispose();
    assert!(sim.is_disposed());

    let before = orbiter.location();
    sim.tick();
    assert_eq!(sim.current_time(), 0.0);
    assert_eq!(orbiter.location(), before);
    assert!(sim.render().is_empty());
}

#[test]
fn render_exposes_object_state() {
    let context = test_context();
    let sim = test_sim(&context, "");
    let obj = sim.add_object(MASS_UNIT, 0.25, Some("Sun"));
    obj.set_location(Vec3::new(DIST_UNIT, 0.0, 0.0));

    let states = sim.render();
    assert_eq!(states.len(), 1);
    assert_eq!(states[0].name.as_deref(), Some("Sun"));
    assert_eq!(states[0].size, 0.25);
    assert!((states[0].location.x - 1.0).abs() < 1e-12);
}

// ==================================================================================
// Scripting
// ==================================================================================

#[test]
fn script_init_builds_system_once() {
    let context = test_context();
    let mut sim = test_sim(
        &context,
        r#"
        function init()
            AddObject(Mass_Sun, 0.1, "Sun")
        end
        "#,
    );

    assert_eq!(sim.objects().len(), 1);
    sim.tick();
    sim.tick();
    assert_eq!(sim.objects().len(), 1, "init must run exactly once");

    // Mass arrived in grams via the published constant and was normalized
    let sun = sim.find_object("Sun").unwrap();
    assert!((sun.mass() - 1.0).abs() < 1e-12);
}

#[test]
fn script_tick_mutation_is_integrated_same_tick() {
    let context = test_context();
    let mut sim = test_sim(
        &context,
        r#"
        function tick()
            if #Objects == 0 then
                AddObject(Mass_Sun, 0.1, "Star", nil,
                    Vector(Distance_AU, 0, 0),
                    Vector(0, 2 * math.pi * Distance_AU, 0))
            end
        end
        "#,
    );

    assert_eq!(sim.objects().len(), 0);
    sim.tick();

    let star = sim.find_object("Star").expect("script should add the star");
    // The physics pass saw the new object in the same tick: it moved
    assert!(star.location().y > 1e-5, "object was not integrated");
    assert_eq!(star.trail().len(), 1);
}

#[test]
fn script_can_mutate_object_fields() {
    let context = test_context();
    let mut sim = test_sim(
        &context,
        r#"
        function init()
            AddObject(Mass_Sun, 0.1, "Sun", ColorFromRGB(1, 1, 0))
        end

        function tick()
            local sun = FindObject("Sun")
            sun.Location = Vector(Distance_AU, 0, 0)
            sun.EmissionStrength = 0.5
        end
        "#,
    );

    sim.tick();

    let sun = sim.find_object("Sun").unwrap();
    // Lone body: no force, so the scripted position survives the physics pass
    assert!((sun.location().x - 1.0).abs() < 1e-12);
    assert_eq!(sun.emission(), 0.5);
    assert_eq!(sun.color().r, 1.0);
    assert_eq!(sun.color().b, 0.0);
}

#[test]
fn script_builds_colors_by_name() {
    let context = test_context();
    let sim = test_sim(
        &context,
        r#"
        function init()
            AddObject(Mass_Sun, 0.1, "Sun", ColorFromName("yellow"))
        end
        "#,
    );

    let sun = sim.find_object("Sun").unwrap();
    assert_eq!(sun.color().r, 1.0);
    assert_eq!(sun.color().g, 1.0);
    assert_eq!(sun.color().b, 0.0);
    assert_eq!(sun.color().a, 1.0);

    // Name lookup is case-insensitive; unknown names are a hard error, so a
    // bad name in init aborts construction
    let result = Simulation::from_source(
        context,
        &test_constants(),
        "test",
        r#"
        function init()
            ColorFromName("NotAColor")
        end
        "#,
    );
    assert!(matches!(result, Err(ConfigError::Script(_))));
}

#[test]
fn script_drives_camera_and_follow_state() {
    let context = test_context();
    let sim = test_sim(
        &context,
        r#"
        function init()
            local sun = AddObject(Mass_Sun, 0.1, "Sun", ColorFromRGBA(0.1, 0.2, 0.3, 0.4))
            FollowObject(sun)
            ClearFollowObject()
            CameraSetTranslation(1, 2, 3)
            CameraTranslate(1, 0, 0)
            ErrorMessage("camera ready")
        end
        "#,
    );

    assert!(sim.followed().is_none(), "follow was cleared in init");

    let translation = context.camera().borrow().translation;
    assert_eq!(translation, Vec3::new(2.0, 2.0, 3.0));

    let sun = sim.find_object("Sun").unwrap();
    assert!((sun.color().a - 0.4).abs() < 1e-6);
}

#[test]
fn script_remove_object_shrinks_collection() {
    let context = test_context();
    let mut sim = test_sim(
        &context,
        r#"
        function init()
            AddObject(Mass_Sun, 0.1, "Sun")
            AddObject(Mass_Earth, 0.05, "Earth")
        end

        function tick()
            local earth = FindObject("Earth")
            if earth then
                RemoveObject(earth)
            end
        end
        "#,
    );

    assert_eq!(sim.objects().len(), 2);
    sim.tick();
    assert_eq!(sim.objects().len(), 1);
    sim.tick();
    assert_eq!(sim.objects().len(), 1);
}

#[test]
fn script_reads_current_time_global() {
    let context = test_context();
    let mut sim = test_sim(
        &context,
        r#"
        function tick()
            -- CurrentTime is pushed before tick runs: first call sees 0
            if CurrentTime > 0 and FindObject("Marker") == nil then
                AddObject(Mass_Sun, 0.1, "Marker")
            end
        end
        "#,
    );

    sim.tick();
    assert!(sim.find_object("Marker").is_none(), "first tick sees t = 0");
    sim.tick();
    assert!(sim.find_object("Marker").is_some());
}

#[test]
fn missing_tick_function_fails_load() {
    let context = test_context();
    let result = Simulation::from_source(
        context,
        &test_constants(),
        "test",
        "tick = nil",
    );

    assert!(matches!(
        result,
        Err(ConfigError::MissingEntryPoint { .. })
    ));
}

#[test]
fn script_runtime_error_is_contained() {
    let context = test_context();
    let mut sim = test_sim(
        &context,
        r#"
        function tick()
            error("boom")
        end
        "#,
    );

    sim.tick();
    sim.tick();

    // The failing callback never aborts the tick loop
    assert!((sim.current_time() - 2.0 * DT).abs() < 1e-12);
}

#[test]
fn follow_object_reports_position_to_camera() {
    let context = test_context();
    let mut manager = SimulationManager::new(context.clone(), Rc::new(test_constants()));
    manager
        .load_source(
            "test",
            r#"
            function init()
                local sun = AddObject(Mass_Sun, 0.1, "Sun", nil,
                    Vector(2 * Distance_AU, 0, 0))
                FollowObject(sun)
            end
            "#,
        )
        .unwrap();

    manager.update();

    let translation = context.camera().borrow().translation;
    assert!((translation.x - 2.0).abs() < 1e-9);
}

// ==================================================================================
// Bridge boot sequence (mock engine)
// ==================================================================================

struct MockEngine {
    log: Rc<RefCell<Vec<String>>>,
}

impl ScriptEngine for MockEngine {
    fn evaluate(&self, name: &str, _source: &str) -> Result<(), ScriptError> {
        self.log.borrow_mut().push(format!("evaluate:{name}"));
        Ok(())
    }

    fn register_function(&self, name: &str, _func: HostFn) -> Result<(), ScriptError> {
        self.log.borrow_mut().push(format!("register:{name}"));
        Ok(())
    }

    fn set_global(&self, name: &str, _value: ScriptValue) -> Result<(), ScriptError> {
        self.log.borrow_mut().push(format!("global:{name}"));
        Ok(())
    }

    fn get_global(&self, _name: &str) -> Result<ScriptValue, ScriptError> {
        Ok(ScriptValue::Nil)
    }

    fn resolve_entry_point(&self, name: &str) -> Result<(), ScriptError> {
        self.log.borrow_mut().push(format!("resolve:{name}"));
        Ok(())
    }

    fn call_entry_point(&self, name: &str) -> Result<(), ScriptError> {
        self.log.borrow_mut().push(format!("call:{name}"));
        Ok(())
    }
}

#[test]
fn bridge_boots_in_fixed_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let context = test_context();
    let mut sim = Simulation::with_engine(
        context,
        &test_constants(),
        "user",
        "",
        Box::new(MockEngine {
            log: Rc::clone(&log),
        }),
    )
    .unwrap();

    {
        let log = log.borrow();
        let pos = |entry: &str| {
            log.iter()
                .position(|e| e == entry)
                .unwrap_or_else(|| panic!("missing '{entry}' in {log:?}"))
        };

        assert_eq!(log[0], "evaluate:bootstrap");
        // Registration and constants publishing come before the user chunk
        assert!(pos("register:AddObject") < pos("evaluate:user"));
        assert!(pos("register:Vector") < pos("evaluate:user"));
        assert!(pos("global:Mass_Sun") < pos("evaluate:user"));
        // Entry points are resolved after the user chunk, init runs last, once
        assert!(pos("evaluate:user") < pos("resolve:tick"));
        assert_eq!(log.last().map(String::as_str), Some("call:init"));
        assert_eq!(log.iter().filter(|e| *e == "call:init").count(), 1);
    }

    sim.tick();
    let log = log.borrow();
    let n = log.len();
    // Per-tick push is a whole-value overwrite, strictly before the tick call
    assert_eq!(
        &log[n - 4..],
        &[
            "global:CurrentTime".to_string(),
            "global:FollowedObject".to_string(),
            "global:Objects".to_string(),
            "call:tick".to_string(),
        ]
    );
}
