use rand::Rng;

/// 2D point or per-frame displacement
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    fn is_positive(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Margins and speed range of the simulation, in display units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceConfig {
    /// lower bound on both axes (top/left inset)
    pub lower: f64,
    pub right_margin: f64,
    /// larger than the right margin so the label stays clear of the controls
    pub bottom_margin: f64,
    pub min_speed: f64,
    pub max_speed: f64,
}

impl Default for BounceConfig {
    fn default() -> Self {
        Self {
            lower: 20.0,
            right_margin: 40.0,
            bottom_margin: 140.0,
            min_speed: 1.5,
            max_speed: 2.5,
        }
    }
}

impl BounceConfig {
    /// Cell-scale values for a terminal display
    pub fn terminal() -> Self {
        Self {
            lower: 1.0,
            right_margin: 1.0,
            bottom_margin: 3.0,
            min_speed: 0.4,
            max_speed: 0.8,
        }
    }

    /// Overrides the speed range; non-finite values keep the current range
    pub fn with_speed(mut self, min_speed: f64, max_speed: f64) -> Self {
        if !min_speed.is_finite() || !max_speed.is_finite() {
            log::warn!("Ignoring speed range {min_speed}..{max_speed}");
            return self;
        }
        let (lo, hi) = if min_speed <= max_speed {
            (min_speed, max_speed)
        } else {
            (max_speed, min_speed)
        };
        self.min_speed = lo.max(0.0);
        self.max_speed = hi.max(0.0);
        self
    }
}

/// Inclusive range a coordinate may take on one axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub lower: f64,
    pub upper: f64,
}

impl AxisBounds {
    /// Upper collapses onto lower when the container is too small
    fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper: upper.max(lower),
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Reflects one axis; returns the committed coordinate, the new velocity
    /// and whether a clamp happened.
    fn reflect(&self, next: f64, velocity: f64) -> (f64, f64, bool) {
        if next > self.upper {
            (self.upper, -velocity.abs(), true)
        } else if next < self.lower {
            (self.lower, velocity.abs(), true)
        } else {
            (next, velocity, false)
        }
    }
}

/// Which axes were clamped during a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reflection {
    pub x: bool,
    pub y: bool,
}

/// Read-only view handed to the renderer each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceSnapshot {
    pub position: Vec2,
    pub velocity: Vec2,
}

/// Reflecting-particle simulation driving the elapsed-time label
#[derive(Debug, Clone)]
pub struct BounceSimulator {
    config: BounceConfig,
    position: Vec2,
    velocity: Vec2,
    container: Option<Size>,
    label: Option<Size>,
}

impl BounceSimulator {
    pub fn new(config: BounceConfig) -> Self {
        Self {
            config,
            position: Vec2::new(config.lower, config.lower),
            velocity: Vec2::default(),
            container: None,
            label: None,
        }
    }

    pub fn config(&self) -> &BounceConfig {
        &self.config
    }

    /// Records the display area; non-positive sizes count as unknown
    pub fn set_container(&mut self, size: Size) {
        self.container = size.is_positive().then_some(size);
    }

    /// Records the measured label; non-positive sizes count as unknown.
    /// A wider label pulls the position back inside the new bounds.
    pub fn set_label(&mut self, size: Size) {
        self.label = size.is_positive().then_some(size);
        if let Some((x, y)) = self.bounds() {
            self.position = Vec2::new(
                self.position.x.clamp(x.lower, x.upper),
                self.position.y.clamp(y.lower, y.upper),
            );
        }
    }

    pub fn bounds_known(&self) -> bool {
        self.container.is_some() && self.label.is_some()
    }

    /// Per-axis bounds, or None until both sizes are known
    pub fn bounds(&self) -> Option<(AxisBounds, AxisBounds)> {
        let container = self.container?;
        let label = self.label?;
        let lower = self.config.lower;

        Some((
            AxisBounds::new(
                lower,
                container.width - label.width - self.config.right_margin,
            ),
            AxisBounds::new(
                lower,
                container.height - label.height - self.config.bottom_margin,
            ),
        ))
    }

    /// Picks a random start point inside the safe area and a random velocity
    pub fn launch<R: Rng>(&mut self, rng: &mut R) {
        self.position = match self.bounds() {
            Some((x, y)) => Vec2::new(sample(rng, x.lower, x.upper), sample(rng, y.lower, y.upper)),
            None => Vec2::new(self.config.lower, self.config.lower),
        };
        self.velocity = Vec2::new(
            random_component(rng, &self.config),
            random_component(rng, &self.config),
        );
    }

    /// Advances one frame. Does nothing and returns None while bounds are unknown.
    pub fn step(&mut self) -> Option<Reflection> {
        let (x_bounds, y_bounds) = self.bounds()?;

        let (x, vx, hit_x) = x_bounds.reflect(self.position.x + self.velocity.x, self.velocity.x);
        let (y, vy, hit_y) = y_bounds.reflect(self.position.y + self.velocity.y, self.velocity.y);

        self.position = Vec2::new(x, y);
        self.velocity = Vec2::new(vx, vy);

        Some(Reflection { x: hit_x, y: hit_y })
    }

    pub fn snapshot(&self) -> BounceSnapshot {
        BounceSnapshot {
            position: self.position,
            velocity: self.velocity,
        }
    }

    #[cfg(test)]
    fn place(&mut self, position: Vec2, velocity: Vec2) {
        self.position = position;
        self.velocity = velocity;
    }
}

fn sample<R: Rng>(rng: &mut R, lower: f64, upper: f64) -> f64 {
    if upper > lower {
        rng.gen_range(lower..=upper)
    } else {
        lower
    }
}

fn random_component<R: Rng>(rng: &mut R, config: &BounceConfig) -> f64 {
    let magnitude = sample(rng, config.min_speed, config.max_speed);
    if rng.gen_bool(0.5) {
        magnitude
    } else {
        -magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn sized_sim() -> BounceSimulator {
        let mut sim = BounceSimulator::new(BounceConfig::default());
        sim.set_container(Size::new(400.0, 800.0));
        sim.set_label(Size::new(100.0, 40.0));
        sim
    }

    #[test]
    fn test_bounds_follow_margins() {
        let sim = sized_sim();
        let (x, y) = sim.bounds().unwrap();
        assert_eq!(x, AxisBounds { lower: 20.0, upper: 260.0 });
        assert_eq!(y, AxisBounds { lower: 20.0, upper: 620.0 });
    }

    #[test]
    fn test_step_without_bounds_is_noop() {
        let mut sim = BounceSimulator::new(BounceConfig::default());
        sim.place(Vec2::new(50.0, 50.0), Vec2::new(2.0, 2.0));
        assert_eq!(sim.step(), None);
        assert_eq!(sim.snapshot().position, Vec2::new(50.0, 50.0));

        sim.set_container(Size::new(400.0, 800.0));
        assert_eq!(sim.step(), None);

        sim.set_label(Size::new(0.0, 40.0));
        assert!(!sim.bounds_known());
        assert_eq!(sim.step(), None);
    }

    #[test]
    fn test_free_flight_adds_velocity() {
        let mut sim = sized_sim();
        sim.place(Vec2::new(100.0, 100.0), Vec2::new(2.0, -1.5));

        assert_eq!(sim.step(), Some(Reflection::default()));
        assert_eq!(sim.snapshot().position, Vec2::new(102.0, 98.5));
        assert_eq!(sim.snapshot().velocity, Vec2::new(2.0, -1.5));
    }

    #[test]
    fn test_upper_wall_clamps_and_turns_negative() {
        let mut sim = sized_sim();
        sim.place(Vec2::new(259.0, 100.0), Vec2::new(2.0, 1.0));

        let hit = sim.step().unwrap();
        assert_eq!(hit, Reflection { x: true, y: false });
        assert_eq!(sim.snapshot().position.x, 260.0);
        assert_eq!(sim.snapshot().velocity.x, -2.0);
    }

    #[test]
    fn test_lower_wall_clamps_and_turns_positive() {
        let mut sim = sized_sim();
        sim.place(Vec2::new(100.0, 21.0), Vec2::new(1.0, -2.5));

        let hit = sim.step().unwrap();
        assert_eq!(hit, Reflection { x: false, y: true });
        assert_eq!(sim.snapshot().position.y, 20.0);
        assert_eq!(sim.snapshot().velocity.y, 2.5);
    }

    #[test]
    fn test_landing_exactly_on_bound_does_not_reflect() {
        let mut sim = sized_sim();
        sim.place(Vec2::new(258.0, 100.0), Vec2::new(2.0, 0.0));

        assert_eq!(sim.step(), Some(Reflection::default()));
        assert_eq!(sim.snapshot().position.x, 260.0);
        assert_eq!(sim.snapshot().velocity.x, 2.0);

        assert_eq!(sim.step(), Some(Reflection { x: true, y: false }));
        assert_eq!(sim.snapshot().velocity.x, -2.0);
    }

    #[test]
    fn test_corner_bounce_reflects_both_axes() {
        let mut sim = sized_sim();
        sim.place(Vec2::new(259.5, 619.5), Vec2::new(2.0, 2.0));

        assert_eq!(sim.step(), Some(Reflection { x: true, y: true }));
        assert_eq!(sim.snapshot().position, Vec2::new(260.0, 620.0));
        assert_eq!(sim.snapshot().velocity, Vec2::new(-2.0, -2.0));
    }

    #[test]
    fn test_tiny_container_pins_to_lower_bound() {
        let mut sim = BounceSimulator::new(BounceConfig::default());
        sim.set_container(Size::new(50.0, 50.0));
        sim.set_label(Size::new(40.0, 20.0));
        sim.place(Vec2::new(20.0, 20.0), Vec2::new(2.0, -2.0));

        for _ in 0..10 {
            sim.step();
            assert_eq!(sim.snapshot().position, Vec2::new(20.0, 20.0));
        }
    }

    #[test]
    fn test_launch_is_reproducible_and_in_range() {
        let mut a = sized_sim();
        let mut b = sized_sim();
        a.launch(&mut StdRng::seed_from_u64(7));
        b.launch(&mut StdRng::seed_from_u64(7));
        assert_eq!(a.snapshot(), b.snapshot());

        let (xb, yb) = a.bounds().unwrap();
        let snap = a.snapshot();
        assert!(xb.contains(snap.position.x));
        assert!(yb.contains(snap.position.y));
        for v in [snap.velocity.x, snap.velocity.y] {
            assert!((1.5..=2.5).contains(&v.abs()), "speed {v} out of range");
        }
    }

    #[test]
    fn test_launch_covers_both_directions() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut sim = sized_sim();
        let (mut pos_x, mut neg_x) = (false, false);
        for _ in 0..64 {
            sim.launch(&mut rng);
            if sim.snapshot().velocity.x > 0.0 {
                pos_x = true;
            } else {
                neg_x = true;
            }
        }
        assert!(pos_x && neg_x);
    }

    #[test]
    fn test_launch_without_bounds_starts_at_lower_corner() {
        let mut sim = BounceSimulator::new(BounceConfig::default());
        sim.launch(&mut StdRng::seed_from_u64(1));
        assert_eq!(sim.snapshot().position, Vec2::new(20.0, 20.0));
        assert_ne!(sim.snapshot().velocity, Vec2::default());
    }

    #[test]
    fn test_long_run_stays_in_bounds_and_flips_only_on_clamp() {
        let mut rng = StdRng::seed_from_u64(2024);
        let mut sim = sized_sim();
        sim.launch(&mut rng);
        let (xb, yb) = sim.bounds().unwrap();

        for frame in 0..5_000 {
            let before = sim.snapshot().velocity;
            let hit = sim.step().unwrap();
            let after = sim.snapshot();

            assert!(xb.contains(after.position.x), "x escaped on frame {frame}");
            assert!(yb.contains(after.position.y), "y escaped on frame {frame}");

            let flipped_x = before.x.signum() != after.velocity.x.signum();
            let flipped_y = before.y.signum() != after.velocity.y.signum();
            assert_eq!(flipped_x, hit.x, "x flip mismatch on frame {frame}");
            assert_eq!(flipped_y, hit.y, "y flip mismatch on frame {frame}");
            assert_eq!(before.x.abs(), after.velocity.x.abs());
            assert_eq!(before.y.abs(), after.velocity.y.abs());
        }
    }

    #[test]
    fn test_shrinking_container_pulls_label_back_in() {
        let mut sim = sized_sim();
        sim.place(Vec2::new(250.0, 600.0), Vec2::new(-2.0, 2.0));
        sim.set_container(Size::new(200.0, 400.0));

        sim.step();
        let (xb, yb) = sim.bounds().unwrap();
        assert_eq!(sim.snapshot().position, Vec2::new(xb.upper, yb.upper));
        assert!(sim.snapshot().velocity.x < 0.0);
        assert!(sim.snapshot().velocity.y < 0.0);
    }

    #[test]
    fn test_terminal_config_and_speed_override() {
        let cfg = BounceConfig::terminal().with_speed(1.2, 0.3);
        assert_eq!(cfg.min_speed, 0.3);
        assert_eq!(cfg.max_speed, 1.2);
        assert_eq!(cfg.lower, 1.0);
    }

    #[test]
    fn test_non_finite_speed_keeps_default_range() {
        let base = BounceConfig::terminal();
        for (lo, hi) in [(0.4, f64::INFINITY), (f64::NAN, 0.8), (f64::NEG_INFINITY, 1.0)] {
            let cfg = base.with_speed(lo, hi);
            assert_eq!(cfg.min_speed, base.min_speed);
            assert_eq!(cfg.max_speed, base.max_speed);
        }

        let mut sim = BounceSimulator::new(base.with_speed(0.4, f64::INFINITY));
        sim.set_container(Size::new(80.0, 24.0));
        sim.set_label(Size::new(12.0, 1.0));
        sim.launch(&mut StdRng::seed_from_u64(1));
        let speed = sim.snapshot().velocity;
        assert!(speed.x.abs() <= base.max_speed && speed.y.abs() <= base.max_speed);
    }

    #[test]
    fn test_wider_label_pulls_position_inside() {
        let mut sim = sized_sim();
        let (xb, _) = sim.bounds().unwrap();
        sim.place(Vec2::new(xb.upper, 100.0), Vec2::new(2.0, 1.0));

        sim.set_label(Size::new(110.0, 40.0));
        let (xb, _) = sim.bounds().unwrap();
        assert_eq!(xb.upper, 250.0);
        assert_eq!(sim.snapshot().position, Vec2::new(250.0, 100.0));
        assert_eq!(sim.snapshot().velocity, Vec2::new(2.0, 1.0));
    }
}
