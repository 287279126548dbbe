use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::drill_engine::models::{Mode, Operation, Problem, Settings, Step};

/// Probability that a mixed-mode step (index >= 2) attempts a subtraction.
pub const SUBTRACT_CHANCE: f64 = 0.3;

/// The random draws the generator needs.
///
/// Every `rand::Rng` is a `DrawSource`; tests can script one directly.
pub trait DrawSource {
    /// Uniform draw from `low..=high`.
    fn draw_magnitude(&mut self, low: u64, high: u64) -> u64;

    /// Bernoulli([`SUBTRACT_CHANCE`]) trial.
    fn draw_subtract(&mut self) -> bool;
}

impl<R: Rng> DrawSource for R {
    fn draw_magnitude(&mut self, low: u64, high: u64) -> u64 {
        self.gen_range(low..=high)
    }

    fn draw_subtract(&mut self) -> bool {
        self.gen_bool(SUBTRACT_CHANCE)
    }
}

/// Seeded RNG when `seed` is given, entropy otherwise.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None       => StdRng::from_entropy(),
    }
}

/// Inclusive magnitude range for a term of `digits` digits (1 digit → 1..=9).
pub fn magnitude_range(digits: u32) -> (u64, u64) {
    let low = 10u64.pow(digits.saturating_sub(1));
    let high = 10u64.pow(digits) - 1;
    (low, high)
}

/// Cap on subtract steps for a problem of `term_count` terms: floor(T * 0.4).
pub fn max_subtractions(term_count: usize) -> usize {
    term_count * 2 / 5
}

/// One random number of the configured digit count (used by preview).
pub fn random_term<S: DrawSource + ?Sized>(digits: u32, source: &mut S) -> u64 {
    let (low, high) = magnitude_range(digits);
    source.draw_magnitude(low, high)
}

/// Generate one problem.
///
/// The first two steps are always additions. A mixed-mode subtraction is only
/// committed when the cap is not yet reached and the running sum would stay
/// strictly above the first term; otherwise the step silently becomes an
/// addition. Settings are assumed to be clamped already.
pub fn generate_problem<S: DrawSource + ?Sized>(settings: &Settings, source: &mut S) -> Problem {
    let (low, high) = magnitude_range(settings.digits);
    let cap = max_subtractions(settings.term_count);

    let mut steps = Vec::with_capacity(settings.term_count);
    let mut sum: i64 = 0;
    let mut first: Option<u64> = None;
    let mut subtracts = 0usize;

    for i in 0..settings.term_count {
        let magnitude = source.draw_magnitude(low, high);
        let mut op = Operation::Add;

        if i >= 2 && settings.mode == Mode::Mixed && source.draw_subtract() && subtracts < cap {
            let would_be = sum - magnitude as i64;
            let floor = first.unwrap_or(0) as i64;
            if would_be > floor {
                op = Operation::Subtract;
                subtracts += 1;
            }
        }

        let step = Step { op, magnitude };
        sum += step.signed_value();
        first.get_or_insert(magnitude);
        steps.push(step);
    }

    let problem = Problem::from_steps(steps);
    debug_assert_eq!(problem.result(), sum);
    problem
}

/// Generate `settings.problem_count` problems, drawing fresh values for each.
pub fn generate_batch<S: DrawSource + ?Sized>(settings: &Settings, source: &mut S) -> Vec<Problem> {
    (0..settings.problem_count)
        .map(|_| generate_problem(settings, source))
        .collect()
}
