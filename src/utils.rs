use rand::{rngs::StdRng, seq::IndexedRandom};

/// Picks uniformly at random one of the `legal` actions that is not in `tried`.
///
/// Sampling from the difference of both sets gives the same distribution as
/// drawing from `legal` until an untried action comes up, without the retries.
///
/// # Parameters
/// - `legal`: Every action currently available.
/// - `tried`: Actions that already own a child node.
/// - `rng`: The random number generator driving the search, so that a seeded
///          search stays reproducible.
///
/// # Returns
/// The chosen action, or `None` when every legal action has been tried.
pub fn sample_untried<A: Clone + PartialEq>(legal: &[A], tried: &[A], rng: &mut StdRng) -> Option<A>{
    let untried: Vec<&A> = legal.iter().filter(|action| !tried.contains(action)).collect();

    untried.choose(rng).map(|action| (*action).clone())
}
