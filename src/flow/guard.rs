//! Flow configuration: ordered phases plus named guards.

use crate::core::config::PhaseId;
use crate::core::error::RejectionReason;

/// Guard predicate over `Core`. `true` allows the transition.
pub type GuardFn<C> = Box<dyn Fn(&C) -> bool + Send + Sync>;

/// Named predicate that can block a phase transition.
///
/// A guard without a `leaving` scope applies to every transition.
pub struct FlowGuard<C> {
    name: String,
    leaving: Option<PhaseId>,
    predicate: GuardFn<C>,
}

impl<C> FlowGuard<C> {
    /// Create a guard applying to every transition.
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&C) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            leaving: None,
            predicate: Box::new(predicate),
        }
    }

    /// Only check when leaving `phase` (builder pattern).
    #[must_use]
    pub fn leaving(mut self, phase: &str) -> Self {
        self.leaving = Some(PhaseId::new(phase));
        self
    }

    /// Guard name, reported in `GuardFailed`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this guard is consulted when leaving `phase`.
    #[must_use]
    pub fn applies_to(&self, phase: &PhaseId) -> bool {
        self.leaving.as_ref().map_or(true, |p| p == phase)
    }

    /// Evaluate the predicate.
    #[must_use]
    pub fn allows(&self, core: &C) -> bool {
        (self.predicate)(core)
    }
}

impl<C> std::fmt::Debug for FlowGuard<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlowGuard")
            .field("name", &self.name)
            .field("leaving", &self.leaving)
            .finish_non_exhaustive()
    }
}

/// A game's phase order and transition guards.
///
/// ```
/// use tabletop_engine::flow::{FlowConfig, FlowGuard};
///
/// let flow: FlowConfig<bool> = FlowConfig::new(&["main1", "combat", "main2"])
///     .with_guard(FlowGuard::new("settled", |pending: &bool| !*pending).leaving("combat"));
///
/// assert_eq!(flow.first_phase(), "main1");
/// assert_eq!(flow.next_phase(&"combat".into()).unwrap(), "main2");
/// assert!(flow.next_phase(&"main2".into()).is_none());
/// ```
#[derive(Debug)]
pub struct FlowConfig<C> {
    phases: Vec<PhaseId>,
    guards: Vec<FlowGuard<C>>,
}

impl<C> FlowConfig<C> {
    /// Create a flow from an ordered phase list.
    ///
    /// Panics if the list is empty or repeats a phase.
    pub fn new(phases: &[&str]) -> Self {
        assert!(!phases.is_empty(), "Flow needs at least one phase");
        let phases: Vec<PhaseId> = phases.iter().map(|p| PhaseId::new(*p)).collect();
        for (i, phase) in phases.iter().enumerate() {
            assert!(
                !phases[..i].contains(phase),
                "Duplicate phase {phase} in flow"
            );
        }

        Self {
            phases,
            guards: Vec::new(),
        }
    }

    /// Register a guard (builder pattern). Guards run in registration order.
    #[must_use]
    pub fn with_guard(mut self, guard: FlowGuard<C>) -> Self {
        self.guards.push(guard);
        self
    }

    /// Ordered phase list.
    #[must_use]
    pub fn phases(&self) -> &[PhaseId] {
        &self.phases
    }

    /// Registered guards.
    #[must_use]
    pub fn guards(&self) -> &[FlowGuard<C>] {
        &self.guards
    }

    /// Phase every turn starts in.
    #[must_use]
    pub fn first_phase(&self) -> &PhaseId {
        &self.phases[0]
    }

    /// Last phase of a turn.
    #[must_use]
    pub fn terminal_phase(&self) -> &PhaseId {
        &self.phases[self.phases.len() - 1]
    }

    /// Position of `phase` in the list.
    #[must_use]
    pub fn index_of(&self, phase: &PhaseId) -> Option<usize> {
        self.phases.iter().position(|p| p == phase)
    }

    /// Phase after `phase`, or `None` from the terminal phase.
    ///
    /// A phase outside the list also yields `None`, so advancing from it
    /// ends the turn.
    #[must_use]
    pub fn next_phase(&self, phase: &PhaseId) -> Option<&PhaseId> {
        self.index_of(phase).and_then(|i| self.phases.get(i + 1))
    }

    /// Evaluate every guard applying to a transition out of `leaving`.
    ///
    /// The first failing guard, in registration order, rejects.
    pub fn check_guards(&self, core: &C, leaving: &PhaseId) -> Result<(), RejectionReason> {
        match self
            .guards
            .iter()
            .find(|g| g.applies_to(leaving) && !g.allows(core))
        {
            Some(guard) => Err(RejectionReason::GuardFailed(guard.name().to_string())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flow() -> FlowConfig<i32> {
        FlowConfig::new(&["draw", "main", "end"])
            .with_guard(FlowGuard::new("positive", |v: &i32| *v > 0))
            .with_guard(FlowGuard::new("small", |v: &i32| *v < 10).leaving("main"))
    }

    #[test]
    fn test_phase_order() {
        let flow = flow();

        assert_eq!(flow.first_phase(), "draw");
        assert_eq!(flow.terminal_phase(), "end");
        assert_eq!(flow.index_of(&"main".into()), Some(1));
        assert_eq!(flow.next_phase(&"draw".into()).unwrap(), "main");
        assert!(flow.next_phase(&"end".into()).is_none());
        assert!(flow.next_phase(&"unknown".into()).is_none());
    }

    #[test]
    fn test_guard_scope() {
        let flow = flow();

        assert!(flow.check_guards(&50, &"draw".into()).is_ok());
        assert_eq!(
            flow.check_guards(&50, &"main".into()),
            Err(RejectionReason::GuardFailed("small".into()))
        );
    }

    #[test]
    fn test_first_failing_guard_wins() {
        let flow = flow();

        assert_eq!(
            flow.check_guards(&-5, &"main".into()),
            Err(RejectionReason::GuardFailed("positive".into()))
        );
    }

    #[test]
    fn test_single_phase_flow() {
        let flow: FlowConfig<()> = FlowConfig::new(&["only"]);
        assert_eq!(flow.first_phase(), flow.terminal_phase());
        assert!(flow.next_phase(&"only".into()).is_none());
    }

    #[test]
    #[should_panic(expected = "at least one phase")]
    fn test_empty_flow_panics() {
        let _: FlowConfig<()> = FlowConfig::new(&[]);
    }

    #[test]
    #[should_panic(expected = "Duplicate phase")]
    fn test_duplicate_phase_panics() {
        let _: FlowConfig<()> = FlowConfig::new(&["a", "b", "a"]);
    }
}
