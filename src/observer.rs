//! Step observer trait for monitoring the stages of a tick.

/// Trait for observing the step pipeline.
///
/// Hooks fire after the corresponding stage has finished for every particle
/// or spring, in stage order, once per sub-step. All methods have default
/// no-op implementations.
pub trait StepObserver {
    /// Called after the force accumulator has been reset to gravity.
    fn on_gravity(&mut self) {}

    /// Called after spring batch `batch` (0..8) has been accumulated.
    fn on_spring_batch(&mut self, _batch: usize) {}

    /// Called after all particles have been integrated (Verlet step).
    fn on_integrate(&mut self) {}

    /// Called after collision resolution with the number of contacts found.
    fn on_collide(&mut self, _contacts: usize) {}

    /// Called after each stretch-correction pass.
    fn on_correction_iteration(&mut self, _iteration: usize) {}

    /// Called when a tick is fully complete.
    fn on_step_complete(&mut self) {}
}

/// A no-op observer that does nothing. Use as default when no observation needed.
pub struct NoOpStepObserver;

impl StepObserver for NoOpStepObserver {}
