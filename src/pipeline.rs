use tracing::{error, info, info_span};

use crate::{
    error::{InstallerError, Result},
    ui,
};

/// A named unit of work over a shared context `C`.
pub struct Step<C> {
    pub name: &'static str,
    pub run: fn(&mut C) -> Result<()>,
}

impl<C> Step<C> {
    pub const fn new(name: &'static str, run: fn(&mut C) -> Result<()>) -> Self {
        Self { name, run }
    }
}

/// Runs `steps` in order and stops at the first failure, which comes back
/// wrapped with the name of the step that raised it.
pub fn run<C>(steps: &[Step<C>], ctx: &mut C) -> Result<()> {
    let total = steps.len();

    for (index, step) in steps.iter().enumerate() {
        let _span = info_span!("step", name = step.name).entered();
        ui::print_step(index + 1, total, step.name);
        info!("started");

        if let Err(err) = (step.run)(ctx) {
            error!(%err, "failed");
            return Err(InstallerError::Step {
                step: step.name,
                source: Box::new(err),
            });
        }

        info!("finished");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Trace(Vec<&'static str>);

    fn first(t: &mut Trace) -> Result<()> {
        t.0.push("first");
        Ok(())
    }

    fn second(t: &mut Trace) -> Result<()> {
        t.0.push("second");
        Err(InstallerError::CommandFailed("fdisk".into(), 1))
    }

    fn third(t: &mut Trace) -> Result<()> {
        t.0.push("third");
        Ok(())
    }

    #[test]
    fn runs_in_order_and_stops_on_failure() {
        let steps = [
            Step::new("First", first),
            Step::new("Second", second),
            Step::new("Third", third),
        ];
        let mut trace = Trace::default();

        let err = run(&steps, &mut trace).unwrap_err();

        assert_eq!(trace.0, vec!["first", "second"]);
        match err {
            InstallerError::Step { step, source } => {
                assert_eq!(step, "Second");
                assert!(matches!(*source, InstallerError::CommandFailed(ref p, 1) if p == "fdisk"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn empty_pipeline_succeeds() {
        let steps: [Step<Trace>; 0] = [];
        assert!(run(&steps, &mut Trace::default()).is_ok());
    }
}
