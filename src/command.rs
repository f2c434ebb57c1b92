//! Subcommand capability and the handle passed to command handlers.

use crate::error::BoxError;

/// Execution capability of a subcommand record.
///
/// When no command handler is registered on the parser, the deepest active
/// command's `execute` runs after a successful pass, receiving the leftover
/// positional arguments.
pub trait Commander {
    fn execute(&mut self, args: &[String]) -> Result<(), BoxError> {
        let _ = args;
        Ok(())
    }
}

/// The deepest command selected during a parse.
pub struct ActiveCommand<'a> {
    /// Primary name of the command (not the alias that selected it).
    pub name: &'a str,
    /// Names from the outermost command down to this one.
    pub path: Vec<&'a str>,
    pub commander: &'a mut dyn Commander,
}

impl std::fmt::Debug for ActiveCommand<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActiveCommand")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Type-erased access to a command record inside `C`.
pub(crate) trait CommandSlot<C>: 'static {
    fn commander<'a>(&self, target: &'a mut C) -> &'a mut dyn Commander;
}

pub(crate) struct DirectCommand<C, G> {
    pub(crate) access: fn(&mut C) -> &mut G,
}

impl<C: 'static, G: Commander + 'static> CommandSlot<C> for DirectCommand<C, G> {
    fn commander<'a>(&self, target: &'a mut C) -> &'a mut dyn Commander {
        (self.access)(target)
    }
}

pub(crate) struct LiftedCommand<C, G> {
    pub(crate) access: fn(&mut C) -> &mut G,
    pub(crate) inner: Box<dyn CommandSlot<G>>,
}

impl<C: 'static, G: 'static> CommandSlot<C> for LiftedCommand<C, G> {
    fn commander<'a>(&self, target: &'a mut C) -> &'a mut dyn Commander {
        self.inner.commander((self.access)(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        runs: usize,
        last: Vec<String>,
    }

    impl Commander for Counter {
        fn execute(&mut self, args: &[String]) -> Result<(), BoxError> {
            self.runs += 1;
            self.last = args.to_vec();
            Ok(())
        }
    }

    #[derive(Default)]
    struct Root {
        counter: Counter,
    }

    #[derive(Default)]
    struct Top {
        root: Root,
    }

    #[test]
    fn direct_slot_reaches_command() {
        let slot = DirectCommand {
            access: |r: &mut Root| &mut r.counter,
        };
        let mut root = Root::default();
        slot.commander(&mut root)
            .execute(&["a".to_string()])
            .unwrap();
        assert_eq!(root.counter.runs, 1);
        assert_eq!(root.counter.last, vec!["a"]);
    }

    #[test]
    fn lifted_slot_composes_accessors() {
        let slot = LiftedCommand {
            access: |t: &mut Top| &mut t.root,
            inner: Box::new(DirectCommand {
                access: |r: &mut Root| &mut r.counter,
            }) as Box<dyn CommandSlot<Root>>,
        };
        let mut top = Top::default();
        slot.commander(&mut top).execute(&[]).unwrap();
        assert_eq!(top.root.counter.runs, 1);
    }

    #[test]
    fn default_execute_succeeds() {
        struct Noop;
        impl Commander for Noop {}
        assert!(Noop.execute(&["x".to_string()]).is_ok());
    }
}
