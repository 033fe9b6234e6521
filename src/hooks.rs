//! Before and after hooks inherited down the suite tree.
//!
//! A node and every child it spawns hold handles to the same two lists. A hook
//! appended at any level, before or after a child was spawned, is seen by the
//! whole tree from the next leaf on. Hooks run in registration order.

use std::{cell::RefCell, fmt, rc::Rc};

pub type Hook = Rc<dyn Fn()>;

#[derive(Clone, Default)]
pub struct HookList(Rc<RefCell<Vec<Hook>>>);

impl HookList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, hook: Hook) {
        self.0.borrow_mut().push(hook);
    }

    /// Every registered hook, in registration order.
    ///
    /// The hooks are cloned out, so running them may register further hooks.
    pub fn collect(&self) -> Vec<Hook> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether both handles point at the same list.
    pub fn shares(&self, other: &HookList) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for HookList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("HookList").field(&self.len()).finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Hooks {
    pub before: HookList,
    pub after: HookList,
}

impl Hooks {
    /// Handles for a child node, sharing both lists with `self`.
    pub fn child(&self) -> Self {
        self.clone()
    }
}

/// Handle passed to a suite body for registering hooks.
///
/// It is cheap to clone, and clones can be moved into the step iterator or into
/// nested suites. Hooks registered through any clone land in the same suite.
#[derive(Debug, Clone)]
pub struct Scope {
    hooks: Hooks,
    level: usize,
}

impl Scope {
    pub fn new(hooks: Hooks, level: usize) -> Self {
        Self { hooks, level }
    }

    /// Run `hook` before every leaf of this suite and of all its nested suites.
    pub fn before_each(&self, hook: impl Fn() + 'static) {
        self.hooks.before.push(Rc::new(hook));
    }

    /// Run `hook` after every leaf of this suite and of all its nested suites,
    /// whether the leaf passed or not.
    pub fn after_each(&self, hook: impl Fn() + 'static) {
        self.hooks.after.push(Rc::new(hook));
    }

    /// The nesting level of the suite this scope belongs to.
    pub fn level(&self) -> usize {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Hook) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let make = {
            let calls = Rc::clone(&calls);
            move |name: &'static str| -> Hook {
                let calls = Rc::clone(&calls);
                Rc::new(move || calls.borrow_mut().push(name))
            }
        };
        (calls, make)
    }

    #[test]
    fn hooks_run_in_registration_order_across_levels() {
        let (calls, hook) = recorder();
        let root = Hooks::default();
        root.before.push(hook("root 1"));
        let child = root.child();
        child.before.push(hook("child"));
        root.before.push(hook("root 2"));

        for hook in child.before.collect() {
            hook();
        }
        assert_eq!(*calls.borrow(), ["root 1", "child", "root 2"]);
    }

    #[test]
    fn child_hooks_reach_the_parent() {
        let (_, hook) = recorder();
        let root = Hooks::default();
        let child = root.child();
        child.after.push(hook("child"));

        assert!(root.after.shares(&child.after));
        assert_eq!(root.after.len(), 1);
        assert!(root.before.is_empty());
    }

    #[test]
    fn scope_clones_share_lists() {
        let hooks = Hooks::default();
        let scope = Scope::new(hooks.clone(), 0);
        let clone = scope.clone();
        scope.before_each(|| ());
        clone.after_each(|| ());

        assert_eq!(hooks.before.len(), 1);
        assert_eq!(hooks.after.len(), 1);
    }
}
