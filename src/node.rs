//! The recursive run algorithm.
//!
//! A [`TestNode`] is the execution context of one [`Definition`]. Running it
//! prints the suite description, invokes the body and then pulls steps one at
//! a time. Leaves are executed in place, nested suites get a child node one
//! level deeper which runs to completion before the next step is pulled.
//!
//! Nothing raised by test code escapes [`TestNode::run`]. Failures are
//! classified, shown right below the leaf and appended to the
//! [`FailureLog`].

use std::{io, path::Path};

use crate::{
    capture::WatchGuard,
    classify::{self, Raised, catch, catch_panic},
    config::RunSettings,
    definition::{Definition, Leaf, Step},
    filter::PathFilter,
    formatter::{FmtErrors, ProgressFormatter, PushOnError, named_fmt},
    hooks::{HookList, Hooks, Scope},
    log::FailureLog,
};

/// Pass and fail counts of a run, shared by every node of it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counters {
    pub passed: usize,
    pub failed: usize,
}

impl Counters {
    pub fn total(&self) -> usize {
        self.passed + self.failed
    }
}

/// Everything a node writes to while running.
#[derive(Debug)]
pub struct RunEnv<W> {
    pub formatter: ProgressFormatter<W>,
    pub log: FailureLog,
    pub settings: RunSettings,
    pub fmt_errors: FmtErrors,
}

impl<W> RunEnv<W> {
    pub fn new(formatter: ProgressFormatter<W>, settings: RunSettings) -> Self {
        Self {
            formatter,
            log: FailureLog::new(),
            settings,
            fmt_errors: FmtErrors::new(),
        }
    }
}

#[derive(Debug)]
pub struct TestNode {
    level: usize,
    filter: Option<PathFilter>,
    hooks: Hooks,
    definition: Option<Definition>,
    seen: Vec<String>,
    spawned: bool,
}

impl TestNode {
    pub fn new(level: usize, filter: Option<PathFilter>) -> Self {
        Self {
            level,
            filter,
            hooks: Hooks::default(),
            definition: None,
            seen: Vec::new(),
            spawned: false,
        }
    }

    /// Attach `definition` unless the filter rejects its path.
    ///
    /// Returns whether the node is bound now.
    pub fn bind(&mut self, definition: Definition) -> bool {
        if let Some(filter) = &self.filter
            && !filter.matches(definition.path())
        {
            tracing::debug!(
                path = %definition.path().display(),
                filter = filter.pattern(),
                "filter rejected definition"
            );
            return false;
        }
        self.definition = Some(definition);
        true
    }

    pub fn is_bound(&self) -> bool {
        self.definition.is_some()
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn before_each(&self, hook: impl Fn() + 'static) {
        self.scope().before_each(hook);
    }

    pub fn after_each(&self, hook: impl Fn() + 'static) {
        self.scope().after_each(hook);
    }

    /// A node one level deeper, sharing the hook lists of this one.
    pub fn child(&self) -> TestNode {
        TestNode {
            level: self.level + 1,
            filter: None,
            hooks: self.hooks.child(),
            definition: None,
            seen: Vec::new(),
            spawned: false,
        }
    }

    fn scope(&self) -> Scope {
        Scope::new(self.hooks.clone(), self.level)
    }

    /// Run the bound definition and everything nested in it.
    ///
    /// An unbound node returns right away without printing or counting anything.
    pub fn run<W: io::Write + Send>(mut self, counters: &mut Counters, env: &mut RunEnv<W>) {
        let Some(definition) = self.definition.take() else {
            return;
        };
        let level = self.level;
        let path = definition.path().to_path_buf();
        let span = tracing::debug_span!("suite", level, path = %path.display());
        let _enter = span.enter();

        let description = definition.description();
        env.fmt_errors.push_on_error(named_fmt!(
            env.formatter.fmt_description(level, &description)
        ));

        let scope = self.scope();
        let steps = {
            let _guard = WatchGuard::enter(false);
            catch_panic(move || definition.into_steps(scope))
        };
        let mut steps = match steps {
            Ok(steps) => steps,
            Err(raised) => {
                self.suite_failed(raised, &path, counters, env);
                return;
            }
        };

        loop {
            let step = {
                let _guard = WatchGuard::enter(false);
                catch_panic(|| steps.next())
            };
            match step {
                Ok(None) => break,
                Ok(Some(Step::Leaf(leaf))) => self.run_leaf(leaf, &path, counters, env),
                Ok(Some(Step::Suite(mut definition))) => {
                    definition.inherit_path(&path);
                    let mut child = self.child();
                    child.bind(definition);
                    child.run(counters, env);
                    self.spawned = true;
                }
                Err(raised) => {
                    self.suite_failed(raised, &path, counters, env);
                    break;
                }
            }
        }

        if !self.spawned {
            env.fmt_errors
                .push_on_error(named_fmt!(env.formatter.fmt_suite_end()));
        }
    }

    fn run_leaf<W: io::Write + Send>(
        &mut self,
        leaf: Leaf,
        path: &Path,
        counters: &mut Counters,
        env: &mut RunEnv<W>,
    ) {
        let level = self.level;
        let description = leaf.description();
        if self.seen.contains(&description) {
            tracing::warn!(%description, path = %path.display(), "duplicate test description");
        }
        self.seen.push(description.clone());

        let mut raised = run_hooks(&self.hooks.before);

        env.fmt_errors.push_on_error(named_fmt!(
            env.formatter.fmt_leaf_start(level, &description)
        ));
        let output = if raised.is_empty() {
            let function = leaf.into_fn();
            let guard = WatchGuard::enter(!env.settings.show_output);
            raised.extend(env.formatter.spinning(|| catch(|| function.call())).err());
            guard.finish().cleaned()
        } else {
            tracing::debug!(%description, "before hook failed, skipping leaf");
            String::new()
        };

        raised.extend(run_hooks(&self.hooks.after));

        if raised.is_empty() {
            counters.passed += 1;
            tracing::trace!(%description, "passed");
            env.fmt_errors.push_on_error(named_fmt!(
                env.formatter
                    .fmt_leaf_passed(level, &description, !output.is_empty())
            ));
            return;
        }

        counters.failed += 1;
        tracing::debug!(%description, failures = raised.len(), "failed");
        let messages: Vec<String> = raised
            .into_iter()
            .map(|raised| self.render(raised, path, env))
            .collect();
        env.fmt_errors.push_on_error(named_fmt!(
            env.formatter
                .fmt_leaf_failed(level, &description, &messages, &output)
        ));
        for message in messages {
            env.log.log(message);
        }
    }

    /// A panic while producing steps ends this suite and counts as one failure.
    fn suite_failed<W: io::Write + Send>(
        &mut self,
        raised: Raised,
        path: &Path,
        counters: &mut Counters,
        env: &mut RunEnv<W>,
    ) {
        counters.failed += 1;
        let message = self.render(raised, path, env);
        tracing::debug!(level = self.level, "suite failed while producing steps");
        env.fmt_errors.push_on_error(named_fmt!(
            env.formatter.fmt_suite_failed(self.level, &message)
        ));
        env.log.log(message);
    }

    fn render<W>(&self, raised: Raised, path: &Path, env: &RunEnv<W>) -> String {
        let RunSettings {
            library,
            working_dir,
            ..
        } = &env.settings;
        classify::classify(raised, path, library).render(working_dir)
    }
}

/// Run every hook of `list`, collecting what they raised. Hook output is never captured.
fn run_hooks(list: &HookList) -> Vec<Raised> {
    let _guard = WatchGuard::enter(false);
    list.collect()
        .into_iter()
        .filter_map(|hook| catch_panic(|| hook()).err())
        .collect()
}
