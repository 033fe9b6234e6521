use std::{
    any,
    borrow::Cow,
    error::Error as StdError,
    fmt::{self, Debug, Display},
    panic::Location,
    path::{Path, PathBuf},
};

use crate::{
    describe::describe,
    hooks::Scope,
    stack::{self, Frame, SourceLocation},
};

/// A lazy, finite sequence of steps. It is consumed exactly once.
pub type Steps = Box<dyn Iterator<Item = Step>>;

type Body = Box<dyn FnOnce(Scope) -> Steps>;

/// A suite of tests: documentation, the file it lives in and a body producing [`Steps`].
///
/// The body receives a [`Scope`] to register hooks on. Whatever the body does
/// before returning its steps runs eagerly when the suite starts, everything
/// inside the returned iterator runs as the steps are pulled.
pub struct Definition {
    doc: Cow<'static, str>,
    path: PathBuf,
    body: Body,
}

impl Definition {
    pub fn new<B, I>(doc: impl Into<Cow<'static, str>>, path: impl Into<PathBuf>, body: B) -> Self
    where
        B: FnOnce(Scope) -> I + 'static,
        I: IntoIterator<Item = Step>,
        I::IntoIter: 'static,
    {
        Self {
            doc: doc.into(),
            path: path.into(),
            body: Box::new(move |scope| Box::new(body(scope).into_iter())),
        }
    }

    /// The raw documentation this suite was declared with.
    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn description(&self) -> String {
        describe(&self.doc)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn with_path(self, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..self
        }
    }

    /// Nested suites are usually declared without a path, they live in their parent's file.
    pub(crate) fn inherit_path(&mut self, parent: &Path) {
        if self.path.as_os_str().is_empty() {
            self.path = parent.to_path_buf();
        }
    }

    pub(crate) fn into_steps(self, scope: Scope) -> Steps {
        (self.body)(scope)
    }
}

impl Debug for Definition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Definition")
            .field("doc", &self.doc)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// One element of a suite.
#[derive(Debug)]
pub enum Step {
    Leaf(Leaf),
    Suite(Definition),
}

impl From<Leaf> for Step {
    fn from(value: Leaf) -> Self {
        Step::Leaf(value)
    }
}

impl From<Definition> for Step {
    fn from(value: Definition) -> Self {
        Step::Suite(value)
    }
}

/// A single executable test case.
#[derive(Debug)]
pub struct Leaf {
    doc: Cow<'static, str>,
    function: LeafFn,
}

impl Leaf {
    pub fn new<F, T>(doc: impl Into<Cow<'static, str>>, function: F) -> Self
    where
        F: FnOnce() -> T + 'static,
        T: Into<LeafResult>,
    {
        Self {
            doc: doc.into(),
            function: LeafFn::new(function),
        }
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn description(&self) -> String {
        describe(&self.doc)
    }

    pub(crate) fn into_fn(self) -> LeafFn {
        self.function
    }
}

/// Shorthand for [`Leaf::new`] wrapped into a [`Step`].
pub fn leaf<F, T>(doc: impl Into<Cow<'static, str>>, function: F) -> Step
where
    F: FnOnce() -> T + 'static,
    T: Into<LeafResult>,
{
    Step::Leaf(Leaf::new(doc, function))
}

/// Shorthand for a nested [`Definition`] wrapped into a [`Step`].
///
/// The nested suite takes the file path of the suite that yields it.
pub fn suite<B, I>(doc: impl Into<Cow<'static, str>>, body: B) -> Step
where
    B: FnOnce(Scope) -> I + 'static,
    I: IntoIterator<Item = Step>,
    I::IntoIter: 'static,
{
    Step::Suite(Definition::new(doc, PathBuf::new(), body))
}

pub struct LeafFn(Box<dyn FnOnce() -> LeafResult>);

impl LeafFn {
    pub fn new<F, T>(function: F) -> Self
    where
        F: FnOnce() -> T + 'static,
        T: Into<LeafResult>,
    {
        Self(Box::new(move || function().into()))
    }

    pub fn call(self) -> LeafResult {
        (self.0)()
    }
}

impl Debug for LeafFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LeafFn(...)")
    }
}

#[derive(Debug)]
pub struct LeafResult(pub Result<(), Exception>);

impl From<()> for LeafResult {
    fn from(_: ()) -> Self {
        Self(Ok(()))
    }
}

impl<E: Into<Exception>> From<Result<(), E>> for LeafResult {
    fn from(v: Result<(), E>) -> Self {
        LeafResult(v.map_err(Into::into))
    }
}

/// An error a leaf returned instead of panicking.
///
/// Any [`std::error::Error`] converts into an `Exception` through `?`, which
/// records the type name as the class and the `?` site as the raising
/// location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exception {
    class: Cow<'static, str>,
    message: String,
    location: SourceLocation,
    stack: Vec<Frame>,
}

impl Exception {
    #[track_caller]
    pub fn new(class: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            message: message.into(),
            location: Location::caller().into(),
            stack: stack::capture(),
        }
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the exception was created.
    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn stack(&self) -> &[Frame] {
        &self.stack
    }

    pub fn with_stack(self, stack: Vec<Frame>) -> Self {
        Self { stack, ..self }
    }
}

impl<E: StdError + 'static> From<E> for Exception {
    #[track_caller]
    fn from(value: E) -> Self {
        Exception::new(any::type_name::<E>(), value.to_string())
    }
}

impl Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.class, self.message)
    }
}

/// Build a boxed step sequence from a list of steps.
///
/// ```
/// use nestest::{leaf, steps, suite};
///
/// let steps = steps![
///     leaf("adds", || nestest::assert_eq!(1 + 1, 2)),
///     suite("nested", |_| steps![leaf("still adds", || ())]),
/// ];
/// assert_eq!(steps.count(), 2);
/// ```
#[macro_export]
macro_rules! steps {
    ($($step:expr),* $(,)?) => {{
        let steps: ::std::vec::Vec<$crate::definition::Step> =
            ::std::vec![$(::std::convert::Into::<$crate::definition::Step>::into($step)),*];
        ::std::boxed::Box::new(steps.into_iter()) as $crate::definition::Steps
    }};
}
