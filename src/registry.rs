//! Registration table of typed task handlers and the binder that attaches
//! them to discovered tasks.
//!
//! A handler is any `Fn` whose arguments implement [`FromArg`] and whose
//! return type implements [`TaskReturn`]. Handlers are type-erased into a
//! [`BoundFn`] that accepts the resolved values in declaration order.

use crate::ast::{ArgValue, Task};
use crate::error::TaskError;
use std::fmt;
use std::rc::Rc;

/// Type-erased handler, called with one value per declared parameter.
pub type BoundFn = Rc<dyn Fn(&[Option<ArgValue>]) -> Result<(), CallError>>;

/// Why a bound handler could not complete a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallError {
    /// The handler takes a different number of arguments than were resolved.
    Arity { expected: usize, got: usize },
    /// The value at `position` does not fit the handler's argument type.
    Argument { position: usize, reason: String },
    /// The handler ran and returned an error.
    Failed(String),
}

/// Conversion from a resolved value into a handler argument.
pub trait FromArg: Sized {
    /// # Errors
    ///
    /// Returns a reason if the value is missing or has the wrong type.
    fn from_arg(value: Option<&ArgValue>) -> Result<Self, String>;
}

impl FromArg for String {
    fn from_arg(value: Option<&ArgValue>) -> Result<Self, String> {
        match value {
            Some(ArgValue::String(s)) => Ok(s.clone()),
            Some(other) => Err(format!("expected string, got {}", other.arg_type())),
            None => Err("missing value".to_string()),
        }
    }
}

impl FromArg for bool {
    fn from_arg(value: Option<&ArgValue>) -> Result<Self, String> {
        match value {
            Some(ArgValue::Boolean(b)) => Ok(*b),
            Some(other) => Err(format!("expected bool, got {}", other.arg_type())),
            None => Err("missing value".to_string()),
        }
    }
}

macro_rules! impl_from_arg_int {
    ($($ty:ty),*) => {
        $(
            impl FromArg for $ty {
                fn from_arg(value: Option<&ArgValue>) -> Result<Self, String> {
                    match value {
                        Some(ArgValue::Integer(n)) => <$ty>::try_from(*n)
                            .map_err(|_| format!("{n} is out of range for {}", stringify!($ty))),
                        Some(other) => Err(format!("expected int, got {}", other.arg_type())),
                        None => Err("missing value".to_string()),
                    }
                }
            }
        )*
    };
}

impl_from_arg_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl<T: FromArg> FromArg for Option<T> {
    fn from_arg(value: Option<&ArgValue>) -> Result<Self, String> {
        match value {
            None => Ok(None),
            Some(_) => T::from_arg(value).map(Some),
        }
    }
}

/// Return values a task handler may produce.
pub trait TaskReturn {
    /// # Errors
    ///
    /// Returns the rendered error of a failed task.
    fn into_result(self) -> Result<(), String>;
}

impl TaskReturn for () {
    fn into_result(self) -> Result<(), String> {
        Ok(())
    }
}

impl<T, E: fmt::Display> TaskReturn for Result<T, E> {
    fn into_result(self) -> Result<(), String> {
        self.map(|_| ()).map_err(|e| e.to_string())
    }
}

/// A callable usable as a task handler. `Args` is the tuple of argument types.
pub trait Handler<Args>: 'static {
    /// # Errors
    ///
    /// Returns `Err` on arity or type mismatch, or when the task itself fails.
    fn call(&self, args: &[Option<ArgValue>]) -> Result<(), CallError>;
}

macro_rules! impl_handler {
    ($($ty:ident $var:ident),*) => {
        impl<Func, Ret, $($ty,)*> Handler<($($ty,)*)> for Func
        where
            Func: Fn($($ty),*) -> Ret + 'static,
            Ret: TaskReturn,
            $($ty: FromArg,)*
        {
            #[allow(unused_variables, unused_mut, unused_assignments)]
            fn call(&self, args: &[Option<ArgValue>]) -> Result<(), CallError> {
                let expected: usize = 0 $(+ { let _ = stringify!($var); 1 })*;
                let [$($var),*] = args else {
                    return Err(CallError::Arity { expected, got: args.len() });
                };
                let mut position = 0usize;
                $(
                    let $var = <$ty as FromArg>::from_arg($var.as_ref())
                        .map_err(|reason| CallError::Argument { position, reason })?;
                    position += 1;
                )*
                (self)($($var),*).into_result().map_err(CallError::Failed)
            }
        }
    };
}

impl_handler!();
impl_handler!(A1 a1);
impl_handler!(A1 a1, A2 a2);
impl_handler!(A1 a1, A2 a2, A3 a3);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7);
impl_handler!(A1 a1, A2 a2, A3 a3, A4 a4, A5 a5, A6 a6, A7 a7, A8 a8);

/// Name-keyed table of task handlers, populated once at startup.
#[derive(Default, Clone)]
pub struct Registry {
    handlers: Vec<(String, BoundFn)>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plain function under its own unqualified name.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the name cannot be derived (closures) or is already
    /// registered.
    pub fn register<F, Args>(&mut self, handler: F) -> Result<&mut Self, TaskError>
    where
        F: Handler<Args>,
        Args: 'static,
    {
        let type_name = std::any::type_name::<F>();
        let name = unqualified_name(type_name).ok_or_else(|| TaskError::AnonymousHandler {
            type_name: type_name.to_string(),
        })?;
        self.register_as(name, handler)
    }

    /// Register a handler under an explicit task name.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the name is already registered.
    pub fn register_as<F, Args>(
        &mut self,
        name: impl Into<String>,
        handler: F,
    ) -> Result<&mut Self, TaskError>
    where
        F: Handler<Args>,
        Args: 'static,
    {
        let name = name.into();
        if self.contains(&name) {
            return Err(TaskError::DuplicateTaskName { name });
        }
        self.handlers.push((name, erase(handler)));
        Ok(self)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.iter().any(|(n, _)| n == name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BoundFn> {
        self.handlers
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, f)| f)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.iter().map(|(n, _)| n.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

fn erase<F, Args>(handler: F) -> BoundFn
where
    F: Handler<Args>,
    Args: 'static,
{
    Rc::new(move |args: &[Option<ArgValue>]| <F as Handler<Args>>::call(&handler, args))
}

/// Last path segment of a function item's type name, without generics.
/// `None` for closures and other unnamed callables.
fn unqualified_name(type_name: &str) -> Option<&str> {
    let path = type_name.split('<').next().unwrap_or(type_name);
    let name = path.rsplit("::").next().unwrap_or(path);
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit());
    valid.then_some(name)
}

/// Attach registered handlers to discovered tasks by exact name.
///
/// Tasks without a handler stay unbound and are only shown in usage listings.
#[must_use]
pub fn bind(candidates: Vec<Task>, registry: &Registry) -> Vec<Task> {
    let tasks: Vec<Task> = candidates
        .into_iter()
        .map(|mut task| {
            task.bound = registry.get(&task.name).cloned();
            if task.bound.is_none() {
                tracing::debug!(task = %task.name, "declared task has no registered handler");
            }
            task
        })
        .collect();

    for name in registry.names() {
        if !tasks.iter().any(|t| t.name == name) {
            tracing::debug!(handler = %name, "registered handler has no declaration in source");
        }
    }

    tasks
}
