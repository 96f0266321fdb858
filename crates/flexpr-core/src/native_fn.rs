//! Native function storage.
//!
//! Host members (methods, constructors, property and indexer accessors) are
//! implemented by Rust closures wrapped in [`NativeFn`].

use std::fmt;
use std::sync::Arc;

use crate::{RuntimeError, Value};

type NativeCallable = dyn Fn(&Value, &[Value]) -> Result<Value, RuntimeError> + Send + Sync;

/// Type-erased native function.
///
/// Called with the receiver (`Value::Null` for constructors and static
/// members) and the evaluated arguments.
#[derive(Clone)]
pub struct NativeFn {
    inner: Arc<NativeCallable>,
}

impl NativeFn {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &[Value]) -> Result<Value, RuntimeError> + Send + Sync + 'static,
    {
        Self { inner: Arc::new(f) }
    }

    #[inline]
    pub fn call(&self, this: &Value, args: &[Value]) -> Result<Value, RuntimeError> {
        (self.inner)(this, args)
    }
}

impl fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFn").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_passes_receiver_and_args() {
        let add = NativeFn::new(|_, args| {
            let a = args[0].as_i32().unwrap_or_default();
            let b = args[1].as_i32().unwrap_or_default();
            Ok(Value::Int32(a + b))
        });
        assert_eq!(
            add.call(&Value::Null, &[Value::Int32(17), Value::Int32(42)]),
            Ok(Value::Int32(59))
        );

        let cloned = add.clone();
        assert_eq!(
            cloned.call(&Value::Null, &[Value::Int32(1), Value::Int32(1)]),
            Ok(Value::Int32(2))
        );
    }
}
