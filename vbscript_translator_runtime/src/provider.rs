//! Per-request runtime facade
//!
//! Translated code receives one `RuntimeProvider` per request (conventionally
//! bound to `_rt`) and reaches every coercion, operator, dispatch and
//! error-trapping helper through it. Objects registered as disposable are
//! disposed, most recent first, when the provider is dropped.

use std::cell::RefCell;
use std::rc::Rc;

use crate::args::ArgumentProvider;
use crate::error::{RuntimeResult, VbsError};
use crate::error_trapping::{ErrObject, ErrorTrapping, ErrorTrappingToken};
use crate::intrinsics::BuiltInFunctions;
use crate::object::VbsObject;
use crate::value::Value;
use crate::{arithmetic, array, comparison, convert, dispatch, logical};

/// Runtime state for one request
#[derive(Debug)]
pub struct RuntimeProvider {
    error_trapping: ErrorTrapping,
    err_object: Value,
    builtins: Value,
    disposables: RefCell<Vec<Rc<dyn VbsObject>>>,
}

impl Default for RuntimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeProvider {
    pub fn new() -> Self {
        let error_trapping = ErrorTrapping::new();
        let err_object = Value::object(ErrObject::new(error_trapping.error_slot()));
        Self {
            error_trapping,
            err_object,
            builtins: Value::object(BuiltInFunctions),
            disposables: RefCell::new(Vec::new()),
        }
    }

    /// Dispose `object` when this provider is dropped
    pub fn register_disposable(&self, object: Rc<dyn VbsObject>) {
        self.disposables.borrow_mut().push(object);
    }

    /// Wrap a newly created class instance (`New ClassName`), registering it
    /// for disposal
    pub fn new_instance<T: VbsObject + 'static>(&self, instance: T) -> Value {
        let object: Rc<dyn VbsObject> = Rc::new(instance);
        self.register_disposable(Rc::clone(&object));
        Value::Object(object)
    }

    // ========== Coercions ==========

    pub fn val(&self, value: &Value) -> RuntimeResult<Value> {
        convert::val(value)
    }

    pub fn obj(&self, value: &Value) -> RuntimeResult<Value> {
        convert::obj(value)
    }

    pub fn num(&self, value: &Value) -> RuntimeResult<Value> {
        convert::num(value)
    }

    pub fn str(&self, value: &Value) -> RuntimeResult<Value> {
        convert::str(value)
    }

    pub fn date(&self, value: &Value) -> RuntimeResult<Value> {
        convert::date(value)
    }

    /// `CBool`-style conversion to a Boolean value
    pub fn bool(&self, value: &Value) -> RuntimeResult<Value> {
        convert::bool(value).map(Value::Bool)
    }

    /// Condition test for `If` / `While`
    pub fn truthy(&self, value: &Value) -> RuntimeResult<bool> {
        convert::truthy(value)
    }

    /// Condition test under `On Error Resume Next`: a trapped error enters
    /// the guarded branch
    pub fn truthy_trapped(
        &self,
        token: ErrorTrappingToken,
        condition: impl FnOnce() -> RuntimeResult<Value>,
    ) -> RuntimeResult<bool> {
        let outcome = self
            .error_trapping
            .handle(token, || convert::truthy(&condition()?))?;
        Ok(outcome.unwrap_or(true))
    }

    // ========== Dispatch ==========

    pub fn args(&self) -> ArgumentProvider {
        ArgumentProvider::new()
    }

    /// Object exposing the built-in functions for late-bound calls
    pub fn builtins(&self) -> Value {
        self.builtins.clone()
    }

    pub fn call(
        &self,
        context: &Value,
        target: &Value,
        members: &[&str],
        args: &mut ArgumentProvider,
    ) -> RuntimeResult<Value> {
        dispatch::call(context, target, members, args)
    }

    pub fn set(
        &self,
        value: Value,
        context: &Value,
        target: &Value,
        member: Option<&str>,
        args: &mut ArgumentProvider,
    ) -> RuntimeResult<()> {
        dispatch::set(value, context, target, member, args)
    }

    // ========== Operators ==========

    pub fn add(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        arithmetic::add(l, r)
    }

    pub fn subt(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        arithmetic::subt(l, r)
    }

    pub fn mult(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        arithmetic::mult(l, r)
    }

    pub fn div(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        arithmetic::div(l, r)
    }

    pub fn intdiv(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        arithmetic::intdiv(l, r)
    }

    pub fn pow(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        arithmetic::pow(l, r)
    }

    pub fn modulo(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        arithmetic::modulo(l, r)
    }

    pub fn concat(&self, operands: &[&Value]) -> RuntimeResult<Value> {
        arithmetic::concat(operands)
    }

    pub fn neg(&self, operand: &Value) -> RuntimeResult<Value> {
        arithmetic::neg(operand)
    }

    pub fn not(&self, operand: &Value) -> RuntimeResult<Value> {
        logical::not(operand)
    }

    pub fn and(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        logical::and(l, r)
    }

    pub fn or(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        logical::or(l, r)
    }

    pub fn xor(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        logical::xor(l, r)
    }

    pub fn eqv(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        logical::eqv(l, r)
    }

    pub fn imp(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        logical::imp(l, r)
    }

    pub fn eq(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        comparison::eq(l, r)
    }

    pub fn noteq(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        comparison::noteq(l, r)
    }

    pub fn lt(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        comparison::lt(l, r)
    }

    pub fn lte(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        comparison::lte(l, r)
    }

    pub fn gt(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        comparison::gt(l, r)
    }

    pub fn gte(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        comparison::gte(l, r)
    }

    pub fn is(&self, l: &Value, r: &Value) -> RuntimeResult<Value> {
        comparison::is(l, r)
    }

    // ========== Arrays ==========

    pub fn new_array(&self, bounds: &[&Value]) -> RuntimeResult<Value> {
        array::new_array(bounds)
    }

    pub fn resize_array(
        &self,
        target: &Value,
        bounds: &[&Value],
        preserve: bool,
    ) -> RuntimeResult<Value> {
        array::resize_array(target, bounds, preserve)
    }

    pub fn erase(&self, target: &Value) -> RuntimeResult<Value> {
        array::erase(target)
    }

    /// `LBound(a[, dimension])`
    pub fn lbound(&self, target: &Value, dimension: Option<&Value>) -> RuntimeResult<Value> {
        array::lbound(target, dimension)
    }

    /// `UBound(a[, dimension])`
    pub fn ubound(&self, target: &Value, dimension: Option<&Value>) -> RuntimeResult<Value> {
        array::ubound(target, dimension)
    }

    // ========== Error trapping ==========

    pub fn get_error_trapping_token(&self) -> ErrorTrappingToken {
        self.error_trapping.get_token()
    }

    pub fn release_error_trapping_token(&self, token: ErrorTrappingToken) {
        self.error_trapping.release_token(token)
    }

    pub fn start_error_trapping(&self, token: ErrorTrappingToken) -> RuntimeResult<()> {
        self.error_trapping.start(token)
    }

    pub fn stop_error_trapping(&self, token: ErrorTrappingToken) -> RuntimeResult<()> {
        self.error_trapping.stop(token)
    }

    /// Run a statement under `token`
    pub fn handle_error(
        &self,
        token: ErrorTrappingToken,
        action: impl FnOnce() -> RuntimeResult<()>,
    ) -> RuntimeResult<()> {
        self.error_trapping.handle(token, action).map(|_| ())
    }

    /// The `Err` object
    pub fn err(&self) -> Value {
        self.err_object.clone()
    }

    /// Raise an error decided at translation time
    pub fn raise_error(&self, error: VbsError) -> RuntimeResult<Value> {
        tracing::debug!(number = error.number(), "raising deferred runtime error");
        Err(error)
    }
}

impl Drop for RuntimeProvider {
    fn drop(&mut self) {
        let disposables = std::mem::take(self.disposables.get_mut());
        tracing::trace!(count = disposables.len(), "disposing request objects");
        for object in disposables.iter().rev() {
            object.dispose();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug)]
    struct Tracked {
        id: u32,
        log: Rc<RefCell<Vec<u32>>>,
        disposed: Cell<bool>,
    }

    impl VbsObject for Tracked {
        fn type_name(&self) -> &str {
            "Tracked"
        }

        fn dispose(&self) {
            self.disposed.set(true);
            self.log.borrow_mut().push(self.id);
        }
    }

    #[test]
    fn test_disposables_released_on_drop_in_reverse_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        {
            let provider = RuntimeProvider::new();
            for id in 1..=3 {
                provider.new_instance(Tracked {
                    id,
                    log: Rc::clone(&log),
                    disposed: Cell::new(false),
                });
            }
            assert!(log.borrow().is_empty());
        }
        assert_eq!(*log.borrow(), vec![3, 2, 1]);
    }

    #[test]
    fn test_disposed_on_error_path() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let run = || -> RuntimeResult<()> {
            let provider = RuntimeProvider::new();
            provider.new_instance(Tracked {
                id: 7,
                log: Rc::clone(&log),
                disposed: Cell::new(false),
            });
            provider.raise_error(VbsError::DivisionByZero)?;
            Ok(())
        };
        assert!(run().is_err());
        assert_eq!(*log.borrow(), vec![7]);
    }

    #[test]
    fn test_truthy_trapped_enters_branch_on_error() {
        let provider = RuntimeProvider::new();
        let token = provider.get_error_trapping_token();
        provider.start_error_trapping(token).unwrap();
        let entered = provider
            .truthy_trapped(token, || provider.div(&Value::Long(1), &Value::Long(0)))
            .unwrap();
        assert!(entered);
        assert_eq!(provider.val(&provider.err()).unwrap(), Value::Long(11));

        let entered = provider
            .truthy_trapped(token, || Ok(Value::Bool(false)))
            .unwrap();
        assert!(!entered);
    }

    #[test]
    fn test_builtins_are_callable() {
        let provider = RuntimeProvider::new();
        let result = provider
            .call(
                &Value::Nothing,
                &provider.builtins(),
                &["UCASE"],
                &mut provider.args().val(&Value::from("abc")),
            )
            .unwrap();
        assert_eq!(result, Value::from("ABC"));
    }
}
