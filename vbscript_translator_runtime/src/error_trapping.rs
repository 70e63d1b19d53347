//! `On Error Resume Next` support
//!
//! Each trapping region owns a token. Tokens start disabled; `start` and
//! `stop` toggle them and both clear the current error. There is a single
//! current-error slot per provider, shared with the `Err` object, and a later
//! error always overwrites an earlier one.

use std::cell::RefCell;
use std::rc::Rc;

use crate::convert;
use crate::error::{standard_description, RuntimeResult, VbsError, RUNTIME_ERROR_SOURCE};
use crate::object::{MemberDescriptor, VbsObject};
use crate::value::Value;

/// Handle for one trapping region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorTrappingToken(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenState {
    Released,
    Disabled,
    Enabled,
}

/// The current trapped error, shared between the trapping state and `Err`
pub type ErrorSlot = Rc<RefCell<Option<VbsError>>>;

/// Token pool plus the current-error slot
#[derive(Debug, Default)]
pub struct ErrorTrapping {
    tokens: RefCell<Vec<TokenState>>,
    free: RefCell<Vec<usize>>,
    current_error: ErrorSlot,
}

impl ErrorTrapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot observed by the `Err` object
    pub fn error_slot(&self) -> ErrorSlot {
        Rc::clone(&self.current_error)
    }

    /// Issue a fresh or recycled token, trapping disabled
    pub fn get_token(&self) -> ErrorTrappingToken {
        let mut tokens = self.tokens.borrow_mut();
        let index = match self.free.borrow_mut().pop() {
            Some(index) => {
                tokens[index] = TokenState::Disabled;
                index
            }
            None => {
                tokens.push(TokenState::Disabled);
                tokens.len() - 1
            }
        };
        tracing::trace!(token = index, "issued error trapping token");
        ErrorTrappingToken(index)
    }

    /// Return a token to the pool; releasing twice is a no-op
    pub fn release_token(&self, token: ErrorTrappingToken) {
        let mut tokens = self.tokens.borrow_mut();
        if let Some(state) = tokens.get_mut(token.0) {
            if *state != TokenState::Released {
                *state = TokenState::Released;
                self.free.borrow_mut().push(token.0);
            }
        }
    }

    /// `On Error Resume Next`
    pub fn start(&self, token: ErrorTrappingToken) -> RuntimeResult<()> {
        self.set_state(token, TokenState::Enabled)
    }

    /// `On Error Goto 0`
    pub fn stop(&self, token: ErrorTrappingToken) -> RuntimeResult<()> {
        self.set_state(token, TokenState::Disabled)
    }

    fn set_state(&self, token: ErrorTrappingToken, state: TokenState) -> RuntimeResult<()> {
        let mut tokens = self.tokens.borrow_mut();
        match tokens.get_mut(token.0) {
            Some(current) if *current != TokenState::Released => {
                *current = state;
                self.clear_error();
                Ok(())
            }
            _ => Err(VbsError::internal(format!(
                "error trapping token {} is not live",
                token.0
            ))),
        }
    }

    pub fn is_enabled(&self, token: ErrorTrappingToken) -> bool {
        self.tokens.borrow().get(token.0) == Some(&TokenState::Enabled)
    }

    /// Run `action`; its error is recorded when trapping is enabled for
    /// `token`, otherwise the token is released and the error propagates
    pub fn handle<T>(
        &self,
        token: ErrorTrappingToken,
        action: impl FnOnce() -> RuntimeResult<T>,
    ) -> RuntimeResult<Option<T>> {
        match action() {
            Ok(value) => Ok(Some(value)),
            Err(err) if self.is_enabled(token) => {
                tracing::debug!(number = err.number(), "trapped runtime error");
                self.set_error(err);
                Ok(None)
            }
            Err(err) => {
                self.release_token(token);
                Err(err)
            }
        }
    }

    pub fn set_error(&self, err: VbsError) {
        *self.current_error.borrow_mut() = Some(err);
    }

    pub fn clear_error(&self) {
        *self.current_error.borrow_mut() = None;
    }

    pub fn current_error(&self) -> Option<VbsError> {
        self.current_error.borrow().clone()
    }
}

// ========== Err object ==========

const ERR_NUMBER: usize = 0;
const ERR_SOURCE: usize = 1;
const ERR_DESCRIPTION: usize = 2;
const ERR_RAISE: usize = 3;
const ERR_CLEAR: usize = 4;

const ERR_MEMBERS: &[MemberDescriptor] = &[
    MemberDescriptor::property_get("Number", 0).default_member(),
    MemberDescriptor::property_get("Source", 0),
    MemberDescriptor::property_get("Description", 0),
    MemberDescriptor::method("Raise", 1, 3),
    MemberDescriptor::method("Clear", 0, 0),
];

/// The VBScript `Err` object
#[derive(Debug)]
pub struct ErrObject {
    slot: ErrorSlot,
}

impl ErrObject {
    pub fn new(slot: ErrorSlot) -> Self {
        Self { slot }
    }

    fn raise(args: &[Value]) -> VbsError {
        let number = match args.first().map(convert::to_long) {
            Some(Ok(number)) if number != 0 => number,
            Some(Err(err)) => return err,
            _ => return VbsError::invalid_procedure_call("Err.Raise needs a non-zero number"),
        };
        let text = |index: usize| -> RuntimeResult<Option<String>> {
            match args.get(index) {
                None | Some(Value::Empty) => Ok(None),
                Some(value) => convert::to_string(value).map(Some),
            }
        };
        let (source, description) = match (text(1), text(2)) {
            (Ok(source), Ok(description)) => (source, description),
            (Err(err), _) | (_, Err(err)) => return err,
        };
        let standard = standard_description(number);
        let source = source.unwrap_or_else(|| {
            if standard.is_some() {
                RUNTIME_ERROR_SOURCE.to_string()
            } else {
                String::new()
            }
        });
        let description = description
            .or_else(|| standard.map(str::to_string))
            .unwrap_or_default();
        VbsError::custom(number, source, description)
    }
}

impl VbsObject for ErrObject {
    fn type_name(&self) -> &str {
        "ErrObject"
    }

    fn members(&self) -> &[MemberDescriptor] {
        ERR_MEMBERS
    }

    fn get_member(&self, index: usize, args: &mut [Value]) -> RuntimeResult<Value> {
        let current = self.slot.borrow().clone();
        match index {
            ERR_NUMBER => Ok(Value::Long(current.map_or(0, |e| e.number()))),
            ERR_SOURCE => Ok(Value::Str(
                current.map(|e| e.error_source().to_string()).unwrap_or_default(),
            )),
            ERR_DESCRIPTION => Ok(Value::Str(
                current.map(|e| e.description()).unwrap_or_default(),
            )),
            ERR_RAISE => Err(Self::raise(args)),
            ERR_CLEAR => {
                *self.slot.borrow_mut() = None;
                Ok(Value::Empty)
            }
            _ => Err(VbsError::member_not_supported(format!("Err member #{}", index))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::ArgumentProvider;
    use crate::dispatch;

    fn err_number(trapping: &ErrorTrapping) -> i32 {
        trapping.current_error().map_or(0, |e| e.number())
    }

    #[test]
    fn test_tokens_are_recycled() {
        let trapping = ErrorTrapping::new();
        let a = trapping.get_token();
        let b = trapping.get_token();
        assert_ne!(a, b);
        trapping.release_token(a);
        trapping.release_token(a);
        let c = trapping.get_token();
        assert_eq!(a, c);
        assert!(!trapping.is_enabled(c));
        let d = trapping.get_token();
        assert_ne!(d, b);
    }

    #[test]
    fn test_round_trip() {
        let trapping = ErrorTrapping::new();
        let token = trapping.get_token();
        trapping.start(token).unwrap();
        let result: Option<()> = trapping
            .handle(token, || Err(VbsError::DivisionByZero))
            .unwrap();
        assert!(result.is_none());
        assert_eq!(err_number(&trapping), 11);
        trapping.stop(token).unwrap();
        assert_eq!(err_number(&trapping), 0);
    }

    #[test]
    fn test_disabled_token_propagates_and_releases() {
        let trapping = ErrorTrapping::new();
        let token = trapping.get_token();
        let err = trapping
            .handle(token, || -> RuntimeResult<()> { Err(VbsError::type_mismatch("x")) })
            .unwrap_err();
        assert_eq!(err.number(), 13);
        assert!(trapping.start(token).is_err());
    }

    #[test]
    fn test_later_error_overwrites_earlier() {
        let trapping = ErrorTrapping::new();
        let outer = trapping.get_token();
        let inner = trapping.get_token();
        trapping.start(outer).unwrap();
        trapping.start(inner).unwrap();
        let _ = trapping.handle(outer, || -> RuntimeResult<()> { Err(VbsError::DivisionByZero) });
        let _ = trapping.handle(inner, || -> RuntimeResult<()> {
            Err(VbsError::type_mismatch("x"))
        });
        assert_eq!(err_number(&trapping), 13);
    }

    #[test]
    fn test_start_clears_current_error() {
        let trapping = ErrorTrapping::new();
        let token = trapping.get_token();
        trapping.set_error(VbsError::DivisionByZero);
        trapping.start(token).unwrap();
        assert_eq!(err_number(&trapping), 0);
    }

    #[test]
    fn test_err_object_reads_current_error() {
        let trapping = ErrorTrapping::new();
        let err = Value::object(ErrObject::new(trapping.error_slot()));
        assert_eq!(convert::val(&err).unwrap(), Value::Long(0));

        trapping.set_error(VbsError::subscript_out_of_range("i"));
        assert_eq!(convert::val(&err).unwrap(), Value::Long(9));
        let description =
            dispatch::call(&Value::Nothing, &err, &["Description"], &mut ArgumentProvider::new())
                .unwrap();
        assert_eq!(description, Value::from("Subscript out of range"));

        dispatch::call(&Value::Nothing, &err, &["Clear"], &mut ArgumentProvider::new()).unwrap();
        assert_eq!(convert::val(&err).unwrap(), Value::Long(0));
    }

    #[test]
    fn test_err_raise() {
        let trapping = ErrorTrapping::new();
        let err = Value::object(ErrObject::new(trapping.error_slot()));

        let mut args = ArgumentProvider::new().val(&Value::Long(13));
        let raised = dispatch::call(&Value::Nothing, &err, &["Raise"], &mut args).unwrap_err();
        assert_eq!(raised.number(), 13);
        assert_eq!(raised.description(), "Type mismatch");
        assert_eq!(raised.error_source(), RUNTIME_ERROR_SOURCE);

        let mut args = ArgumentProvider::new()
            .val(&Value::Long(1000))
            .val(&Value::from("App"))
            .val(&Value::from("Custom failure"));
        let raised = dispatch::call(&Value::Nothing, &err, &["raise"], &mut args).unwrap_err();
        assert_eq!(raised.number(), 1000);
        assert_eq!(raised.error_source(), "App");
        assert_eq!(raised.description(), "Custom failure");
    }

    #[test]
    fn test_err_raise_zero_is_invalid_procedure_call() {
        let trapping = ErrorTrapping::new();
        let err = Value::object(ErrObject::new(trapping.error_slot()));

        let mut args = ArgumentProvider::new().val(&Value::Long(0));
        let raised = dispatch::call(&Value::Nothing, &err, &["Raise"], &mut args).unwrap_err();
        assert_eq!(raised.number(), 5);

        let mut args = ArgumentProvider::new().val(&Value::Empty);
        let raised = dispatch::call(&Value::Nothing, &err, &["Raise"], &mut args).unwrap_err();
        assert_eq!(raised.number(), 5);

        assert_eq!(ErrObject::raise(&[]).number(), 5);
    }
}
