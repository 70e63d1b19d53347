//! Late-bound member dispatch
//!
//! `call` and `set` are the generic CALL/SET operations of translated code.
//! Arguments are evaluated before the target's shape is checked. Members are
//! resolved, in order, as array element access (no member name), through
//! `DispatchObject` when the object offers it, and otherwise by descriptor
//! lookup (name, arity, default-ness), with resolutions cached per type.

use std::rc::Rc;

use crate::args::ArgumentProvider;
use crate::cache::{self, InvokerKey, MemberAccess};
use crate::error::{RuntimeResult, VbsError};
use crate::object::{InvokeKind, VbsObject, DISPID_VALUE};
use crate::value::Value;

/// Private members are visible when the caller is an instance of the same class
fn include_private(context: &Value, object: &Rc<dyn VbsObject>) -> bool {
    match context {
        Value::Object(caller) => caller.type_name() == object.type_name(),
        _ => false,
    }
}

fn invoker_key(
    object: &Rc<dyn VbsObject>,
    member: Option<&str>,
    arity: usize,
    include_private: bool,
    access: MemberAccess,
) -> InvokerKey {
    InvokerKey {
        type_name: object.type_name().to_string(),
        member: member.map(str::to_ascii_lowercase),
        arity,
        include_private,
        access,
    }
}

fn describe(object: &Rc<dyn VbsObject>, member: Option<&str>) -> String {
    match member {
        Some(name) => format!("{}.{}", object.type_name(), name),
        None => format!("{} default member", object.type_name()),
    }
}

/// Error for a member that did not resolve: wrong arity if the name exists
fn unresolved(object: &Rc<dyn VbsObject>, member: Option<&str>) -> VbsError {
    let exists = object.members().iter().any(|m| match member {
        Some(name) => m.is_named(name),
        None => m.is_default,
    });
    if exists {
        VbsError::wrong_number_of_arguments(describe(object, member))
    } else {
        VbsError::member_not_supported(describe(object, member))
    }
}

/// Generic CALL: `target.m1.m2...(args)`
///
/// With no members the arguments apply to the target itself: array index
/// access or the default member.
pub fn call(
    context: &Value,
    target: &Value,
    members: &[&str],
    args: &mut ArgumentProvider,
) -> RuntimeResult<Value> {
    let mut values = args.evaluate(context)?;
    let result = call_with_values(
        context,
        target,
        members,
        &mut values,
        args.has_zero_argument_brackets(),
    )?;
    args.write_back(values)?;
    Ok(result)
}

fn call_with_values(
    context: &Value,
    target: &Value,
    members: &[&str],
    values: &mut [Value],
    zero_argument_brackets: bool,
) -> RuntimeResult<Value> {
    let Some((last, path)) = members.split_last() else {
        if values.is_empty() && !zero_argument_brackets {
            return Ok(target.clone());
        }
        return invoke(context, target, None, values, zero_argument_brackets);
    };
    let mut current = target.clone();
    for member in path {
        current = invoke(context, &current, Some(*member), &mut [], false)?;
    }
    invoke(context, &current, Some(*last), values, zero_argument_brackets)
}

/// Read one member (or the default member / array element when `member` is
/// `None`)
fn invoke(
    context: &Value,
    target: &Value,
    member: Option<&str>,
    values: &mut [Value],
    zero_argument_brackets: bool,
) -> RuntimeResult<Value> {
    match target {
        Value::Object(object) => invoke_object(context, object, member, values),
        Value::Nothing => Err(VbsError::object_variable_not_set(
            member.unwrap_or("default member").to_string(),
        )),
        Value::Array(array) if member.is_none() => {
            if values.is_empty() {
                if zero_argument_brackets {
                    return Err(VbsError::subscript_out_of_range("array accessed with ()"));
                }
                return Ok(target.clone());
            }
            array.borrow().get(values)
        }
        other => match member {
            Some(name) => Err(VbsError::object_required(format!(
                "'{}' has no member '{}'",
                other.type_name(),
                name
            ))),
            None => Err(VbsError::type_mismatch(format!(
                "'{}' called with arguments",
                other.type_name()
            ))),
        },
    }
}

fn invoke_object(
    context: &Value,
    object: &Rc<dyn VbsObject>,
    member: Option<&str>,
    values: &mut [Value],
) -> RuntimeResult<Value> {
    if let Some(dispatch) = object.as_dispatch() {
        let dispid = match member {
            Some(name) => dispatch
                .get_id_of_name(name)
                .ok_or_else(|| VbsError::member_not_supported(describe(object, member)))?,
            None => DISPID_VALUE,
        };
        return dispatch.invoke(dispid, InvokeKind::Get, values);
    }

    let private = include_private(context, object);
    let key = invoker_key(object, member, values.len(), private, MemberAccess::Get);
    if let Some(index) = cache::resolve_member(key, object.members()) {
        return object.get_member(index, values);
    }

    // a parameterless getter whose result takes the arguments: obj.Items(1)
    if !values.is_empty() {
        let getter_key = invoker_key(object, member, 0, private, MemberAccess::Get);
        if let Some(getter) = cache::resolve_member(getter_key, object.members()) {
            tracing::trace!(member = %describe(object, member), "applying arguments to getter result");
            let intermediate = object.get_member(getter, &mut [])?;
            return invoke(context, &intermediate, None, values, false);
        }
    }
    Err(unresolved(object, member))
}

/// Generic SET: `target.member(args) = value`
///
/// Without a member the write goes to an array element or the target's default
/// member.
pub fn set(
    value: Value,
    context: &Value,
    target: &Value,
    member: Option<&str>,
    args: &mut ArgumentProvider,
) -> RuntimeResult<()> {
    let mut values = args.evaluate(context)?;
    assign(value, context, target, member, &mut values)?;
    args.write_back(values)
}

fn assign(
    value: Value,
    context: &Value,
    target: &Value,
    member: Option<&str>,
    values: &mut [Value],
) -> RuntimeResult<()> {
    match target {
        Value::Object(object) => assign_object(value, context, object, member, values),
        Value::Nothing => Err(VbsError::object_variable_not_set(
            member.unwrap_or("default member").to_string(),
        )),
        Value::Array(array) if member.is_none() => {
            if values.is_empty() {
                return Err(VbsError::type_mismatch("array assigned without an index"));
            }
            array.borrow_mut().set(values, value)
        }
        other => match member {
            Some(name) => Err(VbsError::object_required(format!(
                "'{}' has no member '{}'",
                other.type_name(),
                name
            ))),
            None => Err(VbsError::type_mismatch(format!(
                "cannot assign through '{}'",
                other.type_name()
            ))),
        },
    }
}

fn assign_object(
    value: Value,
    context: &Value,
    object: &Rc<dyn VbsObject>,
    member: Option<&str>,
    values: &mut [Value],
) -> RuntimeResult<()> {
    let is_reference = value.is_object();

    if let Some(dispatch) = object.as_dispatch() {
        let dispid = match member {
            Some(name) => dispatch
                .get_id_of_name(name)
                .ok_or_else(|| VbsError::member_not_supported(describe(object, member)))?,
            None => DISPID_VALUE,
        };
        let kind = if is_reference {
            InvokeKind::PutRef
        } else {
            InvokeKind::Put
        };
        let mut put_args: Vec<Value> = values.to_vec();
        put_args.push(value);
        dispatch.invoke(dispid, kind, &mut put_args)?;
        return Ok(());
    }

    let private = include_private(context, object);
    let access = if is_reference {
        MemberAccess::Set
    } else {
        MemberAccess::Let
    };
    let key = invoker_key(object, member, values.len(), private, access);
    if let Some(index) = cache::resolve_member(key, object.members()) {
        return object.set_member(index, values, value);
    }

    // obj.Items(1) = x where Items is a parameterless getter
    if !values.is_empty() {
        let getter_key = invoker_key(object, member, 0, private, MemberAccess::Get);
        if let Some(getter) = cache::resolve_member(getter_key, object.members()) {
            let intermediate = object.get_member(getter, &mut [])?;
            return assign(value, context, &intermediate, None, values);
        }
    }
    Err(unresolved(object, member))
}

#[cfg(test)]
mod tests;
