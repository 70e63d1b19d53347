use std::cell::RefCell;

use pretty_assertions::assert_eq;

use super::*;
use crate::array::VbsArray;
use crate::object::{DispatchObject, MemberDescriptor};

#[derive(Debug)]
struct Person {
    name: RefCell<Value>,
    items: Value,
}

impl Person {
    fn new(name: &str) -> Value {
        Value::object(Person {
            name: RefCell::new(Value::from(name)),
            items: Value::array(VbsArray::with_upper_bounds(&[2]).unwrap()),
        })
    }
}

const PERSON_NAME_GET: usize = 0;
const PERSON_NAME_LET: usize = 1;
const PERSON_ITEMS: usize = 2;
const PERSON_DOUBLE_IT: usize = 3;
const PERSON_SECRET: usize = 4;
const PERSON_GREET: usize = 5;

const PERSON_MEMBERS: &[MemberDescriptor] = &[
    MemberDescriptor::property_get("Name", 0).default_member(),
    MemberDescriptor::property_let("Name", 0),
    MemberDescriptor::property_get("Items", 0),
    MemberDescriptor::method("DoubleIt", 1, 1),
    MemberDescriptor::method("Secret", 0, 0).private(),
    MemberDescriptor::method("Greet", 1, 2),
];

impl VbsObject for Person {
    fn type_name(&self) -> &str {
        "DispatchTestPerson"
    }

    fn members(&self) -> &[MemberDescriptor] {
        PERSON_MEMBERS
    }

    fn get_member(&self, index: usize, args: &mut [Value]) -> RuntimeResult<Value> {
        match index {
            PERSON_NAME_GET => Ok(self.name.borrow().clone()),
            PERSON_ITEMS => Ok(self.items.clone()),
            PERSON_DOUBLE_IT => {
                args[0] = crate::arithmetic::mult(&args[0], &Value::Integer(2))?;
                Ok(Value::Empty)
            }
            PERSON_SECRET => Ok(Value::from("hidden")),
            PERSON_GREET => {
                let greeting = crate::convert::to_string(&args[0])?;
                Ok(Value::from(format!(
                    "{} {}",
                    greeting,
                    crate::convert::to_string(&self.name.borrow())?
                )))
            }
            _ => Err(VbsError::internal("unknown member")),
        }
    }

    fn set_member(&self, index: usize, _args: &[Value], value: Value) -> RuntimeResult<()> {
        match index {
            PERSON_NAME_LET => {
                *self.name.borrow_mut() = value;
                Ok(())
            }
            _ => Err(VbsError::internal("unknown member")),
        }
    }
}

#[derive(Debug, Default)]
struct Counter {
    count: RefCell<i32>,
}

impl DispatchObject for Counter {
    fn type_info_name(&self) -> &str {
        "DispatchTestCounter"
    }

    fn get_id_of_name(&self, name: &str) -> Option<i32> {
        if name.eq_ignore_ascii_case("Count") {
            Some(1)
        } else {
            None
        }
    }

    fn has_default_member(&self) -> bool {
        true
    }

    fn invoke(&self, dispid: i32, kind: InvokeKind, args: &mut [Value]) -> RuntimeResult<Value> {
        match (dispid, kind) {
            (DISPID_VALUE | 1, InvokeKind::Get) => Ok(Value::Long(*self.count.borrow())),
            (1, InvokeKind::Put) => {
                *self.count.borrow_mut() = crate::convert::to_long(&args[args.len() - 1])?;
                Ok(Value::Empty)
            }
            _ => Err(VbsError::member_not_supported(dispid.to_string())),
        }
    }
}

impl VbsObject for Counter {
    fn type_name(&self) -> &str {
        "Counter"
    }

    fn as_dispatch(&self) -> Option<&dyn DispatchObject> {
        Some(self)
    }
}

fn no_args() -> ArgumentProvider {
    ArgumentProvider::new()
}

#[test]
fn test_call_member_by_name_is_case_insensitive() {
    let person = Person::new("Ann");
    let result = call(&Value::Nothing, &person, &["NAME"], &mut no_args()).unwrap();
    assert_eq!(result, Value::from("Ann"));
}

#[test]
fn test_call_without_members_returns_target() {
    let person = Person::new("Ann");
    let result = call(&Value::Nothing, &person, &[], &mut no_args()).unwrap();
    assert!(result.same_reference(&person));
}

#[test]
fn test_call_with_arguments() {
    let person = Person::new("Ann");
    let mut args = no_args().val(&Value::from("Hello"));
    let result = call(&Value::Nothing, &person, &["Greet"], &mut args).unwrap();
    assert_eq!(result, Value::from("Hello Ann"));
}

#[test]
fn test_by_ref_argument_is_written_back() {
    let person = Person::new("Ann");
    let mut args = no_args().by_ref(&Value::Integer(21));
    call(&Value::Nothing, &person, &["DoubleIt"], &mut args).unwrap();
    assert_eq!(args.take(0), Value::Integer(42));
}

#[test]
fn test_getter_result_takes_arguments() {
    let person = Person::new("Ann");
    set(
        Value::from("first"),
        &Value::Nothing,
        &person,
        Some("Items"),
        &mut no_args().val(&Value::Long(0)),
    )
    .unwrap();
    let mut args = no_args().val(&Value::Long(0));
    let result = call(&Value::Nothing, &person, &["Items"], &mut args).unwrap();
    assert_eq!(result, Value::from("first"));
}

#[test]
fn test_brackets_do_not_restrict_lookup_to_methods() {
    // o.Name() reads the property, o.Secret() from inside the class calls the method
    let person = Person::new("Ann");
    let mut args = no_args().with_zero_argument_brackets();
    let result = call(&Value::Nothing, &person, &["Name"], &mut args).unwrap();
    assert_eq!(result, Value::from("Ann"));

    let mut args = no_args().with_zero_argument_brackets();
    let result = call(&person, &person, &["Secret"], &mut args).unwrap();
    assert_eq!(result, Value::from("hidden"));
}

#[test]
fn test_wrong_arity_and_unknown_member() {
    let person = Person::new("Ann");
    let err = call(&Value::Nothing, &person, &["Greet"], &mut no_args()).unwrap_err();
    assert_eq!(err.number(), 450);
    let err = call(&Value::Nothing, &person, &["Missing"], &mut no_args()).unwrap_err();
    assert_eq!(err.number(), 438);
}

#[test]
fn test_private_members_need_same_class_context() {
    let person = Person::new("Ann");
    let err = call(&Value::Nothing, &person, &["Secret"], &mut no_args()).unwrap_err();
    assert_eq!(err.number(), 438);

    let context = Person::new("Self");
    let result = call(&context, &person, &["Secret"], &mut no_args()).unwrap();
    assert_eq!(result, Value::from("hidden"));
}

#[test]
fn test_value_targets() {
    let number = Value::Long(3);
    let err = call(&Value::Nothing, &number, &["Name"], &mut no_args()).unwrap_err();
    assert_eq!(err.number(), 424);

    let mut args = no_args().val(&Value::Long(0));
    let err = call(&Value::Nothing, &number, &[], &mut args).unwrap_err();
    assert_eq!(err.number(), 13);

    let mut args = no_args().with_zero_argument_brackets();
    let err = call(&Value::Nothing, &number, &[], &mut args).unwrap_err();
    assert_eq!(err.number(), 13);

    let err = call(&Value::Nothing, &Value::Nothing, &["Name"], &mut no_args()).unwrap_err();
    assert_eq!(err.number(), 91);
}

#[test]
fn test_arguments_are_evaluated_before_target_shape() {
    // the RefIfArray argument fails first, not the member access on a number
    let mut args = no_args().ref_if_array(&Value::Long(1), &[&Value::Long(0)]);
    let err = call(&Value::Nothing, &Value::Long(3), &["Name"], &mut args).unwrap_err();
    assert_eq!(err.number(), 13);
}

#[test]
fn test_array_index_access() {
    let array = Value::array(VbsArray::from_values(vec![
        Value::from("a"),
        Value::from("b"),
    ]));
    let mut args = no_args().val(&Value::Long(1));
    assert_eq!(
        call(&Value::Nothing, &array, &[], &mut args).unwrap(),
        Value::from("b")
    );

    set(
        Value::from("z"),
        &Value::Nothing,
        &array,
        None,
        &mut no_args().val(&Value::Double(0.5)),
    )
    .unwrap();
    let mut args = no_args().val(&Value::Long(0));
    assert_eq!(
        call(&Value::Nothing, &array, &[], &mut args).unwrap(),
        Value::from("z")
    );
}

#[test]
fn test_set_default_and_named_members() {
    let person = Person::new("Ann");
    set(
        Value::from("Bob"),
        &Value::Nothing,
        &person,
        Some("Name"),
        &mut no_args(),
    )
    .unwrap();
    assert_eq!(crate::convert::val(&person).unwrap(), Value::from("Bob"));

    // Name has no Property Set, so object assignment is not supported
    let err = set(
        Person::new("Other"),
        &Value::Nothing,
        &person,
        Some("Name"),
        &mut no_args(),
    )
    .unwrap_err();
    assert_eq!(err.number(), 450);
}

#[test]
fn test_set_on_value_target() {
    let err = set(
        Value::Long(1),
        &Value::Nothing,
        &Value::Long(3),
        Some("Name"),
        &mut no_args(),
    )
    .unwrap_err();
    assert_eq!(err.number(), 424);
}

#[test]
fn test_dispatch_objects() {
    let counter = Value::object(Counter::default());
    set(
        Value::Long(7),
        &Value::Nothing,
        &counter,
        Some("count"),
        &mut no_args(),
    )
    .unwrap();
    assert_eq!(
        call(&Value::Nothing, &counter, &["Count"], &mut no_args()).unwrap(),
        Value::Long(7)
    );
    assert_eq!(crate::convert::val(&counter).unwrap(), Value::Long(7));
    let err = call(&Value::Nothing, &counter, &["Reset"], &mut no_args()).unwrap_err();
    assert_eq!(err.number(), 438);
}
