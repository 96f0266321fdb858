//! Member access and parameterized operations: methods, constructors and
//! indexers.

mod common;

use common::{Fixture, ints};
use flexpr::prelude::*;

#[test]
fn member_access() {
    let f = Fixture::new();
    let stuff = f.new_stuff("name", 17);

    let lambda = f
        .expression(DataType::String)
        .constant(stuff.clone())
        .and_then(|s| s.property("SomeString"))
        .and_then(|s| s.end_statement())
        .and_then(|s| s.complete_lambda())
        .unwrap();
    assert_eq!(f.run(&lambda), Ok(Value::string("name")));

    let lambda = f
        .expression(DataType::Int32)
        .constant(stuff)
        .and_then(|s| s.field("SomeInt"))
        .and_then(|s| s.end_statement())
        .and_then(|s| s.complete_lambda())
        .unwrap();
    assert_eq!(f.run(&lambda), Ok(Value::Int32(17)));
}

#[test]
fn builtin_members_of_primitives() {
    let f = Fixture::new();
    let lambda = f
        .expression(DataType::Int32)
        .constant("four")
        .and_then(|s| s.property("Length"))
        .and_then(|s| s.end_statement())
        .and_then(|s| s.complete_lambda())
        .unwrap();
    assert_eq!(f.run(&lambda), Ok(Value::Int32(4)));
}

#[test]
fn method_calls() {
    let f = Fixture::new();
    let stuff = f.new_stuff("name", 0);

    let lambda = (|| {
        f.expression(DataType::Int32)
            .constant(stuff.clone())?
            .call_no_args("SomeMethod")?
            .end_statement()?
            .complete_lambda()
    })()
    .unwrap();
    assert_eq!(f.run(&lambda), Ok(Value::Int32(42)));

    let lambda = (|| {
        f.expression(DataType::Int32)
            .constant(stuff.clone())?
            .call("SomeMethod", &[DataType::Int32])?
            .argument()?
            .constant(17)?
            .end_args()?
            .end_statement()?
            .complete_lambda()
    })()
    .unwrap();
    assert_eq!(f.run(&lambda), Ok(Value::Int32(17)));

    let lambda = (|| {
        f.expression(DataType::Int32)
            .constant(stuff.clone())?
            .call("SomeMethod", &[DataType::Int32, DataType::Int32])?
            .argument()?
            .constant(17)?
            .argument()?
            .constant(42)?
            .end_args()?
            .end_statement()?
            .complete_lambda()
    })()
    .unwrap();
    assert_eq!(
        lambda.body().to_string(),
        format!("object@{}.SomeMethod(17, 42)", TypeHash::from_name("Stuff"))
    );
    assert_eq!(f.run(&lambda), Ok(Value::Int32(59)));
}

#[test]
fn arguments_are_full_expressions() {
    let f = Fixture::new();
    let stuff = f.new_stuff("name", 0);

    // stuff.SomeMethod(1 + 2 * 3, stuff.SomeMethod() - 2) * 2
    let lambda = (|| {
        f.expression(DataType::Int32)
            .constant(stuff.clone())?
            .call("SomeMethod", &[DataType::Int32, DataType::Int32])?
            .argument()?
            .constant(1)?
            .add()?
            .constant(2)?
            .multiply()?
            .constant(3)?
            .argument()?
            .constant(stuff.clone())?
            .call_no_args("SomeMethod")?
            .subtract()?
            .constant(2)?
            .end_args()?
            .multiply()?
            .constant(2)?
            .end_statement()?
            .complete_lambda()
    })()
    .unwrap();
    assert_eq!(f.run(&lambda), Ok(Value::Int32((7 + 40) * 2)));
}

#[test]
fn call_binds_tighter_than_unary() {
    let f = Fixture::new();
    let stuff = f.new_stuff("name", 0);

    // -stuff.SomeMethod(5)
    let lambda = (|| {
        f.expression(DataType::Int32)
            .minus()?
            .constant(stuff.clone())?
            .call("SomeMethod", &[DataType::Int32])?
            .argument()?
            .constant(5)?
            .end_args()?
            .end_statement()?
            .complete_lambda()
    })()
    .unwrap();
    assert_eq!(f.run(&lambda), Ok(Value::Int32(-5)));
}

#[test]
fn interface_method_calls() {
    let f = Fixture::new();
    let signature = Signature::action(vec![f.ilist]);

    let lambda = (|| {
        f.lambda(&signature, &["sequence"])?
            .var("sequence")?
            .call_no_args("Clear")?
            .end_statement()?
            .var("sequence")?
            .call("Add", &[DataType::Int32])?
            .argument()?
            .constant(42)?
            .end_args()?
            .end_statement()?
            .complete_lambda()
    })()
    .unwrap();

    let list = f.new_list();
    list.push_element(Value::Int32(17));
    f.interpreter()
        .invoke(&lambda, &[Value::Object(list.clone())])
        .unwrap();
    assert_eq!(ints(&list), vec![42]);
}

#[test]
fn static_method_calls() {
    let f = Fixture::new();
    let lambda = (|| {
        f.expression(DataType::Int32)
            .call_static(f.stuff, "Parse", &[DataType::String])?
            .argument()?
            .constant("123")?
            .end_args()?
            .add()?
            .constant(1)?
            .end_statement()?
            .complete_lambda()
    })()
    .unwrap();
    assert_eq!(f.run(&lambda), Ok(Value::Int32(124)));
}

#[test]
fn constructors() {
    let f = Fixture::new();

    let lambda = (|| {
        f.expression(DataType::String)
            .new_no_args(f.stuff)?
            .property("SomeString")?
            .end_statement()?
            .complete_lambda()
    })()
    .unwrap();
    assert_eq!(f.run(&lambda), Ok(Value::string("default")));

    let lambda = (|| {
        f.expression(DataType::String)
            .new_object(f.stuff, &[DataType::String])?
            .argument()?
            .constant("name")?
            .end_args()?
            .property("SomeString")?
            .end_statement()?
            .complete_lambda()
    })()
    .unwrap();
    assert_eq!(f.run(&lambda), Ok(Value::string("name")));
}

#[test]
fn interfaces_have_no_constructors() {
    let f = Fixture::new();
    let err = f.expression(f.ilist).new_no_args(f.ilist).err().unwrap();
    assert!(matches!(err, BuildError::MemberNotFound { .. }), "{err}");
}

#[test]
fn indexers() {
    let f = Fixture::new();
    let stuff = f.new_stuff("name", 0);

    let lambda = (|| {
        f.expression(DataType::Int32)
            .constant(stuff.clone())?
            .index_by(&[DataType::Int32])?
            .argument()?
            .constant(42)?
            .end_args()?
            .end_statement()?
            .complete_lambda()
    })()
    .unwrap();
    assert_eq!(f.run(&lambda), Ok(Value::Int32(42)));

    let lambda = (|| {
        f.expression(DataType::Int32)
            .constant(stuff.clone())?
            .index_by(&[DataType::String])?
            .argument()?
            .constant("name")?
            .end_args()?
            .end_statement()?
            .complete_lambda()
    })()
    .unwrap();
    assert_eq!(f.run(&lambda), Ok(Value::Int32(4)));

    let lambda = (|| {
        f.expression(DataType::Int32)
            .constant(stuff.clone())?
            .index_by(&[DataType::Int32, DataType::String])?
            .argument()?
            .constant(42)?
            .argument()?
            .constant("name")?
            .end_args()?
            .end_statement()?
            .complete_lambda()
    })()
    .unwrap();
    assert_eq!(f.run(&lambda), Ok(Value::Int32(46)));

    let err = f
        .expression(DataType::Int32)
        .constant(stuff)
        .and_then(|s| s.index_by(&[DataType::String, DataType::Int32]))
        .err()
        .unwrap();
    assert!(matches!(err, BuildError::MemberNotFound { .. }), "{err}");
}

#[test]
fn chained_member_access() {
    let f = Fixture::new();

    // new Stuff("abc").SomeString.Length
    let lambda = (|| {
        f.expression(DataType::Int32)
            .new_object(f.stuff, &[DataType::String])?
            .argument()?
            .constant("abc")?
            .end_args()?
            .property("SomeString")?
            .property("Length")?
            .end_statement()?
            .complete_lambda()
    })()
    .unwrap();
    assert_eq!(f.run(&lambda), Ok(Value::Int32(3)));
}

#[test]
fn member_access_on_null_fails_at_evaluation() {
    let f = Fixture::new();
    let lambda = f
        .expression(DataType::Int32)
        .null_of(f.stuff)
        .and_then(|s| s.field("SomeInt"))
        .and_then(|s| s.end_statement())
        .and_then(|s| s.complete_lambda())
        .unwrap();
    assert_eq!(
        f.run(&lambda),
        Err(RuntimeError::NullReference {
            member: "SomeInt".into()
        })
    );
}

#[test]
fn argument_types_are_checked() {
    let f = Fixture::new();
    let stuff = f.new_stuff("name", 0);

    let err = (|| {
        f.expression(DataType::Int32)
            .constant(stuff.clone())?
            .call("SomeMethod", &[DataType::Int32])?
            .argument()?
            .constant("seventeen")?
            .end_args()
    })()
    .err()
    .unwrap();
    assert!(matches!(err, BuildError::TypeMismatch { .. }), "{err}");
}

#[test]
fn unknown_members_fail() {
    let f = Fixture::new();
    let stuff = f.new_stuff("name", 0);

    let err = f
        .expression(DataType::Int32)
        .constant(stuff.clone())
        .and_then(|s| s.call("SomeMethod", &[DataType::String]))
        .err()
        .unwrap();
    assert_eq!(
        err.to_string(),
        "no method 'SomeMethod(string)' found on type 'Stuff'"
    );

    let err = f
        .expression(DataType::Int32)
        .constant(stuff)
        .and_then(|s| s.field("Missing"))
        .err()
        .unwrap();
    assert!(matches!(err, BuildError::MemberNotFound { .. }), "{err}");
}
