//! Shared fixtures for the integration tests.
//!
//! Registers a small host type system:
//! - `Stuff`: fields, a property with a default, overloaded methods,
//!   constructors, indexers and a static method
//! - `ICollection` / `IList`: abstract interfaces
//! - `List`: a class implementing `IList` over the object's element list

#![allow(dead_code)]

use flexpr::prelude::*;

pub struct Fixture {
    pub registry: TypeRegistry,
    pub stuff: DataType,
    pub collection: DataType,
    pub ilist: DataType,
    pub list: DataType,
}

impl Fixture {
    pub fn new() -> Self {
        let mut registry = TypeRegistry::with_builtins();

        let stuff_hash = TypeHash::from_name("Stuff");
        let stuff = registry
            .register(stuff_entry(stuff_hash))
            .expect("register Stuff");

        let collection = registry
            .register(
                TypeEntry::interface("ICollection")
                    .with_method(MethodEntry::new("Clear", vec![], DataType::Void))
                    .with_method(MethodEntry::new("Add", vec![DataType::Int32], DataType::Void)),
            )
            .expect("register ICollection");
        let ilist = registry
            .register(
                TypeEntry::interface("IList")
                    .with_interface(collection)
                    .with_method(MethodEntry::new("Get", vec![DataType::Int32], DataType::Int32)),
            )
            .expect("register IList");
        let list_hash = TypeHash::from_name("List");
        let list = registry
            .register(list_entry(list_hash, ilist))
            .expect("register List");

        Self {
            registry,
            stuff: DataType::Object(stuff),
            collection: DataType::Object(collection),
            ilist: DataType::Object(ilist),
            list: DataType::Object(list),
        }
    }

    pub fn expression(&self, return_type: DataType) -> StatementStarter<'_> {
        Flex::start_expression(&self.registry, return_type)
    }

    pub fn lambda(
        &self,
        signature: &Signature,
        names: &[&str],
    ) -> Result<StatementStarter<'_>, BuildError> {
        Flex::start_lambda(&self.registry, signature, names)
    }

    pub fn interpreter(&self) -> Interpreter<'_> {
        Interpreter::new(&self.registry)
    }

    /// Evaluate a parameterless lambda.
    pub fn run(&self, lambda: &Lambda) -> Result<Value, RuntimeError> {
        self.interpreter().invoke(lambda, &[])
    }

    /// A `Stuff` with the given field and property values.
    pub fn new_stuff(&self, some_string: &str, some_int: i32) -> ObjectRef {
        ScriptObject::with_fields(
            self.stuff_hash(),
            [
                ("SomeString", Value::string(some_string)),
                ("SomeInt", Value::Int32(some_int)),
            ],
        )
    }

    pub fn new_list(&self) -> ObjectRef {
        ScriptObject::new(TypeHash::from_name("List"))
    }

    fn stuff_hash(&self) -> TypeHash {
        TypeHash::from_name("Stuff")
    }
}

/// The integer elements of a list object.
pub fn ints(list: &ObjectRef) -> Vec<i32> {
    list.elements().iter().filter_map(Value::as_i32).collect()
}

fn this_object(this: &Value) -> Result<&ObjectRef, RuntimeError> {
    this.as_object()
        .ok_or_else(|| RuntimeError::native("receiver is not an object"))
}

fn int_arg(args: &[Value], index: usize) -> Result<i32, RuntimeError> {
    args.get(index)
        .and_then(Value::as_i32)
        .ok_or_else(|| RuntimeError::native(format!("argument {} is not an int", index)))
}

fn str_arg(args: &[Value], index: usize) -> Result<&str, RuntimeError> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| RuntimeError::native(format!("argument {} is not a string", index)))
}

fn stuff_entry(hash: TypeHash) -> TypeEntry {
    TypeEntry::class("Stuff")
        .with_field(FieldEntry::new("SomeInt", DataType::Int32))
        .with_field(FieldEntry::new("Id", DataType::Int32).read_only())
        .with_property(
            PropertyEntry::new("SomeString", DataType::String)
                .with_getter(NativeFn::new(|this, _| {
                    Ok(this_object(this)?
                        .field("SomeString")
                        .unwrap_or_else(|| Value::string("default")))
                }))
                .with_setter(NativeFn::new(|this, args| {
                    let value = args.first().cloned().unwrap_or(Value::Null);
                    this_object(this)?.set_field("SomeString", value);
                    Ok(Value::Void)
                })),
        )
        .with_property(
            PropertyEntry::new("Name", DataType::String)
                .with_getter(NativeFn::new(|_, _| Ok(Value::string("stuff")))),
        )
        .with_method(
            MethodEntry::new("SomeMethod", vec![], DataType::Int32)
                .with_native(NativeFn::new(|_, _| Ok(Value::Int32(42)))),
        )
        .with_method(
            MethodEntry::new("SomeMethod", vec![DataType::Int32], DataType::Int32)
                .with_native(NativeFn::new(|_, args| Ok(Value::Int32(int_arg(args, 0)?)))),
        )
        .with_method(
            MethodEntry::new(
                "SomeMethod",
                vec![DataType::Int32, DataType::Int32],
                DataType::Int32,
            )
            .with_native(NativeFn::new(|_, args| {
                Ok(Value::Int32(int_arg(args, 0)? + int_arg(args, 1)?))
            })),
        )
        .with_method(
            MethodEntry::new("Parse", vec![DataType::String], DataType::Int32)
                .static_method()
                .with_native(NativeFn::new(|_, args| {
                    str_arg(args, 0)?
                        .parse::<i32>()
                        .map(Value::Int32)
                        .map_err(|e| RuntimeError::native(e.to_string()))
                })),
        )
        .with_constructor(ConstructorEntry::new(
            vec![],
            NativeFn::new(move |_, _| Ok(Value::Object(ScriptObject::new(hash)))),
        ))
        .with_constructor(ConstructorEntry::new(
            vec![DataType::String],
            NativeFn::new(move |_, args| {
                let name = Value::string(str_arg(args, 0)?);
                Ok(Value::Object(ScriptObject::with_fields(
                    hash,
                    [("SomeString", name)],
                )))
            }),
        ))
        .with_indexer(
            IndexerEntry::new(vec![DataType::Int32], DataType::Int32)
                .with_getter(NativeFn::new(|_, args| Ok(Value::Int32(int_arg(args, 0)?)))),
        )
        .with_indexer(
            IndexerEntry::new(vec![DataType::String], DataType::Int32).with_getter(
                NativeFn::new(|_, args| Ok(Value::Int32(str_arg(args, 0)?.len() as i32))),
            ),
        )
        .with_indexer(
            IndexerEntry::new(vec![DataType::Int32, DataType::String], DataType::Int32)
                .with_getter(NativeFn::new(|_, args| {
                    Ok(Value::Int32(int_arg(args, 0)? + str_arg(args, 1)?.len() as i32))
                })),
        )
}

fn list_entry(hash: TypeHash, ilist: TypeHash) -> TypeEntry {
    TypeEntry::class("List")
        .with_interface(ilist)
        .with_method(
            MethodEntry::new("Clear", vec![], DataType::Void).with_native(NativeFn::new(
                |this, _| {
                    this_object(this)?.clear_elements();
                    Ok(Value::Void)
                },
            )),
        )
        .with_method(
            MethodEntry::new("Add", vec![DataType::Int32], DataType::Void).with_native(
                NativeFn::new(|this, args| {
                    this_object(this)?.push_element(Value::Int32(int_arg(args, 0)?));
                    Ok(Value::Void)
                }),
            ),
        )
        .with_method(
            MethodEntry::new("Get", vec![DataType::Int32], DataType::Int32).with_native(
                NativeFn::new(|this, args| {
                    let index = int_arg(args, 0)?;
                    this_object(this)?
                        .element(index as usize)
                        .ok_or_else(|| RuntimeError::native(format!("index {} out of range", index)))
                }),
            ),
        )
        .with_property(
            PropertyEntry::new("Count", DataType::Int32).with_getter(NativeFn::new(|this, _| {
                Ok(Value::Int32(this_object(this)?.len() as i32))
            })),
        )
        .with_indexer(
            IndexerEntry::new(vec![DataType::Int32], DataType::Int32)
                .with_getter(NativeFn::new(|this, args| {
                    let index = int_arg(args, 0)?;
                    this_object(this)?
                        .element(index as usize)
                        .ok_or_else(|| RuntimeError::native(format!("index {} out of range", index)))
                }))
                .with_setter(NativeFn::new(|this, args| {
                    let list = this_object(this)?;
                    let index = int_arg(args, 0)? as usize;
                    let mut elements = list.elements();
                    if index >= elements.len() {
                        return Err(RuntimeError::native(format!("index {} out of range", index)));
                    }
                    elements[index] = args.get(1).cloned().unwrap_or(Value::Null);
                    list.clear_elements();
                    for element in elements {
                        list.push_element(element);
                    }
                    Ok(Value::Void)
                })),
        )
        .with_constructor(ConstructorEntry::new(
            vec![],
            NativeFn::new(move |_, _| Ok(Value::Object(ScriptObject::new(hash)))),
        ))
}
