use super::InheritanceChecker;
use crate::jvm::class_graph::MissingClass;
use crate::jvm::{BaseType, BinaryName, FieldType, RefType};
use crate::util::Width;

/// Abstract value of a local variable or stack entry
///
/// Besides the usual verification types, this tracks a bit more about references: string and
/// class literals are kept apart from other objects since they are the most common source of
/// precise types in assembler code.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Value {
    /// Nothing is known (eg. two incompatible values were merged)
    Top,

    Int,
    Float,
    Long,
    Double,
    Null,

    /// String literal loaded with `ldc`
    StringConstant(String),

    /// Class literal loaded with `ldc`
    ClassConstant(RefType),

    /// Object whose type is being tracked
    Object(RefType),

    /// Result of `new`, before the constructor has been called
    Uninitialized(BinaryName),

    /// `this` in a constructor of the given class, before the super constructor has been called
    UninitializedThis(BinaryName),
}

impl Width for Value {
    fn width(&self) -> usize {
        match self {
            Value::Long | Value::Double => 2,
            _ => 1,
        }
    }
}

impl From<&FieldType> for Value {
    fn from(field_type: &FieldType) -> Value {
        match field_type {
            FieldType::Base(BaseType::Int)
            | FieldType::Base(BaseType::Char)
            | FieldType::Base(BaseType::Short)
            | FieldType::Base(BaseType::Byte)
            | FieldType::Base(BaseType::Boolean) => Value::Int,
            FieldType::Base(BaseType::Float) => Value::Float,
            FieldType::Base(BaseType::Long) => Value::Long,
            FieldType::Base(BaseType::Double) => Value::Double,
            FieldType::Ref(ref_type) => Value::Object(ref_type.clone()),
        }
    }
}

impl Value {
    /// Is this type is a reference type?
    pub fn is_reference(&self) -> bool {
        match self {
            Value::Top | Value::Int | Value::Float | Value::Long | Value::Double => false,

            Value::Null
            | Value::StringConstant(_)
            | Value::ClassConstant(_)
            | Value::Object(_)
            | Value::Uninitialized(_)
            | Value::UninitializedThis(_) => true,
        }
    }

    /// Static type of an initialized, non-null reference
    pub fn reference_type(&self) -> Option<RefType> {
        match self {
            Value::StringConstant(_) => Some(RefType::STRING),
            Value::ClassConstant(_) => Some(RefType::CLASS),
            Value::Object(ref_type) => Some(ref_type.clone()),
            _ => None,
        }
    }

    /// Most precise reference type that can be given to a variable holding this value
    ///
    /// A variable holding an object that is not yet initialized still gets the class being
    /// constructed: it is the only type the variable can ever hold there.
    pub fn variable_type(&self) -> RefType {
        match self {
            Value::StringConstant(_) => RefType::STRING,
            Value::ClassConstant(_) => RefType::CLASS,
            Value::Object(ref_type) => ref_type.clone(),
            Value::Uninitialized(class) | Value::UninitializedThis(class) => {
                RefType::Object(class.clone())
            }
            Value::Top
            | Value::Int
            | Value::Float
            | Value::Long
            | Value::Double
            | Value::Null => RefType::OBJECT,
        }
    }

    /// Merge two values flowing into the same location
    pub fn merge(
        &self,
        other: &Value,
        inheritance: Option<&dyn InheritanceChecker>,
    ) -> Result<Value, MissingClass> {
        if self == other {
            return Ok(self.clone());
        }

        let merged = match (self, other) {
            (Value::Top, _) | (_, Value::Top) => Value::Top,
            (Value::Null, value) | (value, Value::Null) => match value.reference_type() {
                Some(ref_type) => Value::Object(ref_type),
                None => Value::Top,
            },
            (first, second) => match (first.reference_type(), second.reference_type()) {
                (Some(first), Some(second)) => {
                    Value::Object(merge_ref_types(first, second, inheritance)?)
                }
                _ => Value::Top,
            },
        };
        Ok(merged)
    }
}

fn merge_ref_types(
    first: RefType,
    second: RefType,
    inheritance: Option<&dyn InheritanceChecker>,
) -> Result<RefType, MissingClass> {
    if first == second {
        return Ok(first);
    }
    match (&first, &second, inheritance) {
        (RefType::Object(first), RefType::Object(second), Some(inheritance)) => Ok(
            RefType::Object(inheritance.common_type(first, second)?),
        ),
        _ => Ok(RefType::OBJECT),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::jvm::class_graph::ClassGraph;
    use crate::jvm::Name;

    #[test]
    fn merging_constants() {
        let hello = Value::StringConstant(String::from("hello"));
        let world = Value::StringConstant(String::from("world"));
        assert_eq!(hello.merge(&hello, None), Ok(hello.clone()));
        assert_eq!(hello.merge(&world, None), Ok(Value::Object(RefType::STRING)));
        assert_eq!(Value::Null.merge(&world, None), Ok(Value::Object(RefType::STRING)));
        assert_eq!(hello.merge(&Value::Int, None), Ok(Value::Top));
        assert_eq!(Value::Long.merge(&Value::Int, None), Ok(Value::Top));
    }

    #[test]
    fn merging_objects() {
        let mut graph = ClassGraph::new();
        graph.insert_java_library_types();

        let integer = Value::Object(RefType::Object(BinaryName::INTEGER));
        let long = Value::Object(RefType::Object(BinaryName::LONG));
        assert_eq!(
            integer.merge(&long, Some(&graph)),
            Ok(Value::Object(RefType::Object(BinaryName::NUMBER)))
        );
        assert_eq!(integer.merge(&long, None), Ok(Value::Object(RefType::OBJECT)));

        let unknown = BinaryName::from_string(String::from("me/alec/Unknown")).unwrap();
        let unknown_value = Value::Object(RefType::Object(unknown.clone()));
        assert_eq!(
            unknown_value.merge(&long, Some(&graph)),
            Err(MissingClass(unknown))
        );
    }

    #[test]
    fn variable_types() {
        let class_literal = Value::ClassConstant(RefType::STRING);
        assert_eq!(class_literal.variable_type(), RefType::CLASS);
        assert_eq!(
            Value::StringConstant(String::new()).variable_type(),
            RefType::STRING
        );
        assert_eq!(Value::Null.variable_type(), RefType::OBJECT);
        assert_eq!(
            Value::Uninitialized(BinaryName::STRINGBUILDER).variable_type(),
            RefType::Object(BinaryName::STRINGBUILDER)
        );
        assert_eq!(
            Value::UninitializedThis(BinaryName::EXCEPTION).variable_type(),
            RefType::Object(BinaryName::EXCEPTION)
        );
        assert_eq!(Value::Top.variable_type(), RefType::OBJECT);
    }

    #[test]
    fn uninitialized_values_do_not_merge() {
        let fresh = Value::Uninitialized(BinaryName::STRINGBUILDER);
        let this = Value::UninitializedThis(BinaryName::STRINGBUILDER);
        assert_eq!(fresh.reference_type(), None);
        assert_eq!(fresh.merge(&this, None), Ok(Value::Top));
        assert_eq!(this.merge(&this, None), Ok(this.clone()));
    }
}
