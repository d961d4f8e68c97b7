use std::borrow::Cow;
use std::fmt;

/// Validated name from a class file
///
/// Names are cheap to clone when they are one of the built-in constants, since those borrow
/// static strings.
pub trait Name: Sized {
    fn as_str(&self) -> &str;

    /// Try to construct a name from a string
    fn from_string(name: String) -> Result<Self, String>;
}

macro_rules! validated_name {
    ($(#[$meta:meta])* $name:ident, $validate:path) => {
        $(#[$meta])*
        #[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd)]
        pub struct $name(Cow<'static, str>);

        impl $name {
            const fn borrowed(value: &'static str) -> $name {
                $name(Cow::Borrowed(value))
            }
        }

        impl Name for $name {
            fn as_str(&self) -> &str {
                &self.0
            }

            fn from_string(name: String) -> Result<Self, String> {
                $validate(&name)?;
                Ok($name(Cow::Owned(name)))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

validated_name!(
    /// Names of methods and fields
    ///
    /// See <https://docs.oracle.com/javase/specs/jvms/se16/html/jvms-4.html#jvms-4.2.2>
    UnqualifiedName,
    check_unqualified
);

validated_name!(
    /// Names of classes and interfaces, in internal form (eg. `java/lang/String`)
    ///
    /// See <https://docs.oracle.com/javase/specs/jvms/se16/html/jvms-4.html#jvms-4.2.1>
    BinaryName,
    check_binary
);

fn check_unqualified(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err(String::from("Unqualified name is empty"));
    }
    match name.chars().find(|c| matches!(c, '.' | ';' | '[' | '/')) {
        Some(c) => Err(format!("Unqualified name '{}' contains '{}'", name, c)),
        None => Ok(()),
    }
}

fn check_binary(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err(String::from("Binary name is empty"));
    }
    name.split('/').try_for_each(check_unqualified)
}

impl UnqualifiedName {
    /// Instance initialization method (the only method name allowed to have angle brackets)
    pub const INIT: Self = Self::borrowed("<init>");
}

impl BinaryName {
    pub const ARITHMETICEXCEPTION: Self = Self::borrowed("java/lang/ArithmeticException");
    pub const ARRAYLIST: Self = Self::borrowed("java/util/ArrayList");
    pub const CHARSEQUENCE: Self = Self::borrowed("java/lang/CharSequence");
    pub const CLASS: Self = Self::borrowed("java/lang/Class");
    pub const CLONEABLE: Self = Self::borrowed("java/lang/Cloneable");
    pub const COLLECTION: Self = Self::borrowed("java/util/Collection");
    pub const COMPARABLE: Self = Self::borrowed("java/lang/Comparable");
    pub const DOUBLE: Self = Self::borrowed("java/lang/Double");
    pub const ERROR: Self = Self::borrowed("java/lang/Error");
    pub const EXCEPTION: Self = Self::borrowed("java/lang/Exception");
    pub const FLOAT: Self = Self::borrowed("java/lang/Float");
    pub const HASHMAP: Self = Self::borrowed("java/util/HashMap");
    pub const ILLEGALARGUMENTEXCEPTION: Self =
        Self::borrowed("java/lang/IllegalArgumentException");
    pub const INTEGER: Self = Self::borrowed("java/lang/Integer");
    pub const LIST: Self = Self::borrowed("java/util/List");
    pub const LONG: Self = Self::borrowed("java/lang/Long");
    pub const MAP: Self = Self::borrowed("java/util/Map");
    pub const NUMBER: Self = Self::borrowed("java/lang/Number");
    pub const OBJECT: Self = Self::borrowed("java/lang/Object");
    pub const RUNTIMEEXCEPTION: Self = Self::borrowed("java/lang/RuntimeException");
    pub const SERIALIZABLE: Self = Self::borrowed("java/io/Serializable");
    pub const STRING: Self = Self::borrowed("java/lang/String");
    pub const STRINGBUILDER: Self = Self::borrowed("java/lang/StringBuilder");
    pub const THROWABLE: Self = Self::borrowed("java/lang/Throwable");
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn binary_names() {
        let point = BinaryName::from_string(String::from("me/alec/Point")).unwrap();
        assert_eq!(point.as_str(), "me/alec/Point");
        assert_eq!(format!("{} {:?}", point, point), "me/alec/Point me/alec/Point");
        assert!(BinaryName::from_string(String::from("")).is_err());
        assert!(BinaryName::from_string(String::from("me//Point")).is_err());
        assert_eq!(
            BinaryName::from_string(String::from("me/al;ec")),
            Err(String::from("Unqualified name 'al;ec' contains ';'"))
        );
    }

    #[test]
    fn unqualified_names() {
        assert!(UnqualifiedName::from_string(String::from("toString")).is_ok());
        assert!(UnqualifiedName::from_string(String::from("java/lang")).is_err());
        assert_eq!(UnqualifiedName::INIT.as_str(), "<init>");
        assert_eq!(
            UnqualifiedName::from_string(String::from("<init>")),
            Ok(UnqualifiedName::INIT)
        );
    }
}
