use super::{BinaryName, ClassAccessFlags};
use std::collections::{HashMap, HashSet};

/// Class or interface known to the [`ClassGraph`]
#[derive(Clone, Debug)]
pub struct ClassData {
    pub name: BinaryName,
    pub superclass: Option<BinaryName>,
    pub interfaces: Vec<BinaryName>,
    pub access_flags: ClassAccessFlags,
}

impl ClassData {
    /// Regular class extending `superclass`
    pub fn new(
        name: BinaryName,
        superclass: BinaryName,
        access_flags: ClassAccessFlags,
    ) -> ClassData {
        ClassData {
            name,
            superclass: Some(superclass),
            interfaces: vec![],
            access_flags,
        }
    }

    /// Interface (the superclass of interfaces is always `java/lang/Object`)
    pub fn interface(name: BinaryName, superinterfaces: Vec<BinaryName>) -> ClassData {
        ClassData {
            name,
            superclass: Some(BinaryName::OBJECT),
            interfaces: superinterfaces,
            access_flags: ClassAccessFlags::PUBLIC
                | ClassAccessFlags::INTERFACE
                | ClassAccessFlags::ABSTRACT,
        }
    }

    pub fn with_interfaces(mut self, interfaces: Vec<BinaryName>) -> ClassData {
        self.interfaces = interfaces;
        self
    }

    pub fn is_interface(&self) -> bool {
        self.access_flags.is_interface()
    }
}

/// A class needed to answer an inheritance question is not in the graph
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("class '{0}' is not in the class graph")]
pub struct MissingClass(pub BinaryName);

/// Tracks the super type relationships between classes/interfaces
///
/// The assembler only ever needs two questions answered: is one class assignable to another, and
/// what is the most specific class two classes have in common. Both require walking up the
/// superclass (and possibly superinterface) edges, so every class along the way must be known.
#[derive(Debug, Default)]
pub struct ClassGraph {
    classes: HashMap<BinaryName, ClassData>,
}

impl ClassGraph {
    /// New empty graph
    pub fn new() -> Self {
        ClassGraph {
            classes: HashMap::new(),
        }
    }

    /// Add (or replace) a class in the graph
    pub fn add_class(&mut self, class: ClassData) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn get(&self, name: &BinaryName) -> Result<&ClassData, MissingClass> {
        self.classes
            .get(name)
            .ok_or_else(|| MissingClass(name.clone()))
    }

    /// Add the standard library types that show up most often in method bodies
    pub fn insert_java_library_types(&mut self) {
        let public = ClassAccessFlags::PUBLIC | ClassAccessFlags::SUPER;
        let public_final = public | ClassAccessFlags::FINAL;
        let public_abstract = public | ClassAccessFlags::ABSTRACT;

        self.add_class(ClassData {
            name: BinaryName::OBJECT,
            superclass: None,
            interfaces: vec![],
            access_flags: public,
        });

        // Interfaces
        self.add_class(ClassData::interface(BinaryName::SERIALIZABLE, vec![]));
        self.add_class(ClassData::interface(BinaryName::CLONEABLE, vec![]));
        self.add_class(ClassData::interface(BinaryName::COMPARABLE, vec![]));
        self.add_class(ClassData::interface(BinaryName::CHARSEQUENCE, vec![]));
        self.add_class(ClassData::interface(BinaryName::COLLECTION, vec![]));
        self.add_class(ClassData::interface(
            BinaryName::LIST,
            vec![BinaryName::COLLECTION],
        ));
        self.add_class(ClassData::interface(BinaryName::MAP, vec![]));

        // `java.lang`
        self.add_class(
            ClassData::new(BinaryName::STRING, BinaryName::OBJECT, public_final).with_interfaces(
                vec![
                    BinaryName::SERIALIZABLE,
                    BinaryName::COMPARABLE,
                    BinaryName::CHARSEQUENCE,
                ],
            ),
        );
        self.add_class(
            ClassData::new(BinaryName::STRINGBUILDER, BinaryName::OBJECT, public_final)
                .with_interfaces(vec![BinaryName::SERIALIZABLE, BinaryName::CHARSEQUENCE]),
        );
        self.add_class(
            ClassData::new(BinaryName::CLASS, BinaryName::OBJECT, public_final)
                .with_interfaces(vec![BinaryName::SERIALIZABLE]),
        );
        self.add_class(
            ClassData::new(BinaryName::NUMBER, BinaryName::OBJECT, public_abstract)
                .with_interfaces(vec![BinaryName::SERIALIZABLE]),
        );
        for boxed in [
            BinaryName::INTEGER,
            BinaryName::LONG,
            BinaryName::FLOAT,
            BinaryName::DOUBLE,
        ] {
            self.add_class(
                ClassData::new(boxed, BinaryName::NUMBER, public_final)
                    .with_interfaces(vec![BinaryName::COMPARABLE]),
            );
        }

        // Throwables
        self.add_class(
            ClassData::new(BinaryName::THROWABLE, BinaryName::OBJECT, public)
                .with_interfaces(vec![BinaryName::SERIALIZABLE]),
        );
        self.add_class(ClassData::new(
            BinaryName::ERROR,
            BinaryName::THROWABLE,
            public,
        ));
        self.add_class(ClassData::new(
            BinaryName::EXCEPTION,
            BinaryName::THROWABLE,
            public,
        ));
        self.add_class(ClassData::new(
            BinaryName::RUNTIMEEXCEPTION,
            BinaryName::EXCEPTION,
            public,
        ));
        self.add_class(ClassData::new(
            BinaryName::ARITHMETICEXCEPTION,
            BinaryName::RUNTIMEEXCEPTION,
            public,
        ));
        self.add_class(ClassData::new(
            BinaryName::ILLEGALARGUMENTEXCEPTION,
            BinaryName::RUNTIMEEXCEPTION,
            public,
        ));

        // `java.util`
        self.add_class(
            ClassData::new(BinaryName::ARRAYLIST, BinaryName::OBJECT, public).with_interfaces(
                vec![
                    BinaryName::LIST,
                    BinaryName::CLONEABLE,
                    BinaryName::SERIALIZABLE,
                ],
            ),
        );
        self.add_class(
            ClassData::new(BinaryName::HASHMAP, BinaryName::OBJECT, public).with_interfaces(vec![
                BinaryName::MAP,
                BinaryName::CLONEABLE,
                BinaryName::SERIALIZABLE,
            ]),
        );
    }

    /// Query if one class type is assignable to another
    ///
    /// This does a search up the superclasses and superinterfaces looking for the super type.
    pub fn is_assignable(
        &self,
        sub_type: &BinaryName,
        super_type: &BinaryName,
    ) -> Result<bool, MissingClass> {
        if sub_type == super_type || *super_type == BinaryName::OBJECT {
            return Ok(true);
        }

        // Optimization: if the super type is a class, then skip visiting interfaces
        let super_is_class: bool = !self.get(super_type)?.is_interface();

        let mut supertypes_to_visit: Vec<&BinaryName> = vec![sub_type];
        let mut dont_revisit: HashSet<&BinaryName> = HashSet::new();
        dont_revisit.insert(sub_type);

        while let Some(class_name) = supertypes_to_visit.pop() {
            if class_name == super_type {
                return Ok(true);
            }

            // Enqueue next types to visit
            let class_data = self.get(class_name)?;
            if let Some(superclass) = &class_data.superclass {
                if dont_revisit.insert(superclass) {
                    supertypes_to_visit.push(superclass);
                }
            }
            if !super_is_class {
                for interface in &class_data.interfaces {
                    if dont_revisit.insert(interface) {
                        supertypes_to_visit.push(interface);
                    }
                }
            }
        }

        Ok(false)
    }

    /// Most specific class that both types are assignable to
    ///
    /// Interfaces only have `java/lang/Object` as their common class with anything other than
    /// their own subtypes, the same way the JVM verifier treats them.
    pub fn common_superclass(
        &self,
        first: &BinaryName,
        second: &BinaryName,
    ) -> Result<BinaryName, MissingClass> {
        if self.is_assignable(first, second)? {
            return Ok(second.clone());
        }
        if self.is_assignable(second, first)? {
            return Ok(first.clone());
        }
        if self.get(first)?.is_interface() || self.get(second)?.is_interface() {
            return Ok(BinaryName::OBJECT);
        }

        let mut current = first;
        while let Some(superclass) = &self.get(current)?.superclass {
            if self.is_assignable(second, superclass)? {
                return Ok(superclass.clone());
            }
            current = superclass;
        }
        Ok(BinaryName::OBJECT)
    }
}
