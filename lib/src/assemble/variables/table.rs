use super::{SlotAllocator, TypeReconciler, VariableRecord};
use crate::assemble::analysis::{Analysis, FrameAnalyzer, Value};
use crate::assemble::ast::{Code, Element, MethodDefinition, Unit, VariableReference};
use crate::assemble::{CompileErrorKind, MethodCompileError};
use crate::jvm::{BinaryName, FieldType, RefType};
use crate::util::Width;
use std::collections::HashMap;

/// How far along the binding passes a [`VariableTable`] is
///
/// Passes must run in this order, each exactly once (until the table is cleared).
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TableState {
    Empty,
    ReceiverBound,
    ParametersBound,
    SyntacticallyResolved,
    Refined,
}

impl Default for TableState {
    fn default() -> Self {
        TableState::Empty
    }
}

/// Local variable slots of one method, keyed both by slot and by name
///
/// The table is built up by a fixed sequence of passes (see [`VariableTable::resolve`]):
///
///   1. bind `this` to slot 0 for instance methods
///   2. bind parameters to the following slots, in declaration order
///   3. walk the instructions, giving new names the next free slot and checking that every other
///      usage agrees with the type the variable was last used with
///   4. replace the coarse `java/lang/Object` type of reference variables with the type the
///      data-flow analysis finds at each usage
///
/// Records are stored in the order their slot was first committed. The slot and name lookups only
/// hold indices into that list.
#[derive(Clone, Debug, Default)]
pub struct VariableTable {
    records: Vec<VariableRecord>,
    by_slot: HashMap<usize, usize>,
    by_name: HashMap<String, usize>,
    allocator: SlotAllocator,
    state: TableState,
}

impl VariableTable {
    pub fn new() -> VariableTable {
        VariableTable::default()
    }

    /// Discard all records and slot bookkeeping
    pub fn clear(&mut self) {
        self.records.clear();
        self.by_slot.clear();
        self.by_name.clear();
        self.allocator.clear();
        self.state = TableState::Empty;
    }

    pub fn state(&self) -> TableState {
        self.state
    }

    /// Run every pass over a method, starting from an empty table
    ///
    /// The first error aborts the remaining passes. The table is left partially filled in that
    /// case and should be cleared before being reused.
    pub fn resolve(
        &mut self,
        unit: &Unit,
        analyzer: &dyn FrameAnalyzer,
    ) -> Result<(), MethodCompileError> {
        self.clear();
        self.visit_definition(&unit.owner, &unit.definition)?;
        self.visit_params(&unit.definition)?;
        self.visit_code(&unit.code)?;
        self.visit_object_references(unit, analyzer)?;
        log::debug!(
            "Resolved {} variables across {} slots in '{}'",
            self.records.len(),
            self.max_locals(),
            unit.definition.name
        );
        Ok(())
    }

    /// Bind the receiver of instance methods to slot 0
    pub fn visit_definition(
        &mut self,
        owner: &BinaryName,
        definition: &MethodDefinition,
    ) -> Result<(), MethodCompileError> {
        assert_eq!(self.state, TableState::Empty, "receiver bound twice");

        if !definition.is_static() {
            let this_type = FieldType::object(owner.clone());
            self.add_usage(0, "this", this_type, Element::Definition)?;
        }

        self.state = TableState::ReceiverBound;
        Ok(())
    }

    /// Bind the declared parameters to consecutive slots
    pub fn visit_params(&mut self, definition: &MethodDefinition) -> Result<(), MethodCompileError> {
        assert_eq!(
            self.state,
            TableState::ReceiverBound,
            "parameters must be bound right after the receiver"
        );

        for (index, parameter) in definition.parameters.iter().enumerate() {
            let slot = self.allocator.next_free_slot();
            let source = Element::Parameter(index);
            self.add_usage(slot, &parameter.name, parameter.descriptor.clone(), source)?;
        }
        log::debug!(
            "Bound {} parameters, next free slot is {}",
            definition.parameters.len(),
            self.allocator.next_free_slot()
        );

        self.state = TableState::ParametersBound;
        Ok(())
    }

    /// Resolve every variable referenced in the code, checking types along the way
    pub fn visit_code(&mut self, code: &Code) -> Result<(), MethodCompileError> {
        assert_eq!(
            self.state,
            TableState::ParametersBound,
            "code must be visited right after parameters are bound"
        );

        for (index, var_ref) in code.variable_references() {
            self.visit_variable_reference(Element::Instruction(index), &var_ref)?;
        }
        log::debug!(
            "Syntactic pass found {} variables using {} slots",
            self.records.len(),
            self.max_locals()
        );

        self.state = TableState::SyntacticallyResolved;
        Ok(())
    }

    fn visit_variable_reference(
        &mut self,
        source: Element,
        var_ref: &VariableReference,
    ) -> Result<(), MethodCompileError> {
        let identifier = var_ref.identifier;
        let record_index = match self.by_name.get(identifier) {
            Some(&record_index) => record_index,
            None => {
                let slot = self.allocator.next_free_slot();
                return self.add_usage(slot, identifier, var_ref.descriptor.clone(), source);
            }
        };

        let record = &self.records[record_index];
        let slot = record.slot();
        let existing = record.last_used_type();
        match TypeReconciler::reconcile(Some(existing), var_ref.operation, &var_ref.descriptor) {
            Ok(field_type) => self.add_usage(slot, identifier, field_type, source),
            Err(conflict) => {
                log::error!(
                    "'{}' at {} conflicts with slot {} ('{}'): {}",
                    var_ref.opcode,
                    source,
                    slot,
                    identifier,
                    conflict
                );
                Err(MethodCompileError {
                    element: source,
                    kind: CompileErrorKind::TypeConflict {
                        slot,
                        identifier: identifier.to_owned(),
                        conflict,
                    },
                })
            }
        }
    }

    /// Analyze the method and refine the types of reference variables
    pub fn visit_object_references(
        &mut self,
        unit: &Unit,
        analyzer: &dyn FrameAnalyzer,
    ) -> Result<(), MethodCompileError> {
        let analysis = analyzer.analyze(unit).map_err(|error| {
            log::error!("Analysis of '{}' failed: {}", unit.definition.name, error);
            MethodCompileError::from(error)
        })?;
        self.refine(&unit.code, &analysis)
    }

    /// Replace the types of reference variables with the ones found by data-flow analysis
    ///
    /// The first time a variable is touched here, its whole usage history is dropped: the types
    /// recorded by the syntactic pass were only ever placeholders. Primitive usages are skipped.
    pub fn refine(&mut self, code: &Code, analysis: &Analysis) -> Result<(), MethodCompileError> {
        assert_eq!(
            self.state,
            TableState::SyntacticallyResolved,
            "refinement needs the syntactic pass to have run"
        );

        let mut refined_usages = 0;
        for (index, var_ref) in code.variable_references() {
            if var_ref.descriptor.is_primitive() {
                continue;
            }

            let identifier = var_ref.identifier;
            let value = analysis
                .frame(index)
                .and_then(|frame| frame.local(identifier));
            let refined_type = FieldType::Ref(value.map_or(RefType::OBJECT, Value::variable_type));

            let slot = match self.by_name.get(identifier) {
                Some(&record_index) => self.records[record_index].slot(),
                None => self.allocator.next_free_slot(),
            };
            self.commit(slot, identifier, refined_type, Element::Instruction(index), true)?;
            refined_usages += 1;
        }
        log::debug!("Refined {} reference variable usages", refined_usages);

        self.state = TableState::Refined;
        Ok(())
    }

    /// Record a usage of a slot under a name
    ///
    /// The slot is committed in the allocator (failing if it is the tail of a wide value) and the
    /// name is (re)bound to it.
    pub fn add_usage(
        &mut self,
        slot: usize,
        identifier: &str,
        field_type: FieldType,
        source: Element,
    ) -> Result<(), MethodCompileError> {
        self.commit(slot, identifier, field_type, source, false)
    }

    fn commit(
        &mut self,
        slot: usize,
        identifier: &str,
        field_type: FieldType,
        source: Element,
        refining: bool,
    ) -> Result<(), MethodCompileError> {
        if let Err(conflict) = self.allocator.reserve(slot, field_type.width()) {
            log::error!("Cannot bind '{}' at {}: {}", identifier, source, conflict);
            return Err(MethodCompileError {
                element: source,
                kind: CompileErrorKind::AllocationConflict(conflict),
            });
        }

        let record_index = match self.by_slot.get(&slot) {
            Some(&record_index) => record_index,
            None => {
                self.records
                    .push(VariableRecord::new(slot, identifier.to_owned()));
                let record_index = self.records.len() - 1;
                self.by_slot.insert(slot, record_index);
                record_index
            }
        };

        let record = &mut self.records[record_index];
        if refining && !record.refined {
            record.refined = true;
            record.clear_usages();
        }
        log::trace!(
            "Slot {} used as '{}' with type {} by {}",
            slot,
            identifier,
            field_type,
            source
        );
        record.set_name(identifier);
        record.add_usage(source, field_type);

        match self.by_name.get_mut(identifier) {
            Some(bound) => *bound = record_index,
            None => {
                self.by_name.insert(identifier.to_owned(), record_index);
            }
        }
        Ok(())
    }

    /// Record in a slot
    pub fn get(&self, slot: usize) -> Option<&VariableRecord> {
        self.by_slot.get(&slot).map(|&index| &self.records[index])
    }

    /// Record a name was most recently bound to
    pub fn by_name(&self, identifier: &str) -> Option<&VariableRecord> {
        self.by_name.get(identifier).map(|&index| &self.records[index])
    }

    /// Slot a name was most recently bound to
    pub fn index_of(&self, identifier: &str) -> Option<usize> {
        self.by_name(identifier).map(VariableRecord::slot)
    }

    /// Number of local slots the method needs
    pub fn max_locals(&self) -> usize {
        self.allocator.next_free_slot()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in the order their slots were first committed
    pub fn in_appearance_order(&self) -> std::slice::Iter<'_, VariableRecord> {
        self.records.iter()
    }

    /// Records ordered by slot, then name
    pub fn in_sorted_order(&self) -> Vec<&VariableRecord> {
        let mut sorted: Vec<&VariableRecord> = self.records.iter().collect();
        sorted.sort();
        sorted
    }
}

/// Iterates in sorted order
impl<'a> IntoIterator for &'a VariableTable {
    type Item = &'a VariableRecord;
    type IntoIter = std::vec::IntoIter<&'a VariableRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.in_sorted_order().into_iter()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::assemble::analysis::{AnalysisErrorKind, Analyzer, Frame};
    use crate::assemble::ast::{
        Constant, Instruction, InvokeType, MethodParameter, MethodRef, VariableOperation,
    };
    use crate::assemble::variables::AllocationConflict;
    use crate::jvm::{BaseType, MethodAccessFlags, MethodDescriptor, Name, UnqualifiedName};

    fn owner() -> BinaryName {
        BinaryName::from_string(String::from("me/alec/Counter")).unwrap()
    }

    fn name(s: &str) -> String {
        String::from(s)
    }

    fn instance_method(parameters: Vec<MethodParameter>) -> MethodDefinition {
        MethodDefinition::new("count", MethodAccessFlags::PUBLIC, parameters, None)
    }

    fn static_method(parameters: Vec<MethodParameter>) -> MethodDefinition {
        MethodDefinition::new("count", MethodAccessFlags::STATIC, parameters, None)
    }

    /// Table with the receiver and parameters bound
    fn bound(definition: &MethodDefinition) -> VariableTable {
        let mut table = VariableTable::new();
        table.visit_definition(&owner(), definition).unwrap();
        table.visit_params(definition).unwrap();
        table
    }

    fn assert_consistent(table: &VariableTable) {
        for (identifier, &index) in &table.by_name {
            let record = &table.records[index];
            assert_eq!(table.get(record.slot()), Some(record), "{}", identifier);
        }
        for record in table.in_appearance_order() {
            assert_eq!(table.by_slot.get(&record.slot()).map(|&i| &table.records[i]), Some(record));
            assert!(table.by_name(record.name()).is_some(), "{}", record.name());
        }
    }

    #[test]
    fn receiver_and_parameters() {
        let definition = instance_method(vec![
            MethodParameter::new("total", FieldType::LONG),
            MethodParameter::new("label", FieldType::STRING),
            MethodParameter::new("ratio", FieldType::DOUBLE),
            MethodParameter::new("flag", FieldType::Base(BaseType::Boolean)),
        ]);
        let table = bound(&definition);

        assert_eq!(table.state(), TableState::ParametersBound);
        let this = table.get(0).unwrap();
        assert_eq!(this.name(), "this");
        assert_eq!(this.last_used_type(), &FieldType::object(owner()));
        assert_eq!(this.usage_sites(), vec![Element::Definition]);

        assert_eq!(table.index_of("total"), Some(1));
        assert_eq!(table.index_of("label"), Some(3));
        assert_eq!(table.index_of("ratio"), Some(4));
        assert_eq!(table.index_of("flag"), Some(6));
        assert_eq!(table.index_of("missing"), None);
        assert_eq!(table.max_locals(), 7);
        assert!(table.by_name("total").unwrap().is_wide());
        assert_eq!(
            table.by_name("label").unwrap().usage_sites(),
            vec![Element::Parameter(1)]
        );
        assert_consistent(&table);

        let table = bound(&static_method(vec![MethodParameter::new(
            "x",
            FieldType::INT,
        )]));
        assert_eq!(table.index_of("this"), None);
        assert_eq!(table.index_of("x"), Some(0));
        assert_eq!(table.max_locals(), 1);
    }

    #[test]
    fn wide_slots_reserve_their_tail() {
        let definition = static_method(vec![
            MethodParameter::new("a", FieldType::INT),
            MethodParameter::new("b", FieldType::DOUBLE),
        ]);
        let mut table = bound(&definition);

        let error = table
            .add_usage(2, "c", FieldType::INT, Element::Instruction(0))
            .unwrap_err();
        assert_eq!(error.element, Element::Instruction(0));
        assert_eq!(
            error.kind,
            CompileErrorKind::AllocationConflict(AllocationConflict::ReservedWideSlot { slot: 2 })
        );
        assert_eq!(table.get(2), None);

        table
            .add_usage(3, "c", FieldType::INT, Element::Instruction(1))
            .unwrap();
        assert_eq!(table.index_of("c"), Some(3));
        assert_consistent(&table);
    }

    #[test]
    fn new_names_get_the_next_free_slot() {
        let mut table = bound(&instance_method(vec![]));
        let code = Code::new(vec![
            Instruction::LConst(0),
            Instruction::LStore(name("sum")),
            Instruction::IConst(0),
            Instruction::IStore(name("i")),
            Instruction::IInc(name("i"), 1),
            Instruction::ILoad(name("i")),
            Instruction::Return,
        ]);
        table.visit_code(&code).unwrap();

        assert_eq!(table.index_of("sum"), Some(1));
        assert_eq!(table.index_of("i"), Some(3));
        assert_eq!(table.max_locals(), 4);
        assert_eq!(
            table.by_name("i").unwrap().usage_sites(),
            vec![
                Element::Instruction(3),
                Element::Instruction(4),
                Element::Instruction(5)
            ]
        );
        assert_consistent(&table);
    }

    #[test]
    fn reads_within_a_category() {
        let mut table = bound(&static_method(vec![]));
        let iload = Instruction::ILoad(name("n"));
        table
            .visit_variable_reference(Element::Instruction(0), &iload.variable_reference().unwrap())
            .unwrap();

        let short_read = VariableReference {
            identifier: "n",
            descriptor: FieldType::Base(BaseType::Short),
            operation: VariableOperation::Read,
            opcode: "iload",
        };
        table
            .visit_variable_reference(Element::Instruction(1), &short_read)
            .unwrap();
        assert_eq!(
            table.by_name("n").unwrap().last_used_type(),
            &FieldType::Base(BaseType::Short)
        );

        let aload = Instruction::ALoad(name("n"));
        let error = table
            .visit_variable_reference(Element::Instruction(2), &aload.variable_reference().unwrap())
            .unwrap_err();
        assert_eq!(error.element, Element::Instruction(2));
        match error.kind {
            CompileErrorKind::TypeConflict {
                slot,
                identifier,
                conflict,
            } => {
                assert_eq!(slot, 0);
                assert_eq!(identifier, "n");
                assert_eq!(conflict.existing, FieldType::Base(BaseType::Short));
                assert_eq!(conflict.incoming, FieldType::OBJECT);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn updates_need_an_int() {
        let definition = static_method(vec![
            MethodParameter::new("wide", FieldType::LONG),
            MethodParameter::new("narrow", FieldType::INT),
        ]);

        let mut table = bound(&definition);
        let code = Code::new(vec![Instruction::IInc(name("narrow"), -1), Instruction::Return]);
        assert!(table.visit_code(&code).is_ok());
        assert_eq!(table.by_name("narrow").unwrap().usages().len(), 2);

        let mut table = bound(&definition);
        let code = Code::new(vec![Instruction::IInc(name("wide"), 1), Instruction::Return]);
        let error = table.visit_code(&code).unwrap_err();
        assert!(matches!(
            error.kind,
            CompileErrorKind::TypeConflict { slot: 0, .. }
        ));
    }

    #[test]
    fn assignments_start_a_new_scope() {
        let mut table = bound(&static_method(vec![]));
        let code = Code::new(vec![
            Instruction::IConst(1),
            Instruction::IStore(name("v")),
            Instruction::AConstNull,
            Instruction::AStore(name("v")),
            Instruction::ALoad(name("v")),
            Instruction::AReturn,
        ]);
        table.visit_code(&code).unwrap();

        let record = table.by_name("v").unwrap();
        assert_eq!(record.slot(), 0);
        assert_eq!(
            record.observed_types().cloned().collect::<Vec<_>>(),
            vec![FieldType::INT, FieldType::OBJECT, FieldType::OBJECT]
        );
    }

    #[test]
    fn refinement_replaces_placeholder_types() {
        let definition = static_method(vec![
            MethodParameter::new("a", FieldType::INT),
            MethodParameter::new("b", FieldType::LONG),
        ]);
        let unit = Unit::new(
            owner(),
            definition,
            Code::new(vec![
                Instruction::Ldc(Constant::String(name("hello"))),
                Instruction::AStore(name("s")),
                Instruction::ALoad(name("s")),
                Instruction::ALoad(name("s")),
                Instruction::Pop,
                Instruction::Pop,
                Instruction::ILoad(name("a")),
                Instruction::Pop,
                Instruction::Return,
            ]),
        );

        let mut table = VariableTable::new();
        table.visit_definition(&unit.owner, &unit.definition).unwrap();
        table.visit_params(&unit.definition).unwrap();
        table.visit_code(&unit.code).unwrap();
        let s = table.get(3).unwrap();
        assert_eq!(s.name(), "s");
        assert_eq!(s.observed_types().filter(|t| **t == FieldType::OBJECT).count(), 3);

        table
            .visit_object_references(&unit, &Analyzer::new())
            .unwrap();
        assert_eq!(table.state(), TableState::Refined);

        let s = table.get(3).unwrap();
        assert_eq!(
            s.observed_types().cloned().collect::<Vec<_>>(),
            vec![FieldType::STRING; 3]
        );
        assert_eq!(
            s.usage_sites(),
            vec![
                Element::Instruction(1),
                Element::Instruction(2),
                Element::Instruction(3)
            ]
        );

        // Primitives are left alone
        let a = table.by_name("a").unwrap();
        assert_eq!(
            a.usage_sites(),
            vec![Element::Parameter(0), Element::Instruction(6)]
        );
        assert_consistent(&table);
    }

    #[test]
    fn refinement_of_receiver_and_unknown_names() {
        let definition = instance_method(vec![]);
        let mut table = bound(&definition);
        let syntactic = Code::new(vec![Instruction::ALoad(name("this")), Instruction::AReturn]);
        table.visit_code(&syntactic).unwrap();

        let refined_code = Code::new(vec![
            Instruction::ALoad(name("this")),
            Instruction::AStore(name("copy")),
            Instruction::Return,
        ]);
        let mut after_load = Frame::new();
        after_load.set_local("this", Value::Object(RefType::Object(owner())));
        let mut after_store = after_load.clone();
        after_store.set_local("copy", Value::ClassConstant(RefType::STRING));
        let analysis = Analysis::new(vec![Some(after_load), Some(after_store), None]);

        table.refine(&refined_code, &analysis).unwrap();

        let this = table.get(0).unwrap();
        assert_eq!(this.usage_sites(), vec![Element::Instruction(0)]);
        assert_eq!(this.last_used_type(), &FieldType::object(owner()));

        let copy = table.by_name("copy").unwrap();
        assert_eq!(copy.slot(), 1);
        assert_eq!(copy.last_used_type(), &FieldType::CLASS);
        assert_eq!(table.max_locals(), 2);
    }

    #[test]
    fn refinement_without_frames_falls_back_to_object() {
        let mut table = bound(&static_method(vec![]));
        let code = Code::new(vec![
            Instruction::AConstNull,
            Instruction::AStore(name("o")),
            Instruction::Return,
        ]);
        table.visit_code(&code).unwrap();
        table.refine(&code, &Analysis::default()).unwrap();
        let o = table.by_name("o").unwrap();
        assert_eq!(
            o.observed_types().cloned().collect::<Vec<_>>(),
            vec![FieldType::OBJECT]
        );
    }

    fn init_of(class: BinaryName) -> Instruction {
        Instruction::Invoke(
            InvokeType::Special,
            MethodRef {
                owner: class,
                name: UnqualifiedName::INIT,
                descriptor: MethodDescriptor {
                    parameters: vec![],
                    return_type: None,
                },
            },
        )
    }

    #[test]
    fn constructor_receiver_keeps_owner_type() {
        let constructor = MethodDefinition::new("<init>", MethodAccessFlags::PUBLIC, vec![], None);
        let unit = Unit::new(
            owner(),
            constructor,
            Code::new(vec![
                Instruction::ALoad(name("this")),
                init_of(BinaryName::OBJECT),
                Instruction::Return,
            ]),
        );
        let mut table = VariableTable::new();
        table.resolve(&unit, &Analyzer::new()).unwrap();

        let this = table.get(0).unwrap();
        assert_eq!(this.name(), "this");
        assert_eq!(this.usage_sites(), vec![Element::Instruction(0)]);
        assert_eq!(this.last_used_type(), &FieldType::object(owner()));
    }

    #[test]
    fn new_values_refine_to_allocated_type() {
        let unit = Unit::new(
            owner(),
            static_method(vec![]),
            Code::new(vec![
                Instruction::New(BinaryName::STRINGBUILDER),
                Instruction::AStore(name("sb")),
                Instruction::ALoad(name("sb")),
                init_of(BinaryName::STRINGBUILDER),
                Instruction::Return,
            ]),
        );
        let mut table = VariableTable::new();
        table.resolve(&unit, &Analyzer::new()).unwrap();

        let sb = table.by_name("sb").unwrap();
        assert_eq!(sb.slot(), 0);
        assert_eq!(
            sb.observed_types().cloned().collect::<Vec<_>>(),
            vec![FieldType::object(BinaryName::STRINGBUILDER); 2]
        );
    }

    #[test]
    fn analysis_failures_are_reported() {
        let unit = Unit::new(
            owner(),
            static_method(vec![]),
            Code::new(vec![Instruction::Goto(name("missing"))]),
        );
        let mut table = VariableTable::new();
        let error = table.resolve(&unit, &Analyzer::new()).unwrap_err();
        assert_eq!(error.element, Element::Instruction(0));
        assert_eq!(
            error.kind,
            CompileErrorKind::AnalysisFailure(AnalysisErrorKind::UnknownLabel(name("missing")))
        );
        assert_eq!(table.state(), TableState::SyntacticallyResolved);
    }

    #[test]
    fn clearing_resets_everything() {
        let unit = Unit::new(
            owner(),
            instance_method(vec![MethodParameter::new("d", FieldType::DOUBLE)]),
            Code::new(vec![Instruction::ALoad(name("this")), Instruction::AReturn]),
        );
        let mut table = VariableTable::new();
        table.resolve(&unit, &Analyzer::new()).unwrap();
        table.add_usage(7, "extra", FieldType::INT, Element::Definition).unwrap();
        assert_eq!(table.max_locals(), 8);

        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.state(), TableState::Empty);
        assert_eq!(table.max_locals(), 0);

        table.resolve(&unit, &Analyzer::new()).unwrap();
        assert_eq!(table.get(0).unwrap().name(), "this");
        assert_eq!(table.index_of("d"), Some(1));
        assert_eq!(table.index_of("extra"), None);
        assert_eq!(table.max_locals(), 3);
    }

    #[test]
    fn ordering_views() {
        let mut table = bound(&static_method(vec![]));
        table.add_usage(5, "z", FieldType::INT, Element::Instruction(0)).unwrap();
        table.add_usage(1, "a", FieldType::INT, Element::Instruction(1)).unwrap();
        table.add_usage(3, "m", FieldType::LONG, Element::Instruction(2)).unwrap();

        let appearance: Vec<usize> = table.in_appearance_order().map(VariableRecord::slot).collect();
        assert_eq!(appearance, vec![5, 1, 3]);
        let sorted: Vec<usize> = table.in_sorted_order().into_iter().map(VariableRecord::slot).collect();
        assert_eq!(sorted, vec![1, 3, 5]);
        let iterated: Vec<&str> = (&table).into_iter().map(VariableRecord::name).collect();
        assert_eq!(iterated, vec!["a", "m", "z"]);

        // Committing below the high-water mark never moves the next free slot
        assert_eq!(table.max_locals(), 6);
    }

    #[test]
    fn rebinding_a_slot_keeps_both_names_resolvable() {
        let mut table = bound(&static_method(vec![MethodParameter::new("x", FieldType::INT)]));
        table.add_usage(0, "y", FieldType::FLOAT, Element::Instruction(0)).unwrap();
        let record = table.get(0).unwrap();
        assert_eq!(record.name(), "y");
        assert_eq!(table.index_of("x"), Some(0));
        assert_eq!(table.index_of("y"), Some(0));
        assert_eq!(table.len(), 1);
        assert_consistent(&table);
    }

    #[test]
    #[should_panic(expected = "refinement needs the syntactic pass to have run")]
    fn passes_run_in_order() {
        let mut table = bound(&static_method(vec![]));
        let _ = table.refine(&Code::default(), &Analysis::default());
    }
}
