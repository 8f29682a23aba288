//! Requirement propagation through invocations, object creation, member
//! writes, and contract declarations.

mod common;

use common::{loc, Fixture};
use serguard_analysis::findings::{FindingKind, Rule};
use serguard_analysis::propagation::{
    check_method_declaration, Expression, Invocation, MemberAssignment, ObjectCreation, Operation,
    PropagationEngine, SiteContext,
};
use serguard_core::model::{Annotation, Origin, TypeKind};
use serguard_core::{SymbolId, TypeId};

fn call(method: SymbolId, arguments: Vec<Expression>, line: u32) -> Operation {
    Invocation {
        location: loc(line),
        method,
        receiver_type: None,
        type_arguments: Vec::new(),
        arguments,
        context: SiteContext::default(),
    }
    .into()
}

fn generic_call(method: SymbolId, type_arguments: Vec<TypeId>, context: SiteContext, line: u32) -> Operation {
    Invocation {
        location: loc(line),
        method,
        receiver_type: None,
        type_arguments,
        arguments: Vec::new(),
        context,
    }
    .into()
}

#[test]
fn anonymous_object_is_reported_at_the_call() {
    let mut f = Fixture::new();
    let sink = f.sink();
    let anonymous = f.class("<>f__AnonymousType0", 30);
    let built = f.build();

    let op = call(sink, vec![Expression::Construction(anonymous)], 40);
    let findings = PropagationEngine::new(built.predicates()).check_operation(&op);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, Rule::UnsafeArgument);
    assert_eq!(findings[0].kind, FindingKind::MissingCertification);
    assert_eq!(findings[0].location, Some(loc(40)));
    assert_eq!(findings[0].subject, "<>f__AnonymousType0");
}

#[test]
fn bare_object_parameter_is_reported_at_its_declaration() {
    let mut f = Fixture::new();
    let sink = f.sink();
    let caller_type = f.class("Acme.Caller", 10);
    let forward = f.b.add_method(caller_type, "Forward");
    let value = f.param(forward, "value", f.k.object, 11);
    let built = f.build();

    let op = call(sink, vec![Expression::Reference(value)], 12);
    let findings = PropagationEngine::new(built.predicates()).check_operation(&op);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, Rule::UnannotatedDeclaration);
    assert_eq!(findings[0].kind, FindingKind::MissingAnnotation);
    assert_eq!(findings[0].location, Some(loc(11)));
    assert_eq!(findings[0].subject, "value");
    assert_eq!(findings[0].offending_type.as_deref(), Some("System.Object"));
}

#[test]
fn marked_parameter_forwards_the_requirement() {
    let mut f = Fixture::new();
    let sink = f.sink();
    let caller_type = f.class("Acme.Caller", 10);
    let forward = f.b.add_method(caller_type, "Forward");
    let value = f.param(forward, "value", f.k.object, 11);
    f.mark_symbol(value);
    let built = f.build();

    let op = call(sink, vec![Expression::Reference(value)], 12);
    assert!(PropagationEngine::new(built.predicates()).check_operation(&op).is_empty());
}

#[test]
fn pinned_marker_also_forwards_the_requirement() {
    let mut f = Fixture::new();
    let sink = f.sink();
    let caller_type = f.class("Acme.Caller", 10);
    let forward = f.b.add_method(caller_type, "Forward");
    let value = f.param(forward, "value", f.k.object, 11);
    f.b.annotate_symbol(value, Annotation::new(f.k.pinned));
    let built = f.build();

    let op = call(sink, vec![Expression::Reference(value)], 12);
    assert!(PropagationEngine::new(built.predicates()).check_operation(&op).is_empty());
}

#[test]
fn certified_and_exempt_arguments_pass() {
    let mut f = Fixture::new();
    let sink = f.sink();
    let payload = f.certified("Acme.Payload", 20);
    let payloads = f.list_of(payload);
    let names = f.dictionary_of(f.k.string, f.k.int32);
    let built = f.build().allow(&["System.Collections.Generic.Dictionary`2"]);
    let engine = PropagationEngine::new(built.predicates());

    for argument in [payload, payloads, names, built.k.int32, built.k.string] {
        let op = call(sink, vec![Expression::Construction(argument)], 50);
        assert!(
            engine.check_operation(&op).is_empty(),
            "{} should pass",
            built.model.type_name(argument)
        );
    }
}

#[test]
fn one_report_per_site_for_nested_unsafe_types() {
    let mut f = Fixture::new();
    let sink = f.sink();
    let loose = f.class("Acme.Loose", 20);
    let inner = f.list_of(loose);
    let nested = f.dictionary_of(f.k.object, inner);
    let built = f.build();

    let op = call(sink, vec![Expression::Construction(nested)], 60);
    let findings = PropagationEngine::new(built.predicates()).check_operation(&op);
    assert_eq!(findings.len(), 1, "{findings:?}");
    assert_eq!(findings[0].rule, Rule::UnsafeArgument);
}

#[test]
fn list_of_uncertified_names_the_element() {
    let mut f = Fixture::new();
    let sink = f.sink();
    let loose = f.class("Acme.Loose", 20);
    let loose_list = f.list_of(loose);
    let built = f.build();

    let op = call(sink, vec![Expression::Construction(loose_list)], 61);
    let findings = PropagationEngine::new(built.predicates()).check_operation(&op);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].subject, "Acme.Loose");
}

#[test]
fn unresolved_argument_is_reported_once() {
    let mut f = Fixture::new();
    let sink = f.sink();
    let built = f.build();

    let op = call(sink, vec![Expression::Opaque(None)], 70);
    let findings = PropagationEngine::new(built.predicates()).check_operation(&op);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, FindingKind::MissingCertification);
    assert_eq!(findings[0].location, Some(loc(70)));
}

#[test]
fn typeof_checks_the_named_type() {
    let mut f = Fixture::new();
    let sink = f.sink();
    let loose = f.class("Acme.Loose", 20);
    let payload = f.certified("Acme.Payload", 21);
    let built = f.build();
    let engine = PropagationEngine::new(built.predicates());

    let findings = engine.check_operation(&call(sink, vec![Expression::TypeOf(loose)], 22));
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, Rule::UnsafeArgument);
    assert_eq!(findings[0].location, Some(loc(22)));
    assert_eq!(findings[0].subject, "Acme.Loose");

    assert!(engine
        .check_operation(&call(sink, vec![Expression::TypeOf(payload)], 23))
        .is_empty());
}

#[test]
fn opaque_argument_of_ambient_type_parameter_is_reported_at_the_parameter() {
    let mut f = Fixture::new();
    let sink = f.sink();
    let host = f.class("Acme.Relay", 1);
    let relay = f.b.add_method(host, "Relay");
    let u = f.b.add_method_type_parameter(relay, "U").unwrap();
    f.b.set_type_location(u, loc(3));
    let built = f.build();

    let op: Operation = Invocation {
        location: loc(5),
        method: sink,
        receiver_type: None,
        type_arguments: Vec::new(),
        arguments: vec![Expression::Opaque(Some(u))],
        context: SiteContext::for_method(&built.model, relay),
    }
    .into();
    let findings = PropagationEngine::new(built.predicates()).check_operation(&op);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, Rule::UnannotatedTypeParameter);
    assert_eq!(findings[0].kind, FindingKind::MissingAnnotation);
    assert_eq!(findings[0].location, Some(loc(3)));
}

#[test]
fn opaque_argument_of_concrete_type_is_reported_at_the_call() {
    let mut f = Fixture::new();
    let sink = f.sink();
    let loose = f.class("Acme.Loose", 1);
    let built = f.build();

    let op = call(sink, vec![Expression::Opaque(Some(loose))], 8);
    let findings = PropagationEngine::new(built.predicates()).check_operation(&op);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, Rule::UnsafeArgument);
    assert_eq!(findings[0].location, Some(loc(8)));
    assert_eq!(findings[0].subject, "Acme.Loose");
}

#[test]
fn unmarked_ambient_type_parameter_is_reported_at_its_declaration() {
    let mut f = Fixture::new();
    let host = f.class("Acme.Store", 1);
    let load = f.b.add_method(host, "Load");
    let t = f.b.add_method_type_parameter(load, "T").unwrap();
    f.mark_type(t);

    let relay = f.b.add_method(host, "Relay");
    let u = f.b.add_method_type_parameter(relay, "U").unwrap();
    f.b.set_type_location(u, loc(5));
    let built = f.build();

    let context = SiteContext::for_method(&built.model, relay);
    let op = generic_call(load, vec![u], context, 6);
    let findings = PropagationEngine::new(built.predicates()).check_operation(&op);

    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, Rule::UnannotatedTypeParameter);
    assert_eq!(findings[0].location, Some(loc(5)));
    assert_eq!(findings[0].subject, "U");
}

#[test]
fn marked_ambient_type_parameter_passes() {
    let mut f = Fixture::new();
    let host = f.class("Acme.Store", 1);
    let load = f.b.add_method(host, "Load");
    let t = f.b.add_method_type_parameter(load, "T").unwrap();
    f.mark_type(t);
    let relay = f.b.add_method(host, "Relay");
    let u = f.b.add_method_type_parameter(relay, "U").unwrap();
    f.mark_type(u);
    let u_list = f.list_of(u);
    let built = f.build();

    let context = SiteContext::for_method(&built.model, relay);
    let op = generic_call(load, vec![u_list], context, 6);
    assert!(PropagationEngine::new(built.predicates()).check_operation(&op).is_empty());
}

#[test]
fn type_parameter_outside_the_caller_is_not_reported() {
    let mut f = Fixture::new();
    let host = f.class("Acme.Store", 1);
    let load = f.b.add_method(host, "Load");
    let t = f.b.add_method_type_parameter(load, "T").unwrap();
    f.mark_type(t);
    let other = f.b.add_method(host, "Other");
    let v = f.b.add_method_type_parameter(other, "V").unwrap();
    let built = f.build();

    let op = generic_call(load, vec![v], SiteContext::default(), 6);
    assert!(PropagationEngine::new(built.predicates()).check_operation(&op).is_empty());
}

#[test]
fn parameter_typed_by_unmarked_type_parameter_is_flagged_with_it() {
    let mut f = Fixture::new();
    let sink = f.sink();
    let host = f.class("Acme.Relay", 1);
    let relay = f.b.add_method(host, "Relay");
    let u = f.b.add_method_type_parameter(relay, "U").unwrap();
    f.b.set_type_location(u, loc(3));
    let item = f.param(relay, "item", u, 4);
    let built = f.build();

    let context = SiteContext::for_method(&built.model, relay);
    let op: Operation = Invocation {
        location: loc(5),
        method: sink,
        receiver_type: None,
        type_arguments: Vec::new(),
        arguments: vec![Expression::Reference(item)],
        context,
    }
    .into();
    let findings = PropagationEngine::new(built.predicates()).check_operation(&op);

    let rules: Vec<Rule> = findings.iter().map(|f| f.rule).collect();
    assert_eq!(rules, vec![Rule::UnannotatedTypeParameter, Rule::UnannotatedDeclaration]);
    assert_eq!(findings[1].location, Some(loc(4)));
}

#[test]
fn creating_a_wrapper_checks_its_marked_type_argument() {
    let mut f = Fixture::new();
    let wrapper = f.generic_class("Acme.Wrapper`1", &["T"], 1);
    let t = f.b.type_parameters(wrapper)[0];
    f.mark_type(t);
    let loose = f.class("Acme.Loose", 2);
    let payload = f.certified("Acme.Payload", 3);
    let bad = f.b.instantiate(wrapper, &[loose]).unwrap();
    let good = f.b.instantiate(wrapper, &[payload]).unwrap();
    let built = f.build();
    let engine = PropagationEngine::new(built.predicates());

    let create = |constructed, line| -> Operation {
        ObjectCreation {
            location: loc(line),
            constructed,
            constructor: None,
            arguments: Vec::new(),
            context: SiteContext::default(),
        }
        .into()
    };
    let findings = engine.check_operation(&create(bad, 10));
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].subject, "Acme.Loose");
    assert!(engine.check_operation(&create(good, 11)).is_empty());
}

#[test]
fn calling_through_a_wrapper_checks_the_receiver_type_argument() {
    let mut f = Fixture::new();
    let wrapper = f.generic_class("Acme.Wrapper`1", &["T"], 1);
    let t = f.b.type_parameters(wrapper)[0];
    f.mark_type(t);
    let put = f.b.add_method(wrapper, "Put");
    let loose = f.class("Acme.Loose", 2);
    let payload = f.certified("Acme.Payload", 3);
    let bad = f.b.instantiate(wrapper, &[loose]).unwrap();
    let good = f.b.instantiate(wrapper, &[payload]).unwrap();
    let built = f.build();
    let engine = PropagationEngine::new(built.predicates());

    let through = |receiver, line| -> Operation {
        Invocation {
            location: loc(line),
            method: put,
            receiver_type: Some(receiver),
            type_arguments: Vec::new(),
            arguments: Vec::new(),
            context: SiteContext::default(),
        }
        .into()
    };
    let findings = engine.check_operation(&through(bad, 10));
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, Rule::UnsafeArgument);
    assert_eq!(findings[0].location, Some(loc(10)));
    assert_eq!(findings[0].subject, "Acme.Loose");
    assert!(engine.check_operation(&through(good, 11)).is_empty());
}

#[test]
fn constructor_parameters_are_checked_on_creation() {
    let mut f = Fixture::new();
    let envelope = f.class("Acme.Envelope", 1);
    let ctor = f.b.add_constructor(envelope);
    let body = f.param(ctor, "body", f.k.object, 2);
    f.mark_symbol(body);
    let loose = f.class("Acme.Loose", 3);
    let built = f.build();

    let op: Operation = ObjectCreation {
        location: loc(9),
        constructed: envelope,
        constructor: Some(ctor),
        arguments: vec![Expression::Construction(loose)],
        context: SiteContext::default(),
    }
    .into();
    let findings = PropagationEngine::new(built.predicates()).check_operation(&op);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].location, Some(loc(9)));
}

#[test]
fn writing_a_marked_member_redirects_to_the_local() {
    let mut f = Fixture::new();
    let wrapper = f.generic_class("Acme.Wrapper`1", &["T"], 1);
    let t = f.b.type_parameters(wrapper)[0];
    f.mark_type(t);
    let value = f.b.add_property(wrapper, "Value", t, false);

    let host = f.class("Acme.Filler", 5);
    let fill = f.b.add_method(host, "Fill");
    let tmp = f.b.add_local(fill, "tmp", f.k.object).unwrap();
    f.b.set_symbol_location(tmp, loc(7));
    let built = f.build();

    let op: Operation = MemberAssignment {
        location: loc(8),
        member: value,
        value: Expression::Reference(tmp),
        context: SiteContext::for_method(&built.model, fill),
    }
    .into();
    let findings = PropagationEngine::new(built.predicates()).check_operation(&op);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, Rule::UnannotatedDeclaration);
    assert_eq!(findings[0].location, Some(loc(7)));
}

#[test]
fn writing_an_unmarked_member_is_not_a_site() {
    let mut f = Fixture::new();
    let holder = f.class("Acme.Holder", 1);
    let value = f.b.add_property(holder, "Value", f.k.object, false);
    let loose = f.class("Acme.Loose", 2);
    let built = f.build();

    let op: Operation = MemberAssignment {
        location: loc(3),
        member: value,
        value: Expression::Construction(loose),
        context: SiteContext::default(),
    }
    .into();
    assert!(op.sites(&built.model, &built.policy).is_empty());
}

fn contract_fixture(contract_origin: Origin) -> (common::Built, SymbolId) {
    let mut f = Fixture::new();
    let contract = f
        .b
        .declare_type("Acme.IHandler", TypeKind::Interface, contract_origin)
        .unwrap();
    let handle = f.b.add_method(contract, "Handle");
    f.param(handle, "message", f.k.object, 2);

    let handler = f.class("Acme.Handler", 10);
    let implementation = f.b.add_method(handler, "Handle");
    let message = f.param(implementation, "message", f.k.object, 11);
    f.mark_symbol(message);
    f.b.add_implemented(implementation, handle).unwrap();
    (f.build(), implementation)
}

#[test]
fn contract_in_source_is_reported_at_the_contract() {
    let (built, implementation) = contract_fixture(Origin::Source);
    let findings = check_method_declaration(&built.model, &built.policy, implementation);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, Rule::ContractMissingAnnotation);
    assert_eq!(findings[0].kind, FindingKind::MissingAnnotation);
    assert_eq!(findings[0].location, Some(loc(2)));
}

#[test]
fn external_contract_is_reported_at_the_implementation() {
    let (built, implementation) = contract_fixture(Origin::Metadata);
    let findings = check_method_declaration(&built.model, &built.policy, implementation);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].location, Some(loc(11)));
}

#[test]
fn matching_contract_is_clean() {
    let mut f = Fixture::new();
    let base = f.class("Acme.BaseHandler", 1);
    let handle = f.b.add_method(base, "Handle");
    let t = f.b.add_method_type_parameter(handle, "T").unwrap();
    f.mark_type(t);
    let derived = f.class("Acme.Derived", 5);
    let over = f.b.add_method(derived, "Handle");
    let u = f.b.add_method_type_parameter(over, "T").unwrap();
    f.mark_type(u);
    f.b.set_overridden(over, handle).unwrap();
    let built = f.build();

    assert!(check_method_declaration(&built.model, &built.policy, over).is_empty());
}

#[test]
fn marked_method_type_parameter_over_unmarked_contract_is_reported() {
    let mut f = Fixture::new();
    let base = f.class("Acme.BaseHandler", 1);
    let handle = f.b.add_method(base, "Handle");
    let t = f.b.add_method_type_parameter(handle, "T").unwrap();
    f.b.set_type_location(t, loc(2));
    let derived = f.class("Acme.Derived", 5);
    let over = f.b.add_method(derived, "Handle");
    let u = f.b.add_method_type_parameter(over, "T").unwrap();
    f.b.set_type_location(u, loc(6));
    f.mark_type(u);
    f.b.set_overridden(over, handle).unwrap();
    let built = f.build();

    let findings = check_method_declaration(&built.model, &built.policy, over);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].rule, Rule::ContractMissingAnnotation);
    assert_eq!(findings[0].kind, FindingKind::MissingAnnotation);
    assert_eq!(findings[0].location, Some(loc(2)));
    assert_eq!(findings[0].subject, "T");
    assert_eq!(findings[0].member.as_deref(), Some("Handle"));
}
