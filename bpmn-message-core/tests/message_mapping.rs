use bpmn_message_core::model::{
    IntermediateCatchEvent, IntermediateThrowEvent, MemoryInstance, MemoryToken,
};
use bpmn_message_core::{
    Assignment, BufferPolicy, DataAssociation, DataStore, ExecutionInstance, Expression, ItemRef,
    MappingPolicy, MappingStage, MessageEventDefinition,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn instance_with(id: &str, data: Value) -> Arc<MemoryInstance> {
    let store = match data {
        Value::Object(map) => DataStore::with_data(map),
        _ => DataStore::new(),
    };
    Arc::new(MemoryInstance::with_store(id, store))
}

fn copy(source: &str, target: &str) -> DataAssociation {
    DataAssociation::input()
        .with_source(ItemRef::named(source))
        .with_target(ItemRef::named(target))
}

fn read(instance: &MemoryInstance, path: &str) -> Option<Value> {
    let store = instance.data_store();
    let store = store.read().unwrap();
    store.lookup_dot(path).cloned()
}

#[test]
fn test_end_to_end_direct_copy() {
    init_tracing();
    let sender = instance_with("sender", json!({"amount": 100}));
    let receiver = instance_with("receiver", json!({}));

    let throw = Arc::new(
        IntermediateThrowEvent::new("throw").with_data_input_association(copy("amount", "total")),
    );
    let token = MemoryToken::new(throw).with_instance(sender.clone());
    let catch = IntermediateCatchEvent::new("catch");
    let definition = MessageEventDefinition::new("msg");

    definition
        .execute(&definition, &catch, receiver.as_ref(), &token)
        .unwrap();

    assert_eq!(read(&receiver, "total"), Some(json!(100)));
    // The sender's store is only read.
    assert_eq!(read(&sender, "total"), None);
}

#[test]
fn test_no_catch_mappings_writes_directly() {
    init_tracing();
    let sender = instance_with("sender", json!({"order": {"id": "A-7"}}));
    let receiver = instance_with("receiver", json!({"existing": true}));

    let throw = Arc::new(
        IntermediateThrowEvent::new("throw")
            .with_data_input_association(copy("order.id", "orderId")),
    );
    let token = MemoryToken::new(throw).with_instance(sender);
    let catch = IntermediateCatchEvent::new("catch");
    let definition = MessageEventDefinition::new("msg");

    let report = definition
        .execute_with_report(&definition, &catch, receiver.as_ref(), &token)
        .unwrap();

    assert!(!report.used_buffer());
    assert_eq!(report.stages(), vec![MappingStage::Direct]);
    assert_eq!(report.written_paths(MappingStage::Direct), vec!["orderId"]);
    assert_eq!(read(&receiver, "orderId"), Some(json!("A-7")));
    assert_eq!(read(&receiver, "existing"), Some(json!(true)));
    assert_eq!(
        report.payload_hash,
        receiver.data_store().read().unwrap().payload_hash()
    );
}

#[test]
fn test_catch_mappings_rename_through_buffer() {
    init_tracing();
    let sender = instance_with("sender", json!({"k": 7}));
    let receiver = instance_with("receiver", json!({}));

    let throw = Arc::new(IntermediateThrowEvent::new("throw").with_data_input_association(copy("k", "k")));
    let token = MemoryToken::new(throw).with_instance(sender);
    let catch = IntermediateCatchEvent::new("catch").with_data_output_association(
        DataAssociation::output()
            .with_source(ItemRef::named("k"))
            .with_target(ItemRef::named("k2")),
    );
    let definition = MessageEventDefinition::new("msg");

    let report = definition
        .execute_with_report(&definition, &catch, receiver.as_ref(), &token)
        .unwrap();

    assert!(report.used_buffer());
    assert_eq!(
        report.stages(),
        vec![MappingStage::ToBuffer, MappingStage::FromBuffer]
    );
    assert_eq!(read(&receiver, "k2"), Some(json!(7)));
    assert_eq!(read(&receiver, "k"), None);
}

#[test]
fn test_catch_side_only_sees_throw_output() {
    init_tracing();
    let sender = instance_with("sender", json!({"secret": "s3cr3t", "amount": 40}));
    let receiver = instance_with("receiver", json!({}));

    let throw = Arc::new(
        IntermediateThrowEvent::new("throw").with_data_input_association(
            DataAssociation::input().with_assignment(Assignment::to_path(
                Expression::path("amount"),
                "payment.amount",
            )),
        ),
    );
    let token = MemoryToken::new(throw).with_instance(sender);
    let catch = IntermediateCatchEvent::new("catch").with_data_output_association(
        DataAssociation::output()
            .with_target(ItemRef::named("received"))
            .with_transformation(Expression::from_fn(|ctx| Ok(Value::Object(ctx.clone())))),
    );
    let definition = MessageEventDefinition::new("msg");

    definition
        .execute(&definition, &catch, receiver.as_ref(), &token)
        .unwrap();

    assert_eq!(
        read(&receiver, "received"),
        Some(json!({"payment": {"amount": 40}}))
    );
}

#[test]
fn test_unbuffered_policy_remaps_in_place() {
    init_tracing();
    let sender = instance_with("sender", json!({"k": 7}));
    let receiver = instance_with("receiver", json!({}));

    let throw = Arc::new(IntermediateThrowEvent::new("throw").with_data_input_association(copy("k", "k")));
    let token = MemoryToken::new(throw).with_instance(sender);
    let catch = IntermediateCatchEvent::new("catch").with_data_output_association(copy("k", "k2"));
    let definition = MessageEventDefinition::new("msg").with_policy(MappingPolicy {
        buffering: BufferPolicy::Never,
        ..MappingPolicy::default()
    });

    let report = definition
        .execute_with_report(&definition, &catch, receiver.as_ref(), &token)
        .unwrap();

    assert!(!report.used_buffer());
    assert_eq!(
        report.stages(),
        vec![MappingStage::Direct, MappingStage::InPlace]
    );
    assert_eq!(read(&receiver, "k"), Some(json!(7)));
    assert_eq!(read(&receiver, "k2"), Some(json!(7)));
}

#[test]
fn test_firing_twice_maps_twice() {
    init_tracing();
    let sender = instance_with("sender", json!({"n": 1}));
    let receiver = instance_with("receiver", json!({"count": 0}));

    let throw = Arc::new(
        IntermediateThrowEvent::new("throw").with_data_input_association(
            DataAssociation::input()
                .with_source(ItemRef::named("n"))
                .with_target(ItemRef::named("log.0")),
        ),
    );
    let token = MemoryToken::new(throw).with_instance(sender.clone());
    let catch = IntermediateCatchEvent::new("catch");
    let definition = MessageEventDefinition::new("msg");

    definition
        .execute(&definition, &catch, receiver.as_ref(), &token)
        .unwrap();
    sender
        .data_store()
        .write()
        .unwrap()
        .set_dot("n", json!(2));
    definition
        .execute(&definition, &catch, receiver.as_ref(), &token)
        .unwrap();

    assert_eq!(read(&receiver, "log"), Some(json!([2])));
}

#[test]
fn test_failing_expression_aborts_firing() {
    init_tracing();
    let sender = instance_with("sender", json!({"k": 1}));
    let receiver = instance_with("receiver", json!({}));

    let throw = Arc::new(IntermediateThrowEvent::new("throw").with_data_input_association(copy("k", "k")));
    let token = MemoryToken::new(throw).with_instance(sender);
    let catch = IntermediateCatchEvent::new("catch").with_data_output_association(
        DataAssociation::output()
            .with_target(ItemRef::named("k2"))
            .with_transformation(Expression::from_fn(|_| Err(anyhow::anyhow!("bad script")))),
    );
    let definition = MessageEventDefinition::new("msg");

    let err = definition
        .execute(&definition, &catch, receiver.as_ref(), &token)
        .unwrap_err();

    assert!(err.to_string().contains("bad script"));
    assert!(receiver.data_store().read().unwrap().data().is_empty());
}
