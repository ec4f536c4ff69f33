//! Every engine operation logs one start and one terminal event
#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{engine, person};
use vgraph_core::logging_facility::test_capture::init_test_capture;
use vgraph_core::vgraph_core_types::schema::EVENT_END_ERROR;

#[tokio::test]
async fn test_engine_operations_log_boundaries() {
    let capture = init_test_capture();
    let engine = engine();

    let created = engine.create_object(person("logged")).await.unwrap();
    capture.assert_single_boundary("create_object");

    engine.create_object(person("logged")).await.unwrap_err();
    let errors: Vec<_> = capture
        .events_for_op("create_object")
        .into_iter()
        .filter(|e| e.event.as_deref() == Some(EVENT_END_ERROR))
        .collect();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field("err_code"), Some("ERR_KEY_CONFLICT"));

    engine.get_object(&created.canonical_id, None).await.unwrap();
    capture.assert_single_boundary("get_object");
}
