use serde_json::json;
use tabgrid::filter::BLANK;
use tabgrid::table::{ChangeReason, EventRecorder};
use tabgrid::{DataValue, GridConfig, GridEvent, GridRequest, TableController};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Columns `n: int`, `s: str` loaded with [{3,b},{1,a},{2,a}]
fn ns_controller() -> (TableController, EventRecorder) {
    init_logging();
    let mut controller = TableController::from_json(
        &[
            json!({"key": "n", "type": "int"}),
            json!({"key": "s", "type": "str"}),
        ],
        GridConfig::default(),
    )
    .expect("valid column config");

    let recorder = EventRecorder::new("scenario");
    controller.subscribe(Box::new(recorder.clone()));
    controller
        .set_json_data(&[
            json!({"n": 3, "s": "b"}),
            json!({"n": 1, "s": "a"}),
            json!({"n": 2, "s": "a"}),
        ])
        .unwrap();
    (controller, recorder)
}

fn shown_column(controller: &TableController, key: &str) -> Vec<DataValue> {
    controller
        .get_data(false)
        .into_iter()
        .map(|record| record.get(key).cloned().unwrap_or(DataValue::Null))
        .collect()
}

fn ints(values: &[i64]) -> Vec<DataValue> {
    values.iter().map(|v| DataValue::Integer(*v)).collect()
}

fn sort_request(key: &str) -> GridRequest {
    GridRequest::SortRequested {
        column_key: key.to_string(),
    }
}

#[test]
fn test_scenario_a_sort_cycle() {
    let (mut controller, _) = ns_controller();

    controller.handle(sort_request("n")).unwrap();
    assert_eq!(shown_column(&controller, "n"), ints(&[1, 2, 3]));

    controller.handle(sort_request("n")).unwrap();
    assert_eq!(shown_column(&controller, "n"), ints(&[3, 2, 1]));

    controller.handle(sort_request("n")).unwrap();
    assert_eq!(shown_column(&controller, "n"), ints(&[3, 1, 2]));
}

#[test]
fn test_scenario_b_contains_filter() {
    let (mut controller, _) = ns_controller();

    controller
        .handle(GridRequest::FilterRequested {
            column_key: "s".to_string(),
            raw_text: "a".to_string(),
        })
        .unwrap();

    assert_eq!(shown_column(&controller, "n"), ints(&[1, 2]));
    assert_eq!(
        shown_column(&controller, "s"),
        vec![DataValue::from("a"), DataValue::from("a")]
    );
}

#[test]
fn test_scenario_c_edit_then_reapply() {
    let (mut controller, recorder) = ns_controller();
    controller.handle(sort_request("n")).unwrap();

    // shown row 0 is {n: 1, s: 'a'}, original position 1
    controller
        .handle(GridRequest::CellEditRequested {
            row: 0,
            column_key: "n".to_string(),
            raw_text: "99".to_string(),
        })
        .unwrap();

    let full = controller.get_data(true);
    assert_eq!(full[1].get("n"), Some(&DataValue::Integer(99)));
    assert_eq!(full[1].get("s"), Some(&DataValue::from("a")));

    // edit lands in place; re-running the sort moves it
    assert_eq!(shown_column(&controller, "n"), ints(&[99, 2, 3]));
    controller.apply_filter().unwrap();
    assert_eq!(shown_column(&controller, "n"), ints(&[2, 3, 99]));

    assert!(recorder.events().iter().any(|event| matches!(
        event,
        GridEvent::DataChanged {
            reason: ChangeReason::Edit,
            ..
        }
    )));
    assert_eq!(recorder.error_count(), 0);
}

#[test]
fn test_scenario_d_blank_shortcut() {
    init_logging();
    let mut controller = TableController::from_json(
        &[json!({"key": "note", "type": "str", "filter_type": "exact"})],
        GridConfig::default(),
    )
    .unwrap();
    controller
        .set_json_data(&[
            json!({"note": "first"}),
            json!({"note": ""}),
            json!({"note": "third"}),
        ])
        .unwrap();

    controller.set_filter("note", BLANK).unwrap();
    assert_eq!(shown_column(&controller, "note"), vec![DataValue::from("")]);
}

#[test]
fn test_multi_choice_filter_with_choices_from_data() {
    init_logging();
    let mut controller = TableController::from_json(
        &[json!({"key": "city", "filter_type": "multiple_choice"})],
        GridConfig::default(),
    )
    .unwrap();
    controller
        .set_json_data(&[
            json!({"city": "Oslo"}),
            json!({"city": "Bergen"}),
            json!({"city": "Oslo"}),
            json!({"city": "Tromsø"}),
        ])
        .unwrap();

    let choices = controller.filter_choices("city").unwrap();
    assert_eq!(choices, vec!["Bergen", "Oslo", "Tromsø"]);

    controller
        .set_filter("city", vec!["Oslo".to_string(), "Tromsø".to_string()])
        .unwrap();
    assert_eq!(controller.row_count(false), 3);
}

#[test]
fn test_expression_filter_never_surfaces_errors() {
    init_logging();
    let mut controller = TableController::from_json(
        &[json!({"key": "price", "type": "float", "filter_type": "expression"})],
        GridConfig::default(),
    )
    .unwrap();
    let recorder = EventRecorder::new("expr");
    controller.subscribe(Box::new(recorder.clone()));
    controller
        .set_json_data(&[json!({"price": 9.5}), json!({"price": 20}), json!({})])
        .unwrap();

    controller.set_filter("price", ">= 10").unwrap();
    assert_eq!(shown_column(&controller, "price"), ints(&[20]));

    // half-typed expression hides everything, no error event
    controller.set_filter("price", ">= (").unwrap();
    assert_eq!(controller.row_count(false), 0);
    assert_eq!(recorder.error_count(), 0);
}

#[test]
fn test_render_preview_of_shown_rows() {
    let (mut controller, _) = ns_controller();
    controller.handle(sort_request("n")).unwrap();

    let text = controller.render_text();
    assert!(text.contains("n ▲"));
    let one = text.find("| 1").unwrap();
    let three = text.find("| 3").unwrap();
    assert!(one < three);
}
