//! Tests for the JavaScript-facing functions. Run with `wasm-pack test --headless --firefox`.
#![cfg(target_arch = "wasm32")]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]

use wasm_bindgen::JsValue;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn get(obj: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(obj, &JsValue::from_str(key)).unwrap()
}

#[wasm_bindgen_test]
fn test_encode_workbook_csv() {
    let data = b"Banner\nName,Phone,Message\nAnn,+1,Hi there\n";
    let result = xlencode::encode_workbook(data, "list.csv").unwrap();
    assert_eq!(get(&result, "status").as_string().unwrap(), "processed");
    assert_eq!(get(&result, "fileName").as_string().unwrap(), "Encoded-list.csv");
    assert_eq!(get(&result, "encodedRows").as_f64().unwrap(), 1.0);

    let bytes = js_sys::Uint8Array::new(&get(&result, "bytes")).to_vec();
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("Hi%20there,1"));
}

#[wasm_bindgen_test]
fn test_encode_workbook_no_data() {
    let result = xlencode::encode_workbook(b"Banner\nName,Phone\n", "list.csv").unwrap();
    assert_eq!(get(&result, "status").as_string().unwrap(), "noMessageData");
    assert!(get(&result, "bytes").is_undefined());
}

#[wasm_bindgen_test]
fn test_encode_workbook_rejects_garbage() {
    assert!(xlencode::encode_workbook(b"PK\x03\x04junk", "broken.xlsx").is_err());
}

#[wasm_bindgen_test]
fn test_analyze_message() {
    let result = xlencode::analyze_message("€uro").unwrap();
    assert_eq!(get(&result, "encoding").as_string().unwrap(), "gsm7");
    assert_eq!(get(&result, "length").as_f64().unwrap(), 4.0);
    assert_eq!(xlencode::estimate_segments(&"x".repeat(161)), 2);
    assert_eq!(xlencode::encode_message("a b"), "a%20b");
}
