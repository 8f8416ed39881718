//! xlencode - SMS message encoder for spreadsheets
//!
//! Reads the first sheet of an XLSX (or CSV) file, URL-encodes the message
//! column and estimates how many SMS segments each message takes:
//! - row 0 is a banner, row 1 the header, rows 2.. data
//! - the message is in the third column
//! - two columns are appended: "Encoded Message" and "SMS Length (PDU)"
//! - the result is a new single-sheet workbook named `Encoded-<file name>`
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { EncoderApp, encode_workbook } from 'xlencode';
//! await init();
//! // Either wire up the upload page (#upload, #processButton, #status, #downloadButton)
//! const app = new EncoderApp();
//! // or call the pipeline directly
//! const result = encode_workbook(bytes, file.name);
//! ```

pub mod cell_ref;
pub mod delimited;
pub mod document;
pub mod error;
pub mod export;
pub mod parser;
pub mod percent;
pub mod pipeline;
pub mod segments;
pub mod transform;
pub mod xml_helpers;

// Browser adapter (DOM wiring)
#[cfg(target_arch = "wasm32")]
pub mod app;

use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
pub use app::EncoderApp;

pub use document::{CellValue, Document};
pub use error::{Result, XlencodeError};
pub use pipeline::{process, Container, EncodedFile, Outcome};
pub use segments::{estimate, Encoding, SegmentEstimate};
pub use transform::{transform, TransformOutcome};

/// Encode an uploaded file.
///
/// # Arguments
/// * `data` - The raw bytes of the XLSX or CSV file
/// * `file_name` - The uploaded file's name, used for the output sheet name
///
/// # Returns
/// `{ status: "noMessageData" }`, or `{ status: "processed", fileName,
/// sheetName, container, dataRows, encodedRows, bytes }` where `bytes` is a
/// `Uint8Array` holding the encoded file.
///
/// # Errors
/// Returns an error if the file cannot be read or written.
#[wasm_bindgen]
pub fn encode_workbook(data: &[u8], file_name: &str) -> std::result::Result<JsValue, JsValue> {
    match pipeline::process(data, file_name)? {
        Outcome::NoMessageData => {
            let obj = js_sys::Object::new();
            js_sys::Reflect::set(&obj, &"status".into(), &"noMessageData".into())?;
            Ok(obj.into())
        }
        Outcome::Processed(file) => {
            let value = serde_wasm_bindgen::to_value(&file)
                .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))?;
            js_sys::Reflect::set(&value, &"status".into(), &"processed".into())?;
            let bytes = js_sys::Uint8Array::from(file.bytes.as_slice());
            js_sys::Reflect::set(&value, &"bytes".into(), &bytes)?;
            Ok(value)
        }
    }
}

/// Number of SMS segments `text` would take.
#[must_use]
#[wasm_bindgen]
pub fn estimate_segments(text: &str) -> u32 {
    segments::estimate(text)
}

/// Encoding, UTF-16 length and segment count of `text` as a JS object.
///
/// # Errors
/// Returns an error if the result cannot be converted to a JS value.
#[wasm_bindgen]
pub fn analyze_message(text: &str) -> std::result::Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(&segments::analyze(text))
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// URL-encode a single message the way the encoded column is filled.
#[must_use]
#[wasm_bindgen]
pub fn encode_message(text: &str) -> String {
    percent::encode_message(text)
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
